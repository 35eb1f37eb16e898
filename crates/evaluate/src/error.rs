//! Error types for the ascent-evaluate crate.

/// Error type for all fallible operations in the ascent-evaluate crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluateError {
    /// Returned when the number of classes is zero.
    #[error("number of classes must be >= 1")]
    NoClasses,

    /// Returned when a score slice length does not match the class count.
    #[error("scores length {scores} does not match {num_classes} classes")]
    ScoresDimensionMismatch {
        /// Length of the scores slice.
        scores: usize,
        /// Expected number of classes.
        num_classes: usize,
    },

    /// Returned when a ground-truth label is out of range.
    #[error("label {label} out of range for {num_classes} classes")]
    LabelOutOfRange {
        /// The offending label.
        label: usize,
        /// Number of classes.
        num_classes: usize,
    },
}
