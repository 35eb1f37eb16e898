//! Error types for the ascent-prox crate.

/// Error type for projector configuration.
///
/// Per-call data preconditions (e.g. `k` not exceeding the vector length)
/// are a programming-error class and are debug-asserted instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProxError {
    /// Returned when the lower bound exceeds the upper bound, or either is
    /// non-finite.
    #[error("bounds must be finite with lo <= hi, got lo {lo}, hi {hi}")]
    InvalidBounds {
        /// Lower bound.
        lo: f64,
        /// Upper bound.
        hi: f64,
    },

    /// Returned when the budget is non-finite.
    #[error("budget must be finite, got {rhs}")]
    InvalidBudget {
        /// The invalid budget value.
        rhs: f64,
    },

    /// Returned when the bias is negative or non-finite.
    #[error("bias must be finite and non-negative, got {rho}")]
    InvalidBias {
        /// The invalid bias value.
        rho: f64,
    },

    /// Returned when k is non-finite or not strictly positive.
    #[error("k must be finite and positive, got {k}")]
    InvalidK {
        /// The invalid k value.
        k: f64,
    },

    /// Returned when the simplex budget is not strictly positive.
    #[error("simplex budget must be positive, got {rhs}")]
    NonPositiveBudget {
        /// The invalid budget value.
        rhs: f64,
    },
}
