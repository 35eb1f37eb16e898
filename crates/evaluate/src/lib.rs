//! Evaluation bookkeeping for the ascent solver: primal/dual objective
//! terms and top-k accuracy over projected dual variables.
//!
//! The projection engine (`ascent-prox`) produces per-example dual-variable
//! vectors; this crate aggregates what the enclosing solver reports about
//! them. One [`EvalSink`] per evaluation pass buckets the rank of each
//! example's ground-truth class and folds loss terms through the
//! [`ascent_num::Summation`] policy (compensated by default); finishing the
//! pass yields an [`Evaluation`] with top-k accuracies for every k at once.
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`sink`] | [`EvalSink`] | Per-pass accumulator: rank histogram + loss terms |
//! | [`evaluation`] | [`Evaluation`] | Finished record: objectives, gap, accuracies |
//! | [`error`] | [`EvaluateError`] | Dimension and label validation |

pub mod error;
pub mod evaluation;
pub mod sink;

pub use error::EvaluateError;
pub use evaluation::Evaluation;
pub use sink::EvalSink;
