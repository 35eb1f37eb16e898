//! Proximal projections for a dual coordinate ascent multiclass solver.
//!
//! This crate is the per-example projection engine: given a vector of
//! dual-variable candidates, it returns the Euclidean-nearest point of a
//! constrained set built from box bounds, one linear budget, and optionally
//! a top-k sparsity cone. The solvers share a threshold representation (every
//! projected coordinate is `clamp(x_i - t, lo, hi)`) and an injected
//! accumulation policy from [`ascent_num`].
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`thresholds`] | [`Thresholds`], [`Partition`], [`ProjectionCase`] | Clip parameters, partition boundaries, case classification |
//! | [`knapsack`] | [`KnapsackProjector`] | Box bounds + one budget, biased or plain, via a pegging partition search |
//! | [`topk_cone`] | [`TopKConeProjector`] | Special-case classification and the cardinality-bound threshold search |
//! | [`topk_simplex`] | [`TopKSimplexProjector`] | The full constraint intersection; the public proximal operator |
//! | [`error`] | [`ProxError`] | Configuration errors |
//!
//! # Quick start
//!
//! ```
//! use ascent_prox::TopKSimplexProjector;
//!
//! let proj = TopKSimplexProjector::new(2.0, 1.0).unwrap();
//! let mut duals = vec![0.9, 0.4, -0.2, 0.1];
//! proj.project(&mut duals);
//!
//! let sum: f64 = duals.iter().sum();
//! assert!(sum <= 1.0 + 1e-12);
//! ```
//!
//! # In-place contract
//!
//! Projections mutate the input slice and reorder it (the threshold search
//! partitions in place); callers needing original positions must track a
//! permutation separately. Projectors hold only configuration and may be
//! shared across threads operating on disjoint buffers.
//!
//! # Numerical notes
//!
//! Non-finite inputs are out of scope and propagate per IEEE arithmetic.
//! The accumulation policy ([`ascent_num::StandardSum`] or
//! [`ascent_num::KahanSum`]) is injected with `with_summation` and applied
//! to every sum the searches evaluate, which keeps the feasibility error of
//! the result within `eps * max(1, max|x_i|) * n` even on wide-dynamic-range
//! input.

pub mod error;
pub mod knapsack;
pub mod thresholds;
pub mod topk_cone;
pub mod topk_simplex;

pub use error::ProxError;
pub use knapsack::KnapsackProjector;
pub use thresholds::{Partition, ProjectionCase, Thresholds};
pub use topk_cone::TopKConeProjector;
pub use topk_simplex::TopKSimplexProjector;
