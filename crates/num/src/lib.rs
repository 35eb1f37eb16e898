//! Numeric kernel for the ascent projection engine.
//!
//! Every statistic computed by the projection solvers flows through this
//! crate: a scalar abstraction with per-type constants, and a pair of
//! interchangeable accumulation strategies (plain and compensated) sharing
//! one call contract.
//!
//! | Module | Key items | What it does |
//! |--------|-----------|--------------|
//! | [`real`] | [`Real`] | `f32`/`f64` abstraction with per-type constants |
//! | [`sum`] | [`kahan_add`], [`kahan_accumulate`], [`Summation`], [`StandardSum`], [`KahanSum`] | Compensated summation and the accumulation policy pair |
//!
//! # Quick start
//!
//! ```
//! use ascent_num::{KahanSum, StandardSum, Summation};
//!
//! let values = [0.1_f64; 10];
//! let plain = StandardSum.sum(&values, 0.0);
//! let exact = KahanSum.sum(&values, 0.0);
//! assert!((plain - 1.0).abs() < 1e-15);
//! assert!((exact - 1.0).abs() < 1e-15);
//! ```
//!
//! For n terms with condition number C, plain summation accumulates
//! O(n·ε·C) rounding error; compensated summation keeps it at O(ε·C),
//! independent of the number of terms.

pub mod real;
pub mod sum;

pub use real::Real;
pub use sum::{kahan_accumulate, kahan_add, KahanSum, StandardSum, Summation};
