//! Scalar abstraction with per-type numeric constants.

use std::fmt::{Debug, Display};
use std::ops::{AddAssign, SubAssign};

use num_traits::Float;

/// Floating-point scalar usable by the projection engine.
///
/// Extends [`num_traits::Float`] with the per-type constants the engine
/// needs: a diagnostic name and the smallest argument for which `exp` stays
/// above the underflow threshold (objective terms built on top of the
/// projections evaluate exponentials of large negative margins).
///
/// Implemented for `f32` and `f64`; the scalar type is selected at compile
/// time by instantiating the solvers with the desired `T`.
pub trait Real:
    Float + AddAssign + SubAssign + Debug + Display + Send + Sync + 'static
{
    /// Diagnostic name of the scalar type.
    const NAME: &'static str;

    /// Smallest `v` for which `v.exp()` does not underflow to zero.
    const MIN_EXP_ARG: Self;

    /// Converts a count to the scalar type.
    ///
    /// Counts here are partition sizes, bounded by the vector length and far
    /// below the exact-integer limits of either float type.
    fn of_usize(n: usize) -> Self;

    /// Converts an `f64` constant to the scalar type (rounding for `f32`).
    fn of_f64(v: f64) -> Self;

    /// Widens to `f64` for diagnostics.
    fn to_f64(self) -> f64;
}

impl Real for f32 {
    const NAME: &'static str = "f32";
    const MIN_EXP_ARG: f32 = -103.0;

    #[inline]
    fn of_usize(n: usize) -> f32 {
        n as f32
    }

    #[inline]
    fn of_f64(v: f64) -> f32 {
        v as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Real for f64 {
    const NAME: &'static str = "f64";
    const MIN_EXP_ARG: f64 = -745.0;

    #[inline]
    fn of_usize(n: usize) -> f64 {
        n as f64
    }

    #[inline]
    fn of_f64(v: f64) -> f64 {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}
