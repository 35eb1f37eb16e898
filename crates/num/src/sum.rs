//! Compensated (Kahan) summation and the accumulation policy pair.

use crate::real::Real;

/// Adds `value` into a running compensated sum.
///
/// The rounding error of each addition is captured in `compensation` and fed
/// back into the next one, so the accumulated error stays bounded
/// independently of the number of terms.
#[inline]
pub fn kahan_add<T: Real>(value: T, sum: &mut T, compensation: &mut T) {
    let y = value - *compensation;
    let t = *sum + y;
    *compensation = (t - *sum) - y;
    *sum = t;
}

/// Folds `values` into `init` with compensated addition, starting from a
/// carried-in compensation term.
///
/// Pass `T::zero()` as `compensation` unless continuing a previous
/// compensated fold.
#[inline]
pub fn kahan_accumulate<T: Real>(values: &[T], init: T, mut compensation: T) -> T {
    let mut sum = init;
    for &v in values {
        kahan_add(v, &mut sum, &mut compensation);
    }
    sum
}

/// Accumulation strategy shared by every statistic the engine computes.
///
/// Two implementations expose one call contract, so callers pick accuracy vs
/// speed by injecting a policy at construction instead of branching at each
/// call site: [`StandardSum`] (plain left-to-right, error O(n·ε·C) for n
/// terms with condition number C) and [`KahanSum`] (compensated, error
/// O(ε·C), independent of n).
pub trait Summation<T: Real>: Copy + Default + Send + Sync {
    /// Diagnostic name of the strategy.
    fn name(&self) -> &'static str;

    /// Folds `values` into `init`.
    fn sum(&self, values: &[T], init: T) -> T;

    /// Folds `values` into `init`, threading an external compensation term.
    ///
    /// [`StandardSum`] leaves the compensation untouched.
    fn sum_compensated(&self, values: &[T], init: T, compensation: &mut T) -> T;

    /// Adds a single value into a running sum.
    fn add(&self, value: T, sum: &mut T, compensation: &mut T);
}

/// Plain left-to-right summation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StandardSum;

impl<T: Real> Summation<T> for StandardSum {
    fn name(&self) -> &'static str {
        "standard"
    }

    #[inline]
    fn sum(&self, values: &[T], init: T) -> T {
        values.iter().fold(init, |acc, &v| acc + v)
    }

    #[inline]
    fn sum_compensated(&self, values: &[T], init: T, _compensation: &mut T) -> T {
        Summation::<T>::sum(self, values, init)
    }

    #[inline]
    fn add(&self, value: T, sum: &mut T, _compensation: &mut T) {
        *sum += value;
    }
}

/// Compensated (Kahan) summation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KahanSum;

impl<T: Real> Summation<T> for KahanSum {
    fn name(&self) -> &'static str {
        "kahan"
    }

    #[inline]
    fn sum(&self, values: &[T], init: T) -> T {
        kahan_accumulate(values, init, T::zero())
    }

    #[inline]
    fn sum_compensated(&self, values: &[T], init: T, compensation: &mut T) -> T {
        let mut sum = init;
        for &v in values {
            kahan_add(v, &mut sum, compensation);
        }
        sum
    }

    #[inline]
    fn add(&self, value: T, sum: &mut T, compensation: &mut T) {
        kahan_add(value, sum, compensation);
    }
}
