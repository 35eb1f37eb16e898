//! Projection onto the top-k cone.
//!
//! The cone couples every coordinate to the total mass:
//!
//! ```text
//! { y : 0 <= y_i <= sum(y) / k }
//! ```
//!
//! with real `k` interpolating between adjacent integer cones. An optional
//! quadratic bias `(rho/2) * (sum y)^2` on the objective is supported so the
//! solver composes with the biased knapsack.
//!
//! Two cheap special cases are classified before the threshold search: the
//! origin (when the k largest coordinates sum to nothing positive) and the
//! uniform solution on the k largest coordinates. The general case solves,
//! for each candidate partition (u capped, m free), the 2x2 system coupling
//! the cap value and the threshold, and accepts the first candidate whose
//! multipliers are consistent.

use std::cmp::Ordering;

use ascent_num::{Real, StandardSum, Summation};

use crate::error::ProxError;
use crate::thresholds::{ProjectionCase, Thresholds};

/// Projects onto the top-k cone `{ y : 0 <= y_i <= sum(y)/k }`.
///
/// Holds only configuration; reentrant on disjoint buffers.
#[derive(Debug, Clone, Copy)]
pub struct TopKConeProjector<T, S = StandardSum> {
    k: T,
    rho: T,
    sum: S,
}

impl<T: Real> TopKConeProjector<T, StandardSum> {
    /// Creates a projector for the given (possibly fractional) k.
    ///
    /// # Errors
    ///
    /// Returns [`ProxError::InvalidK`] unless `k` is finite and positive.
    pub fn new(k: T) -> Result<Self, ProxError> {
        if !k.is_finite() || k <= T::zero() {
            return Err(ProxError::InvalidK { k: k.to_f64() });
        }
        Ok(Self {
            k,
            rho: T::zero(),
            sum: StandardSum,
        })
    }
}

impl<T: Real, S: Summation<T>> TopKConeProjector<T, S> {
    /// Sets the quadratic bias coefficient on the coordinate sum.
    ///
    /// # Errors
    ///
    /// Returns [`ProxError::InvalidBias`] unless `rho` is finite and
    /// non-negative.
    pub fn with_bias(mut self, rho: T) -> Result<Self, ProxError> {
        if !rho.is_finite() || rho < T::zero() {
            return Err(ProxError::InvalidBias { rho: rho.to_f64() });
        }
        self.rho = rho;
        Ok(self)
    }

    /// Replaces the accumulation strategy.
    pub fn with_summation<S2: Summation<T>>(self, sum: S2) -> TopKConeProjector<T, S2> {
        TopKConeProjector {
            k: self.k,
            rho: self.rho,
            sum,
        }
    }

    /// The k parameter as a real value.
    pub fn k_real(&self) -> T {
        self.k
    }

    /// Bias coefficient.
    pub fn rho(&self) -> T {
        self.rho
    }

    /// O(n) pre-check classifying the instance before the expensive search.
    ///
    /// Partially reorders `x` (the ceil(k) largest coordinates move to the
    /// front). Debug-asserts `k <= x.len()` for non-empty input.
    ///
    /// - [`ProjectionCase::Zero`]: the interpolated sum of the k largest
    ///   coordinates is non-positive, so the origin is the projection.
    /// - [`ProjectionCase::Constant`]: integral k only; the uniform value
    ///   on the k largest coordinates is optimal and the thresholds are
    ///   carried in the variant.
    /// - [`ProjectionCase::General`]: the full search is required.
    pub fn classify(&self, x: &mut [T]) -> ProjectionCase<T> {
        let n = x.len();
        let zero = T::zero();
        if n == 0 {
            return ProjectionCase::Zero;
        }
        debug_assert!(
            self.k <= T::of_usize(n),
            "k {} exceeds vector length {}",
            self.k,
            n,
        );

        let k = self.k;
        let kc = (k.ceil().to_f64() as usize).clamp(1, n);

        // Move the kc largest coordinates to the front.
        if kc < n {
            x.select_nth_unstable_by(kc - 1, |a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        }
        let s_kc = self.sum.sum(&x[..kc], zero);
        let min_k = min_of(&x[..kc]);

        // Interpolated sum of the k largest elements.
        let fract = k - k.floor();
        let sum_k = if fract > zero {
            s_kc - min_k + fract * min_k
        } else {
            s_kc
        };
        if sum_k <= zero {
            return ProjectionCase::Zero;
        }

        // A uniform candidate with positive mass forces exactly k capped
        // coordinates, so the shortcut only exists for integral k.
        if fract == zero {
            let hi = s_kc / (k + self.rho * k * k);
            let t = (min_k - hi).min(self.rho * k * hi);
            let feasible = if kc < n { max_of(&x[kc..]) <= t } else { true };
            if feasible {
                return ProjectionCase::Constant(Thresholds::new(t, zero, hi));
            }
        }

        ProjectionCase::General
    }

    /// Threshold search for the general case.
    ///
    /// Sorts `x` in descending order, then scans candidate partitions
    /// (u capped coordinates, m free) with policy-accumulated running sums,
    /// solving for each the coupled cap/threshold system
    ///
    /// ```text
    /// (u + rho*k^2) * hi + (u - k) * t = sum_U
    /// (k - u) * hi + m * t             = sum_M
    /// ```
    ///
    /// and accepting the first candidate whose coordinates land in their
    /// ranges and whose multipliers are non-negative. The scan visits at
    /// most floor(k)+1 values of u, so the search is O(k*n) after the sort.
    pub fn compute_general_case(&self, x: &mut [T]) -> Thresholds<T> {
        let n = x.len();
        let zero = T::zero();
        if n == 0 {
            return Thresholds::new(zero, zero, zero);
        }

        x.sort_unstable_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

        let k = self.k;
        let rkk = self.rho * k * k;
        let u_max = (k.floor().to_f64() as usize).min(n - 1);

        // Acceptance slack: candidates sitting exactly on a range boundary
        // must not be rejected over rounding in hi and t.
        let tol = T::epsilon() * (T::one() + x[0].abs() + x[n - 1].abs());

        let mut sum_u = zero;
        let mut comp_u = zero;
        for u in 0..=u_max {
            if u > 0 {
                self.sum.add(x[u - 1], &mut sum_u, &mut comp_u);
            }
            let uf = T::of_usize(u);
            let ku = k - uf;
            let a = uf + rkk;

            let mut sum_m = zero;
            let mut comp_m = zero;
            for m in 1..=(n - u) {
                let last = u + m - 1;
                self.sum.add(x[last], &mut sum_m, &mut comp_m);
                let mf = T::of_usize(m);
                let d = mf * a + ku * ku;
                let hi = (mf * sum_u + ku * sum_m) / d;
                let t = (a * sum_m - ku * sum_u) / d;

                let upper_ok = u == 0 || x[u - 1] >= hi + t - tol;
                let enter_ok = x[u] <= hi + t + tol;
                let lower_ok = x[last] >= t - tol;
                let exit_ok = u + m == n || x[u + m] <= t + tol;
                if upper_ok
                    && enter_ok
                    && lower_ok
                    && exit_ok
                    && hi >= -tol
                    && t <= self.rho * k * hi + tol
                {
                    return Thresholds::new(t, zero, hi);
                }
            }
        }

        // The case analysis is exhaustive for finite input; reaching this
        // point means the instance belonged to a special case.
        debug_assert!(false, "top-k cone search found no consistent partition");
        Thresholds::new(zero, zero, zero)
    }

    /// Full cone projection: classification, then search if needed.
    /// Reorders and clamps `x` in place.
    pub fn project(&self, x: &mut [T]) -> Thresholds<T> {
        let th = match self.classify(x) {
            ProjectionCase::Zero => Thresholds::new(T::zero(), T::zero(), T::zero()),
            ProjectionCase::Constant(th) => th,
            ProjectionCase::General => self.compute_general_case(x),
        };
        th.apply(x);
        th
    }
}

fn max_of<T: Real>(values: &[T]) -> T {
    values
        .iter()
        .fold(T::neg_infinity(), |acc, &v| if v > acc { v } else { acc })
}

fn min_of<T: Real>(values: &[T]) -> T {
    values
        .iter()
        .fold(T::infinity(), |acc, &v| if v < acc { v } else { acc })
}
