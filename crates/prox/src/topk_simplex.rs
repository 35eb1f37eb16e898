//! Projection onto the top-k simplex: the externally consumed proximal
//! operator.
//!
//! The constraint set intersects the top-k cone with a mass budget:
//!
//! ```text
//! { y : sum(y) <= rhs,  0 <= y_i <= sum(y) / k }
//! ```
//!
//! optionally with the quadratic bias `(rho/2) * (sum y)^2` on the
//! objective. The solution is either the cone projection (budget slack) or
//! the budget-active knapsack point with per-coordinate cap `rhs / k`; the
//! sign of the budget multiplier arbitrates between the two.
//!
//! ```text
//! project(x)
//!   ├─ classify()                      (topk_cone.rs)
//!   ├─ Zero      -> origin
//!   ├─ Constant  -> uniform, knapsack-refined if over budget
//!   └─ General   -> budget-active knapsack  (knapsack.rs)
//!                     └─ cone_binds()? -> cone general case
//! ```

use ascent_num::{Real, StandardSum, Summation};
use tracing::trace;

use crate::error::ProxError;
use crate::knapsack::KnapsackProjector;
use crate::thresholds::{Partition, ProjectionCase, Thresholds};
use crate::topk_cone::TopKConeProjector;

/// Projects onto the top-k simplex `{ y : sum(y) <= rhs, 0 <= y_i <=
/// sum(y)/k }`.
///
/// This is the per-example proximal operator of the enclosing dual
/// coordinate ascent solver: one call per training example per iteration,
/// mutating the example's dual-variable slice in place. Holds only
/// configuration; reentrant on disjoint buffers.
///
/// # Example
///
/// ```
/// use ascent_prox::TopKSimplexProjector;
///
/// let proj = TopKSimplexProjector::new(2.0, 1.0).unwrap();
/// let mut duals = vec![0.9, 0.4, -0.2, 0.1];
/// proj.project(&mut duals);
///
/// let sum: f64 = duals.iter().sum();
/// assert!(sum <= 1.0 + 1e-12);
/// assert!(duals.iter().all(|&v| v >= 0.0 && v <= sum / 2.0 + 1e-12));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TopKSimplexProjector<T, S = StandardSum> {
    knapsack: KnapsackProjector<T, S>,
    cone: TopKConeProjector<T, S>,
    sum: S,
}

impl<T: Real> TopKSimplexProjector<T, StandardSum> {
    /// Creates a projector for the given k and budget, no bias.
    ///
    /// # Errors
    ///
    /// Returns [`ProxError::InvalidK`] unless `k` is finite and positive,
    /// and [`ProxError::NonPositiveBudget`] unless `rhs` is finite and
    /// positive (a non-positive budget leaves no feasible mass).
    pub fn new(k: T, rhs: T) -> Result<Self, ProxError> {
        let cone = TopKConeProjector::new(k)?;
        if !rhs.is_finite() || rhs <= T::zero() {
            return Err(ProxError::NonPositiveBudget { rhs: rhs.to_f64() });
        }
        let knapsack = KnapsackProjector::new(T::zero(), rhs / k, rhs)?;
        Ok(Self {
            knapsack,
            cone,
            sum: StandardSum,
        })
    }
}

impl<T: Real, S: Summation<T>> TopKSimplexProjector<T, S> {
    /// Sets the quadratic bias coefficient on the coordinate sum.
    ///
    /// # Errors
    ///
    /// Returns [`ProxError::InvalidBias`] unless `rho` is finite and
    /// non-negative.
    pub fn with_bias(self, rho: T) -> Result<Self, ProxError> {
        Ok(Self {
            knapsack: self.knapsack.with_bias(rho)?,
            cone: self.cone.with_bias(rho)?,
            sum: self.sum,
        })
    }

    /// Replaces the accumulation strategy.
    pub fn with_summation<S2: Summation<T>>(self, sum: S2) -> TopKSimplexProjector<T, S2> {
        TopKSimplexProjector {
            knapsack: self.knapsack.with_summation(sum),
            cone: self.cone.with_summation(sum),
            sum,
        }
    }

    /// The k parameter as a real value.
    pub fn k_real(&self) -> T {
        self.cone.k_real()
    }

    /// Budget.
    pub fn rhs(&self) -> T {
        self.knapsack.rhs()
    }

    /// Bias coefficient.
    pub fn rho(&self) -> T {
        self.knapsack.rho()
    }

    /// Computes the clip parameters of the projection without applying
    /// them. Reorders `x`; the returned thresholds still have to be applied
    /// for the projection to take effect.
    pub fn compute_thresholds(&self, x: &mut [T]) -> Thresholds<T> {
        let zero = T::zero();
        match self.cone.classify(x) {
            ProjectionCase::Zero => {
                trace!(case = "zero", "projection classified");
                Thresholds::new(zero, zero, zero)
            }
            ProjectionCase::Constant(th) => {
                trace!(case = "constant", "projection classified");
                if self.cone.k_real() * th.hi > self.knapsack.rhs() {
                    // The uniform solution overshoots the budget; the budget
                    // binds and the knapsack point is optimal.
                    self.knapsack.partition_and_compute_active(x).thresholds
                } else {
                    th
                }
            }
            ProjectionCase::General => {
                trace!(case = "general", "projection classified");
                let part = self.knapsack.partition_and_compute_active(x);
                if self.cone_binds(x, &part) {
                    self.cone.compute_general_case(x)
                } else {
                    part.thresholds
                }
            }
        }
    }

    /// Projects `x` in place and returns the clip parameters. Reorders `x`.
    pub fn project(&self, x: &mut [T]) -> Thresholds<T> {
        let th = self.compute_thresholds(x);
        th.apply(x);
        th
    }

    /// Sign test on the budget multiplier of the knapsack point.
    ///
    /// With u capped coordinates of unclipped sum S and threshold t, the
    /// multiplier is negative (the budget should not bind and the cone
    /// constraint takes over) iff
    ///
    /// ```text
    /// k * (S + (k - u) * t) < u * rhs + rho * k^2 * rhs     (u > 0)
    /// t < rho * rhs                                          (u = 0)
    /// ```
    fn cone_binds(&self, x: &[T], part: &Partition<T>) -> bool {
        let u = part.m_begin;
        let t = part.thresholds.t;
        let k = self.cone.k_real();
        let rhs = self.knapsack.rhs();
        let rho = self.knapsack.rho();
        if u > 0 {
            let uf = T::of_usize(u);
            let s = self.sum.sum(&x[..u], T::zero());
            k * (s + (k - uf) * t) < (uf + rho * k * k) * rhs
        } else {
            t < rho * rhs
        }
    }
}
