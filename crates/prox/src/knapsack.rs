//! Projection onto box bounds plus one linear budget constraint.
//!
//! Solves
//!
//! ```text
//! min  0.5 * ||y - x||^2  +  (rho/2) * (sum y)^2
//! s.t. lo <= y_i <= hi,   sum(y) <= rhs
//! ```
//!
//! The optimum has the form `y_i = clamp(x_i - t, lo, hi)` where the
//! threshold satisfies `t = rho * sum(y) + lambda` with `lambda >= 0` the
//! budget multiplier. `rho = 0` recovers the plain inequality knapsack.
//!
//! The threshold search never sorts: a pegging (variable-fixing) partition
//! pass solves the free-range equation, permanently fixes the violator class
//! selected by the sign of the monotone residual, and repeats on the shrunk
//! free range. Each pass fixes at least one coordinate, so the search runs
//! in at most n passes: near-linear in practice, quadratic in the worst
//! case like the rest of its selection-algorithm family.

use ascent_num::{Real, StandardSum, Summation};

use crate::error::ProxError;
use crate::thresholds::{Partition, Thresholds};

/// Projects onto `{ y : lo <= y_i <= hi, sum(y) <= rhs }`, optionally with a
/// quadratic bias on the coordinate sum.
///
/// Configuration is validated at construction; calls themselves are
/// infallible. The projector holds no mutable state and may be shared across
/// threads operating on disjoint buffers.
///
/// # Example
///
/// ```
/// use ascent_prox::KnapsackProjector;
///
/// let proj = KnapsackProjector::new(-1.0, 2.0, 3.0).unwrap();
/// let mut x = vec![5.0, -3.0, 2.0, 0.0, 1.0];
/// proj.project(&mut x);
///
/// let sum: f64 = x.iter().sum();
/// assert!(x.iter().all(|&v| (-1.0..=2.0).contains(&v)));
/// assert!(sum <= 3.0 + 1e-12);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct KnapsackProjector<T, S = StandardSum> {
    lo: T,
    hi: T,
    rhs: T,
    rho: T,
    sum: S,
}

impl<T: Real> KnapsackProjector<T, StandardSum> {
    /// Creates a projector with the given bounds and budget, no bias.
    ///
    /// # Errors
    ///
    /// Returns [`ProxError::InvalidBounds`] unless `lo <= hi` and both are
    /// finite, and [`ProxError::InvalidBudget`] unless `rhs` is finite.
    pub fn new(lo: T, hi: T, rhs: T) -> Result<Self, ProxError> {
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(ProxError::InvalidBounds {
                lo: lo.to_f64(),
                hi: hi.to_f64(),
            });
        }
        if !rhs.is_finite() {
            return Err(ProxError::InvalidBudget { rhs: rhs.to_f64() });
        }
        Ok(Self {
            lo,
            hi,
            rhs,
            rho: T::zero(),
            sum: StandardSum,
        })
    }
}

impl<T: Real, S: Summation<T>> KnapsackProjector<T, S> {
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
    pub fn with_summation<S2: Summation<T>>(self, sum: S2) -> KnapsackProjector<T, S2> {
        KnapsackProjector {
            lo: self.lo,
            hi: self.hi,
            rhs: self.rhs,
            rho: self.rho,
            sum,
        }
    }

    /// Lower bound.
    pub fn lo(&self) -> T {
        self.lo
    }

    /// Upper bound.
    pub fn hi(&self) -> T {
        self.hi
    }

    /// Budget.
    pub fn rhs(&self) -> T {
        self.rhs
    }

    /// Bias coefficient.
    pub fn rho(&self) -> T {
        self.rho
    }

    /// Computes the threshold for the inequality budget and reorders `x`
    /// into capped/free/capped ranges. Does not clamp: coordinates in
    /// `[0, m_begin)` keep their original values and exceed `hi + t`.
    ///
    /// The budget dispatch evaluates the clipped sum at `t = rho * rhs`: a
    /// sum above `rhs` means the budget binds and the equality search runs;
    /// otherwise the slack fixed point `t = rho * phi(t)` is solved
    /// (`t = 0` when `rho = 0`).
    pub fn partition_and_compute(&self, x: &mut [T]) -> Partition<T> {
        if x.is_empty() {
            return self.empty_partition();
        }

        let t_hat = self.rho * self.rhs;
        let mut s = T::zero();
        let mut c = T::zero();
        for &v in x.iter() {
            let clipped = (v - t_hat).min(self.hi).max(self.lo);
            self.sum.add(clipped, &mut s, &mut c);
        }

        if s > self.rhs {
            self.search(x, self.rhs, T::zero())
        } else if self.rho > T::zero() {
            self.search(x, T::zero(), T::one() / self.rho)
        } else {
            self.partition_by(x, T::zero())
        }
    }

    /// Computes the threshold with the budget treated as binding
    /// (`sum(y) = rhs`) and reorders `x`; does not clamp.
    ///
    /// Used by the top-k simplex orchestrator, whose cone-membership test
    /// arbitrates the slack case separately. With the sum pinned the
    /// quadratic bias is a constant, so this search is bias-independent.
    ///
    /// Debug-asserts the reachability precondition `n*lo <= rhs <= n*hi`.
    pub fn partition_and_compute_active(&self, x: &mut [T]) -> Partition<T> {
        if x.is_empty() {
            return self.empty_partition();
        }
        let n = T::of_usize(x.len());
        debug_assert!(
            n * self.lo <= self.rhs && self.rhs <= n * self.hi,
            "budget {} not reachable for {} coordinates in [{}, {}]",
            self.rhs,
            x.len(),
            self.lo,
            self.hi,
        );
        self.search(x, self.rhs, T::zero())
    }

    /// Projects `x` in place onto the constraint set and returns the clip
    /// parameters. Reorders `x`.
    pub fn project(&self, x: &mut [T]) -> Thresholds<T> {
        let part = self.partition_and_compute(x);
        part.thresholds.apply(x);
        part.thresholds
    }

    fn empty_partition(&self) -> Partition<T> {
        Partition {
            thresholds: Thresholds::new(T::zero(), self.lo, self.hi),
            m_begin: 0,
            l_begin: 0,
        }
    }

    /// Pegging search for the threshold of `phi(t) = target + q * t`, where
    /// `phi(t) = sum(clamp(x - t, lo, hi))`.
    ///
    /// `q = 0` is the equality form; `q = 1/rho` with `target = 0` is the
    /// slack biased fixed point.
    fn search(&self, x: &mut [T], target: T, q: T) -> Partition<T> {
        let n = x.len();
        let (lo, hi) = (self.lo, self.hi);
        let zero = T::zero();

        // [0, u_end) pegged at hi, [u_end, l_start) free, [l_start, n) at lo
        let mut u_end = 0usize;
        let mut l_start = n;
        let mut t;

        loop {
            let m = l_start - u_end;
            let denom = T::of_usize(m) + q;
            if denom <= zero {
                // The budget equals an all-bounds sum; any threshold in the
                // feasible window projects identically.
                t = if l_start < n {
                    max_of(&x[l_start..]) - lo
                } else {
                    min_of(&x[..u_end]) - hi
                };
                break;
            }

            let u = T::of_usize(u_end);
            let l = T::of_usize(n - l_start);
            let mut comp = zero;
            let s_m = self.sum.sum_compensated(&x[u_end..l_start], zero, &mut comp);
            t = (s_m + u * hi + l * lo - target) / denom;

            // Residual of the clipped equation at this candidate; the free
            // part cancels by construction of t, so only violators remain.
            let mut g = zero;
            let mut g_comp = zero;
            let mut violators = 0usize;
            for &v in x[u_end..l_start].iter() {
                let d = v - t;
                if d > hi {
                    self.sum.add(hi - d, &mut g, &mut g_comp);
                    violators += 1;
                } else if d < lo {
                    self.sum.add(lo - d, &mut g, &mut g_comp);
                    violators += 1;
                }
            }
            if violators == 0 || g == zero {
                break;
            }

            if g > zero {
                // Threshold must rise: coordinates already below lo stay there.
                let new_l = peg_low(x, u_end, l_start, t, lo);
                if new_l == l_start {
                    break;
                }
                l_start = new_l;
            } else {
                // Threshold must fall: coordinates already above hi stay there.
                let new_u = peg_high(x, u_end, l_start, t, hi);
                if new_u == u_end {
                    break;
                }
                u_end = new_u;
            }
        }

        self.partition_by(x, t)
    }

    /// Final partition pass: reorders `x` around the converged threshold so
    /// the range invariants hold exactly, and assembles the result.
    fn partition_by(&self, x: &mut [T], t: T) -> Partition<T> {
        let n = x.len();
        let mut m_begin = 0usize;
        for i in 0..n {
            if x[i] - t >= self.hi {
                x.swap(i, m_begin);
                m_begin += 1;
            }
        }
        let mut l_begin = n;
        let mut j = m_begin;
        while j < l_begin {
            if x[j] - t <= self.lo {
                l_begin -= 1;
                x.swap(j, l_begin);
            } else {
                j += 1;
            }
        }
        Partition {
            thresholds: Thresholds::new(t, self.lo, self.hi),
            m_begin,
            l_begin,
        }
    }
}

/// Moves coordinates of `x[u_end..l_start]` with `v - t < lo` to the back of
/// the range; returns the new `l_start`.
fn peg_low<T: Real>(x: &mut [T], u_end: usize, l_start: usize, t: T, lo: T) -> usize {
    let mut i = u_end;
    let mut j = l_start;
    while i < j {
        if x[i] - t < lo {
            j -= 1;
            x.swap(i, j);
        } else {
            i += 1;
        }
    }
    j
}

/// Moves coordinates of `x[u_end..l_start]` with `v - t > hi` to the front
/// of the range; returns the new `u_end`.
fn peg_high<T: Real>(x: &mut [T], u_end: usize, l_start: usize, t: T, hi: T) -> usize {
    let mut front = u_end;
    for i in u_end..l_start {
        if x[i] - t > hi {
            x.swap(i, front);
            front += 1;
        }
    }
    front
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
