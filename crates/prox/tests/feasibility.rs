//! Randomized feasibility properties over wide-dynamic-range inputs.
//!
//! Values span magnitude buckets 2^p..2^(p+1); constraint parameters are
//! resampled until the budget is reachable. The post-projection tolerance
//! scales as eps * max(1, max|x_i|) * n.

use ascent_num::KahanSum;
use ascent_prox::{KnapsackProjector, TopKSimplexProjector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TRIALS_PER_BUCKET: usize = 100;
const TOL: f64 = 256.0;

/// Appends `n` values with magnitude in [2^pow_from, 2^pow_to) and the sign
/// of `coeff`.
fn populate(n: usize, pow_from: i32, pow_to: i32, coeff: f64, rng: &mut StdRng, v: &mut Vec<f64>) {
    for _ in 0..n {
        let e = rng.random_range(f64::from(pow_from)..f64::from(pow_to));
        v.push(coeff * e.exp2());
    }
}

/// Samples (lo, hi, rhs, rho) until the budget is reachable for `n`
/// coordinates.
fn sample_params(n: usize, rng: &mut StdRng) -> (f64, f64, f64, f64) {
    let nf = n as f64;
    loop {
        let lo = rng.random_range(-2.0..0.5);
        let hi = rng.random_range(-0.5..2.0);
        let rhs = rng.random_range(-5.0..5.0);
        let rho = rng.random_range(0.0..2.0);
        if lo <= hi && lo * nf <= rhs && hi * nf >= rhs {
            return (lo, hi, rhs, rho);
        }
    }
}

fn feasibility_eps(v: &[f64]) -> f64 {
    let max_abs = v.iter().fold(0.0_f64, |acc, &x| acc.max(x.abs()));
    f64::EPSILON * max_abs.max(1.0) * v.len() as f64
}

fn check_knapsack_feasible(lo: f64, hi: f64, rhs: f64, rho: f64, v: &mut Vec<f64>) {
    let eps = TOL * feasibility_eps(v);
    let proj = KnapsackProjector::new(lo, hi, rhs)
        .unwrap()
        .with_bias(rho)
        .unwrap();
    proj.project(v);

    for &x in v.iter() {
        assert!(x >= lo, "coordinate {x} below lo {lo}");
        assert!(x <= hi, "coordinate {x} above hi {hi}");
    }
    let sum: f64 = v.iter().sum();
    assert!(
        sum <= rhs + eps,
        "sum {sum} exceeds budget {rhs} beyond tolerance {eps}"
    );
}

fn run_knapsack_buckets(coeffs: &[f64], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut v = Vec::new();
    for p in -6..6 {
        for _ in 0..TRIALS_PER_BUCKET {
            v.clear();
            for &c in coeffs {
                populate(100, p, p + 1, c, &mut rng, &mut v);
            }
            let (lo, hi, rhs, rho) = sample_params(v.len(), &mut rng);
            check_knapsack_feasible(lo, hi, rhs, rho, &mut v);
        }
    }
}

#[test]
fn test_knapsack_feasible_positive() {
    run_knapsack_buckets(&[1.0], 1);
}

#[test]
fn test_knapsack_feasible_negative() {
    run_knapsack_buckets(&[-1.0], 2);
}

#[test]
fn test_knapsack_feasible_mixed() {
    run_knapsack_buckets(&[1.0, -1.0], 3);
}

#[test]
fn test_knapsack_feasible_f32() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut v: Vec<f32> = Vec::new();
    for p in -3..3 {
        for _ in 0..TRIALS_PER_BUCKET {
            v.clear();
            for _ in 0..50 {
                let e: f32 = rng.random_range(p as f32..(p + 1) as f32);
                v.push(e.exp2());
            }
            for _ in 0..50 {
                let e: f32 = rng.random_range(p as f32..(p + 1) as f32);
                v.push(-e.exp2());
            }
            let nf = v.len() as f32;
            let (lo, hi, rhs, rho) = loop {
                let lo: f32 = rng.random_range(-2.0..0.5);
                let hi: f32 = rng.random_range(-0.5..2.0);
                let rhs: f32 = rng.random_range(-5.0..5.0);
                let rho: f32 = rng.random_range(0.0..2.0);
                if lo <= hi && lo * nf <= rhs && hi * nf >= rhs {
                    break (lo, hi, rhs, rho);
                }
            };
            let max_abs = v.iter().fold(0.0_f32, |acc, &x| acc.max(x.abs()));
            let eps = 256.0 * f32::EPSILON * max_abs.max(1.0) * nf;

            let proj = KnapsackProjector::new(lo, hi, rhs)
                .unwrap()
                .with_bias(rho)
                .unwrap();
            proj.project(&mut v);

            assert!(v.iter().all(|&x| x >= lo && x <= hi));
            let sum: f32 = v.iter().sum();
            assert!(sum <= rhs + eps);
        }
    }
}

#[test]
fn test_knapsack_feasible_kahan_policy() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut v = Vec::new();
    for p in -6..6 {
        for _ in 0..TRIALS_PER_BUCKET {
            v.clear();
            populate(50, p, p + 1, 1.0, &mut rng, &mut v);
            populate(50, p, p + 1, -1.0, &mut rng, &mut v);
            let (lo, hi, rhs, rho) = sample_params(v.len(), &mut rng);
            let eps = TOL * feasibility_eps(&v);

            let proj = KnapsackProjector::new(lo, hi, rhs)
                .unwrap()
                .with_bias(rho)
                .unwrap()
                .with_summation(KahanSum);
            proj.project(&mut v);

            assert!(v.iter().all(|&x| x >= lo && x <= hi));
            let sum: f64 = v.iter().sum();
            assert!(sum <= rhs + eps);
        }
    }
}

#[test]
fn test_knapsack_idempotent_on_projected_output() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut v = Vec::new();
    for p in -3..3 {
        for _ in 0..20 {
            v.clear();
            populate(40, p, p + 1, 1.0, &mut rng, &mut v);
            populate(40, p, p + 1, -1.0, &mut rng, &mut v);
            let (lo, hi, rhs, _) = sample_params(v.len(), &mut rng);
            let eps = TOL * feasibility_eps(&v);

            let proj = KnapsackProjector::new(lo, hi, rhs).unwrap();
            proj.project(&mut v);
            let mut first = v.clone();
            first.sort_by(|a, b| a.partial_cmp(b).unwrap());
            proj.project(&mut v);
            v.sort_by(|a, b| a.partial_cmp(b).unwrap());
            for (a, b) in first.iter().zip(v.iter()) {
                assert!((a - b).abs() <= eps, "reprojection moved {a} to {b}");
            }
        }
    }
}

#[test]
fn test_simplex_feasible_random() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut v = Vec::new();
    for p in -6..6 {
        for _ in 0..TRIALS_PER_BUCKET {
            v.clear();
            populate(30, p, p + 1, 1.0, &mut rng, &mut v);
            populate(30, p, p + 1, -1.0, &mut rng, &mut v);
            let n = v.len();
            let k = rng.random_range(1.0..n as f64);
            let rhs = rng.random_range(0.1..5.0);
            let rho = rng.random_range(0.0..2.0);
            let eps = TOL * feasibility_eps(&v);

            let proj = TopKSimplexProjector::new(k, rhs)
                .unwrap()
                .with_bias(rho)
                .unwrap();
            proj.project(&mut v);

            let sum: f64 = v.iter().sum();
            assert!(sum <= rhs + eps, "sum {sum} exceeds budget {rhs}");
            for &x in v.iter() {
                assert!(x >= 0.0, "negative coordinate {x}");
                assert!(
                    x <= sum / k + eps,
                    "coordinate {x} exceeds cap {} (k = {k})",
                    sum / k
                );
            }
        }
    }
}

#[test]
fn test_simplex_feasible_fractional_k() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut v = Vec::new();
    for _ in 0..200 {
        v.clear();
        populate(25, -2, 2, 1.0, &mut rng, &mut v);
        populate(25, -2, 2, -1.0, &mut rng, &mut v);
        let k = rng.random_range(1.0..10.0) + 0.5;
        let rhs = rng.random_range(0.1..5.0);
        let eps = TOL * feasibility_eps(&v);

        let proj = TopKSimplexProjector::new(k, rhs).unwrap();
        proj.project(&mut v);

        let sum: f64 = v.iter().sum();
        assert!(sum <= rhs + eps);
        for &x in v.iter() {
            assert!(x >= 0.0);
            assert!(x <= sum / k + eps);
        }
    }
}
