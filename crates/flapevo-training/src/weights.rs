//! Weight vector operations for the genetic algorithm.
//!
//! These operations are used by [`genetic::PopulationEvolver`](crate::genetic::PopulationEvolver)
//! to implement initialization, crossover and mutation. Network weights are signed, so every
//! operation keeps values inside `[-max_weight, max_weight]`.
//!
//! - **Initialization**: [`random`] generates random weight vectors
//! - **Crossover**: [`blx_alpha`] implements the BLX-α crossover operator
//! - **Mutation**: [`mutate`] applies Gaussian mutation

use rand::Rng;
use rand_distr::Normal;

/// Creates a weight vector by applying a function to each index.
///
/// ```
/// use flapevo_training::weights;
///
/// let weights = weights::from_fn(|i| 1.0 / (i as f32 + 1.0), 4);
/// assert_eq!(weights, vec![1.0, 0.5, 1.0 / 3.0, 0.25]);
/// ```
pub fn from_fn<F>(f: F, len: usize) -> Vec<f32>
where
    F: FnMut(usize) -> f32,
{
    (0..len).map(f).collect()
}

/// Generates a weight vector sampled uniformly from `[-max_weight, max_weight]`.
pub fn random<R>(rng: &mut R, max_weight: f32, len: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    from_fn(|_| rng.random_range(-max_weight..=max_weight), len)
}

/// Performs BLX-α (Blend Crossover) between two parent weight vectors.
///
/// For parents `x1` and `x2` at position `i`:
///
/// 1. Compute `d = |x2 - x1|`
/// 2. Expand range: `[min - α·d, max + α·d]`
/// 3. Sample offspring uniformly from the expanded range
/// 4. Clamp to `[-max_weight, max_weight]`
///
/// # Panics
///
/// Panics if parent vectors have different lengths.
pub fn blx_alpha<R>(p1: &[f32], p2: &[f32], alpha: f32, max_weight: f32, rng: &mut R) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    p1.iter()
        .zip(p2)
        .map(|(&x1, &x2)| {
            let min = f32::min(x1, x2);
            let max = f32::max(x1, x2);
            let d = max - min;
            let lower = min - alpha * d;
            let upper = max + alpha * d;
            rng.random_range(lower..=upper)
                .clamp(-max_weight, max_weight)
        })
        .collect()
}

/// Applies Gaussian mutation to a weight vector in-place.
///
/// Each weight is perturbed by `N(0, sigma)` with probability `rate`, then clamped to
/// `[-max_weight, max_weight]`. A `sigma` that does not describe a valid normal distribution
/// leaves the weights untouched.
pub fn mutate<R>(weights: &mut [f32], sigma: f32, max_weight: f32, rate: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let Ok(normal) = Normal::new(0.0, sigma) else {
        return;
    };
    let rate = f64::from(rate.clamp(0.0, 1.0));
    for w in weights {
        if rng.random_bool(rate) {
            *w = (*w + rng.sample(normal)).clamp(-max_weight, max_weight);
        }
    }
}

#[cfg(test)]
#[expect(clippy::float_cmp)]
mod tests {
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;

    #[test]
    fn test_random_is_signed_and_bounded() {
        let mut rng = StdRng::seed_from_u64(1);
        let weights = random(&mut rng, 2.0, 500);
        assert_eq!(weights.len(), 500);
        assert!(weights.iter().all(|w| (-2.0..=2.0).contains(w)));
        assert!(weights.iter().any(|&w| w < 0.0));
        assert!(weights.iter().any(|&w| w > 0.0));
    }

    #[test]
    fn test_blx_alpha_zero_stays_between_parents() {
        let mut rng = StdRng::seed_from_u64(2);
        let p1 = [-1.0, 0.0, 0.5];
        let p2 = [1.0, 0.0, 0.25];
        for _ in 0..100 {
            let child = blx_alpha(&p1, &p2, 0.0, 5.0, &mut rng);
            assert!((-1.0..=1.0).contains(&child[0]));
            assert_eq!(child[1], 0.0);
            assert!((0.25..=0.5).contains(&child[2]));
        }
    }

    #[test]
    fn test_blx_alpha_is_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let child = blx_alpha(&[-1.0], &[1.0], 2.0, 1.0, &mut rng);
            assert!((-1.0..=1.0).contains(&child[0]));
        }
    }

    #[test]
    fn test_mutate_rate_zero_is_noop() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut weights = vec![0.3, -0.7, 0.0];
        mutate(&mut weights, 1.0, 1.0, 0.0, &mut rng);
        assert_eq!(weights, [0.3, -0.7, 0.0]);
    }

    #[test]
    fn test_mutate_rate_one_changes_and_clamps() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut weights = vec![0.0; 50];
        mutate(&mut weights, 10.0, 1.0, 1.0, &mut rng);
        assert!(weights.iter().any(|&w| w != 0.0));
        assert!(weights.iter().all(|w| (-1.0..=1.0).contains(w)));
    }

    #[test]
    fn test_mutate_invalid_sigma_is_noop() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut weights = vec![0.5];
        mutate(&mut weights, f32::NAN, 1.0, 1.0, &mut rng);
        assert_eq!(weights, [0.5]);
    }
}
