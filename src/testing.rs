use rand::Rng;
use rand::SeedableRng;
use rand::distr::StandardUniform;
use rand::rngs::StdRng;

use crate::spline::Point;

/// Fixed random seed to support repeatable testing
const SEED: [u8; 32] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 15, 14, 13, 12, 11, 10, 9, 8, 7, 6,
    5, 4, 3, 2, 1,
];

/// Get a random number generator with a const seed for repeatable testing
pub fn rng_fixed_seed() -> StdRng {
    StdRng::from_seed(SEED)
}

/// Generate `n` random numbers using provided generator
pub fn randn<T>(rng: &mut StdRng, n: usize) -> Vec<T>
where
    StandardUniform: rand::distr::Distribution<T>,
{
    std::iter::repeat_with(|| rng.random::<T>())
        .take(n)
        .collect()
}

/// Random spline nodes with strictly increasing x, spaced between
/// `min_step` and `min_step + 1` and roughly centered on zero,
/// and y in [-1, 1).
pub fn random_nodes(rng: &mut StdRng, n: usize, min_step: f64) -> Vec<Point<f64>> {
    let steps = randn::<f64>(rng, n);
    let ys = randn::<f64>(rng, n);
    let mut x = -0.5 * (n as f64) * (min_step + 0.5);
    steps
        .iter()
        .zip(ys.iter())
        .map(|(&dx, &y)| {
            x += min_step + dx;
            Point::new(x, 2.0 * y - 1.0)
        })
        .collect()
}
