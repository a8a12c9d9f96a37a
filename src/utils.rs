//! Convenience builders for node grids and multi-channel images,
//! echoing the grid helpers common in scripting languages.
use itertools::{iproduct, Itertools};
use num_traits::Float;

/// Generates evenly spaced values from start to stop,
/// including the endpoint.
///
/// A single point yields `[start]`; zero points yield an empty vector.
pub fn linspace<T: Float>(start: T, stop: T, n: usize) -> Vec<T> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let last = index_to_float::<T>(n - 1);
            (0..n)
                .map(|i| {
                    let t = index_to_float::<T>(i) / last;
                    start + (stop - start) * t
                })
                .collect()
        }
    }
}

/// Generates a meshgrid in C ordering (x0, y0, z0, x0, y0, z1, ..., x0, yn, zn)
pub fn meshgrid<T: Copy>(axes: &[&[T]]) -> Vec<Vec<T>> {
    axes.iter()
        .map(|axis| axis.iter().copied())
        .multi_cartesian_product()
        .collect()
}

/// Builds a row-major image of `width` x `height` pixels
/// by evaluating `f(x, y)` at each pixel's integer coordinates.
pub fn image_from_fn<T, F, const C: usize>(width: usize, height: usize, f: F) -> Vec<[T; C]>
where
    F: Fn(usize, usize) -> [T; C],
{
    iproduct!(0..height, 0..width)
        .map(|(y, x)| f(x, y))
        .collect()
}

/// Splits one channel out of an interleaved image.
pub fn channel<T: Copy, const C: usize>(pixels: &[[T; C]], c: usize) -> Vec<T> {
    pixels.iter().map(|p| p[c]).collect()
}

#[inline]
fn index_to_float<T: Float>(i: usize) -> T {
    // Every usize is representable, if rounded, as a float
    T::from(i).unwrap_or_else(T::infinity)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_linspace() {
        let x = linspace(-1.0_f64, 1.0, 5);
        assert_eq!(x, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(linspace(2.0_f64, 3.0, 1), vec![2.0]);
        assert!(linspace(2.0_f64, 3.0, 0).is_empty());
    }

    #[test]
    fn test_meshgrid_and_image() {
        let ys = [0.0_f64, 1.0];
        let xs = [0.0_f64, 10.0, 20.0];
        let grid = meshgrid(&[&ys[..], &xs[..]]);
        assert_eq!(grid.len(), 6);
        assert_eq!(grid[1], vec![0.0, 10.0]);
        assert_eq!(grid[3], vec![1.0, 0.0]);

        // Row-major layout matches the meshgrid ordering with y outermost
        let img = image_from_fn(3, 2, |x, y| [x as f64 * 10.0, y as f64]);
        for (p, g) in img.iter().zip(grid.iter()) {
            assert_eq!(p[0], g[1]);
            assert_eq!(p[1], g[0]);
        }
        assert_eq!(channel(&img, 1), vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    }
}
