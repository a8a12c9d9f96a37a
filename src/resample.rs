//! Separable image resampling with cubic splines.
//!
//! A 2D resize is done as two 1D passes per channel. Each source row is fit
//! with a spline whose nodes sit at the row's pixels, spread out by the
//! horizontal scale, and evaluated at every destination column. The columns
//! of that intermediate image are then fit and evaluated the same way at
//! every destination row. Only the final pass clamps to `[0, 1]`.
//!
//! Each channel owns one spline that is refilled for every row and column,
//! so the fitting storage is allocated once per channel rather than once per
//! scanline. With the `rayon` feature, channels are processed in parallel.
//!
//! ```rust
//! use bandspline::{resample, Continuity};
//!
//! // 2x2 RGB checkerboard
//! let black = [0.0_f64; 3];
//! let white = [1.0_f64; 3];
//! let src = [black, white, white, black];
//!
//! let out = resample(&src, 2, 2, 2.0, Continuity::C2).unwrap();
//! assert_eq!((out.width, out.height), (4, 4));
//! assert_eq!(out.pixels.len(), 16);
//! assert!(out.pixels.iter().flatten().all(|&v| (0.0..=1.0).contains(&v)));
//! ```
use alloc::vec;
use alloc::vec::Vec;

use num_traits::{Float, NumCast};

use crate::error::ResampleError;
use crate::spline::{Continuity, CubicSpline, Point};

/// Channel value type of a resample.
///
/// Any [`Float`]. With the `rayon` feature, channels are processed on
/// separate threads and the value type must also be `Send + Sync`.
#[cfg(not(feature = "rayon"))]
pub trait Sample: Float {}

#[cfg(not(feature = "rayon"))]
impl<T: Float> Sample for T {}

/// Channel value type of a resample.
///
/// Any [`Float`]. With the `rayon` feature, channels are processed on
/// separate threads and the value type must also be `Send + Sync`.
#[cfg(feature = "rayon")]
pub trait Sample: Float + Send + Sync {}

#[cfg(feature = "rayon")]
impl<T: Float + Send + Sync> Sample for T {}

/// Output of a resample.
#[derive(Clone, Debug, PartialEq)]
pub struct Resampled<T, const C: usize> {
    /// Row-major pixels, size width * height
    pub pixels: Vec<[T; C]>,

    pub width: usize,
    pub height: usize,

    /// Actual horizontal scale, `width / source width`
    pub scale_x: T,

    /// Actual vertical scale, `height / source height`
    pub scale_y: T,
}

/// Node and evaluation positions shared by every channel of one resample.
struct Layout<T> {
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
    scale_x: T,
    scale_y: T,

    /// Row node x positions, j * scale_x
    node_x: Vec<T>,

    /// Column node positions, j * scale_y
    node_y: Vec<T>,

    /// Destination columns 0, 1, 2, ...
    dst_x: Vec<T>,

    /// Destination rows 0, 1, 2, ...
    dst_y: Vec<T>,
}

/// Resamples images with `C` channels, reusing one spline per channel
/// across rows, columns, and calls.
#[derive(Clone, Debug)]
pub struct SeparableResampler<T: Float, const C: usize> {
    continuity: Continuity,
    splines: [CubicSpline<T>; C],
}

impl<T, const C: usize> SeparableResampler<T, C>
where
    T: Sample,
{
    pub fn new(continuity: Continuity) -> Self {
        Self {
            continuity,
            splines: core::array::from_fn(|_| CubicSpline::new()),
        }
    }

    pub fn continuity(&self) -> Continuity {
        self.continuity
    }

    pub fn set_continuity(&mut self, continuity: Continuity) {
        self.continuity = continuity;
    }

    /// Resize a row-major `width` x `height` image by `zoom`.
    ///
    /// The destination is `floor(width * zoom + 0.49)` by
    /// `floor(height * zoom + 0.49)` pixels. Because each dimension is
    /// rounded on its own, the scales actually applied are returned
    /// alongside the pixels and may differ slightly from `zoom` and from
    /// each other.
    ///
    /// Channel values are expected in `[0, 1]`; output is clamped to that range.
    ///
    /// # Errors
    /// * If `zoom` is not finite and positive
    /// * If `width` or `height` is zero
    /// * If `src` does not hold `width * height` pixels
    /// * If the zoom rounds either destination dimension to zero
    /// * If a C2 fit fails
    pub fn resample(
        &mut self,
        src: &[[T; C]],
        width: usize,
        height: usize,
        zoom: T,
    ) -> Result<Resampled<T, C>, ResampleError> {
        let layout = Layout::new(width, height, zoom)?;
        if src.len() != width * height {
            return Err(ResampleError::DimensionMismatch);
        }

        log::debug!(
            "Resampling {}x{} -> {}x{} (scale {:.4} x {:.4}) with {:?} splines",
            width,
            height,
            layout.dst_width,
            layout.dst_height,
            layout.scale_x.to_f64().unwrap_or(f64::NAN),
            layout.scale_y.to_f64().unwrap_or(f64::NAN),
            self.continuity
        );

        let planes = resample_channels(&mut self.splines, self.continuity, src, &layout)?;

        let pixels = (0..layout.dst_width * layout.dst_height)
            .map(|i| core::array::from_fn(|c| planes[c][i]))
            .collect();

        Ok(Resampled {
            pixels,
            width: layout.dst_width,
            height: layout.dst_height,
            scale_x: layout.scale_x,
            scale_y: layout.scale_y,
        })
    }
}

/// Resize a row-major `width` x `height` image by `zoom` with splines of the
/// given continuity.
///
/// This is a convenience function that builds a fresh [`SeparableResampler`];
/// keep one around to reuse its spline storage across many images.
pub fn resample<T, const C: usize>(
    src: &[[T; C]],
    width: usize,
    height: usize,
    zoom: T,
    continuity: Continuity,
) -> Result<Resampled<T, C>, ResampleError>
where
    T: Sample,
{
    SeparableResampler::new(continuity).resample(src, width, height, zoom)
}

impl<T: Float> Layout<T> {
    fn new(width: usize, height: usize, zoom: T) -> Result<Self, ResampleError> {
        if !(zoom.is_finite() && zoom > T::zero()) {
            return Err(ResampleError::InvalidZoom);
        }
        if width == 0 || height == 0 {
            return Err(ResampleError::EmptySource);
        }

        let dst_width = zoomed_size(width, zoom)?;
        let dst_height = zoomed_size(height, zoom)?;
        if dst_width == 0 || dst_height == 0 {
            return Err(ResampleError::EmptyOutput);
        }

        let scale_x = ratio(dst_width, width)?;
        let scale_y = ratio(dst_height, height)?;

        Ok(Self {
            src_width: width,
            src_height: height,
            dst_width,
            dst_height,
            scale_x,
            scale_y,
            node_x: positions(width, scale_x)?,
            node_y: positions(height, scale_y)?,
            dst_x: positions(dst_width, T::one())?,
            dst_y: positions(dst_height, T::one())?,
        })
    }
}

/// `floor(n * zoom + 0.49)`
fn zoomed_size<T: Float>(n: usize, zoom: T) -> Result<usize, ResampleError> {
    let bias = T::from(0.49).ok_or(ResampleError::Unrepresentable)?;
    let n = <T as NumCast>::from(n).ok_or(ResampleError::Unrepresentable)?;
    <usize as NumCast>::from((n * zoom + bias).floor()).ok_or(ResampleError::Unrepresentable)
}

fn ratio<T: Float>(num: usize, den: usize) -> Result<T, ResampleError> {
    let num = <T as NumCast>::from(num).ok_or(ResampleError::Unrepresentable)?;
    let den = <T as NumCast>::from(den).ok_or(ResampleError::Unrepresentable)?;
    Ok(num / den)
}

/// `[0, step, 2 * step, ...]` with `n` entries
fn positions<T: Float>(n: usize, step: T) -> Result<Vec<T>, ResampleError> {
    (0..n)
        .map(|i| {
            <T as NumCast>::from(i)
                .map(|i| i * step)
                .ok_or(ResampleError::Unrepresentable)
        })
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn resample_channels<T, const C: usize>(
    splines: &mut [CubicSpline<T>; C],
    continuity: Continuity,
    src: &[[T; C]],
    layout: &Layout<T>,
) -> Result<Vec<Vec<T>>, ResampleError>
where
    T: Sample,
{
    splines
        .iter_mut()
        .enumerate()
        .map(|(c, spline)| resample_channel(spline, continuity, src, c, layout))
        .collect()
}

#[cfg(feature = "rayon")]
fn resample_channels<T, const C: usize>(
    splines: &mut [CubicSpline<T>; C],
    continuity: Continuity,
    src: &[[T; C]],
    layout: &Layout<T>,
) -> Result<Vec<Vec<T>>, ResampleError>
where
    T: Sample,
{
    use rayon::prelude::*;

    // Each channel has its own spline and its own output plane
    splines
        .as_mut_slice()
        .par_iter_mut()
        .enumerate()
        .map(|(c, spline)| resample_channel(spline, continuity, src, c, layout))
        .collect()
}

/// Both passes for channel `c`, returning a row-major plane of the destination size.
fn resample_channel<T: Float, const C: usize>(
    spline: &mut CubicSpline<T>,
    continuity: Continuity,
    src: &[[T; C]],
    c: usize,
    layout: &Layout<T>,
) -> Result<Vec<T>, ResampleError> {
    let (w, h) = (layout.src_width, layout.src_height);
    let (dw, dh) = (layout.dst_width, layout.dst_height);

    // Horizontal pass, unclamped
    let mut rows = vec![T::zero(); dw * h];
    spline.resize(w);
    for (pixels, out) in src.chunks_exact(w).zip(rows.chunks_exact_mut(dw)) {
        for ((node, &x), p) in spline.nodes_mut().iter_mut().zip(&layout.node_x).zip(pixels) {
            *node = Point::new(x, p[c]);
        }
        spline.fit(continuity)?;
        spline.eval_monotonic(&layout.dst_x, out)?;
    }

    // Vertical pass over the intermediate columns, clamped
    let mut plane = vec![T::zero(); dw * dh];
    let mut column = vec![T::zero(); dh];
    spline.resize(h);
    for x in 0..dw {
        for (j, (node, &y)) in spline.nodes_mut().iter_mut().zip(&layout.node_y).enumerate() {
            *node = Point::new(y, rows[j * dw + x]);
        }
        spline.fit(continuity)?;
        spline.eval_monotonic(&layout.dst_y, &mut column)?;
        for (y, &v) in column.iter().enumerate() {
            plane[y * dw + x] = v.max(T::zero()).min(T::one());
        }
    }

    Ok(plane)
}

#[cfg(test)]
mod test {
    use super::{resample, Resampled, Sample, SeparableResampler};
    use crate::error::ResampleError;
    use crate::spline::Continuity;
    use crate::testing::*;
    use crate::utils::*;

    const MODES: [Continuity; 2] = [Continuity::C1, Continuity::C2];

    /// Horizontal ramp 0, 85, 170, 255 on every row, doubled in C1 mode
    #[test]
    fn test_ramp_stays_monotonic() {
        let ramp = [0.0, 85.0, 170.0, 255.0];
        let src = image_from_fn(4, 4, |x, _| [ramp[x] / 255.0]);

        let out = resample(&src, 4, 4, 2.0_f64, Continuity::C1).unwrap();
        assert_eq!((out.width, out.height), (8, 8));
        assert_eq!((out.scale_x, out.scale_y), (2.0, 2.0));

        for row in out.pixels.chunks_exact(out.width) {
            assert!(row.windows(2).all(|w| w[1][0] >= w[0][0]));
            assert!(row.iter().all(|p| (0.0..=1.0).contains(&p[0])));
            // Source samples land on the even columns
            (0..4).for_each(|j| assert!((row[2 * j][0] - ramp[j] / 255.0).abs() < 1e-12));
        }
    }

    /// At zoom 1 every destination pixel sits exactly on a node
    #[test]
    fn test_unit_zoom_reproduces_source() {
        let mut rng = rng_fixed_seed();
        let (w, h) = (9, 6);
        let vals = randn::<f64>(&mut rng, 3 * w * h);
        let src = image_from_fn(w, h, |x, y| {
            let i = 3 * (y * w + x);
            [vals[i], vals[i + 1], vals[i + 2]]
        });

        for mode in MODES {
            let out = resample(&src, w, h, 1.0, mode).unwrap();
            assert_eq!((out.width, out.height), (w, h));
            for (p, q) in out.pixels.iter().zip(src.iter()) {
                (0..3).for_each(|c| assert!((p[c] - q[c]).abs() < 1e-9));
            }
        }
    }

    /// A plane is linear along rows and columns, which both fits reproduce
    /// exactly, including the extrapolated last column and row
    #[test]
    fn test_plane_is_reproduced() {
        let (w, h) = (5, 4);
        let ys: Vec<f64> = (0..h).map(|y| y as f64).collect();
        let xs: Vec<f64> = (0..w).map(|x| x as f64).collect();
        let plane = |x: f64, y: f64| (x + 2.0 * y) / 16.0;
        let src: Vec<[f64; 1]> = meshgrid(&[&ys[..], &xs[..]])
            .iter()
            .map(|yx| [plane(yx[1], yx[0])])
            .collect();

        for mode in MODES {
            let out = resample(&src, w, h, 2.0, mode).unwrap();
            assert_eq!((out.width, out.height), (10, 8));
            for (i, p) in out.pixels.iter().enumerate() {
                let (x, y) = ((i % out.width) as f64, (i / out.width) as f64);
                let expected = plane(x / out.scale_x, y / out.scale_y);
                assert!((p[0] - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_constant_image() {
        let src = image_from_fn(7, 3, |_, _| [0.25_f64, 0.5, 0.75]);
        for mode in MODES {
            let out = resample(&src, 7, 3, 1.7, mode).unwrap();
            for p in out.pixels.iter() {
                assert!((p[0] - 0.25).abs() < 1e-12);
                assert!((p[1] - 0.5).abs() < 1e-12);
                assert!((p[2] - 0.75).abs() < 1e-12);
            }
        }
    }

    /// Overshoot around a sharp edge is clamped in the output
    #[test]
    fn test_output_is_clamped() {
        let src = image_from_fn(6, 6, |x, y| [if (x / 2 + y / 2) % 2 == 0 { 0.0_f64 } else { 1.0 }]);
        for mode in MODES {
            let out = resample(&src, 6, 6, 3.0, mode).unwrap();
            assert!(out.pixels.iter().all(|p| (0.0..=1.0).contains(&p[0])));
            assert!(out.pixels.iter().any(|p| p[0] == 0.0));
            assert!(out.pixels.iter().any(|p| p[0] == 1.0));
        }
    }

    /// Dimensions round independently, and the applied scales are reported
    #[test]
    fn test_effective_scale() {
        let src = image_from_fn(3, 5, |x, y| [(x + y) as f64 / 8.0]);
        let out = resample(&src, 3, 5, 1.5, Continuity::C2).unwrap();

        // 3 * 1.5 + 0.49 = 4.99 -> 4; 5 * 1.5 + 0.49 = 7.99 -> 7
        assert_eq!((out.width, out.height), (4, 7));
        assert!((out.scale_x - 4.0 / 3.0).abs() < 1e-15);
        assert!((out.scale_y - 7.0 / 5.0).abs() < 1e-15);
        assert_eq!(out.pixels.len(), 28);

        let out = resample(&src, 3, 5, 0.5, Continuity::C1).unwrap();
        assert_eq!((out.width, out.height), (1, 2));
    }

    #[test]
    fn test_resampler_reuse() {
        let mut rng = rng_fixed_seed();
        let vals = randn::<f64>(&mut rng, 2 * 8 * 5);
        let src = image_from_fn(8, 5, |x, y| [vals[2 * (y * 8 + x)], vals[2 * (y * 8 + x) + 1]]);
        let small = image_from_fn(3, 2, |x, y| [x as f64 / 3.0, y as f64 / 2.0]);

        let mut resampler = SeparableResampler::<f64, 2>::new(Continuity::C2);
        let first = resampler.resample(&src, 8, 5, 2.5).unwrap();
        let _ = resampler.resample(&small, 3, 2, 4.0).unwrap();
        let again = resampler.resample(&src, 8, 5, 2.5).unwrap();
        assert_eq!(first, again);

        resampler.set_continuity(Continuity::C1);
        assert_eq!(resampler.continuity(), Continuity::C1);
        let c1 = resampler.resample(&src, 8, 5, 2.5).unwrap();
        assert_eq!(c1, resample(&src, 8, 5, 2.5, Continuity::C1).unwrap());
    }

    fn upscale_ramp<T: Sample>(mode: Continuity) -> Resampled<T, 1> {
        let quarter = T::one() / T::from(4).unwrap();
        let src = image_from_fn(4, 2, |x, _| [T::from(x).unwrap() * quarter]);
        resample(&src, 4, 2, T::from(2).unwrap(), mode).unwrap()
    }

    /// Any float channel type takes the same path
    #[test]
    fn test_single_precision() {
        for mode in MODES {
            let out = upscale_ramp::<f32>(mode);
            assert_eq!((out.width, out.height), (8, 4));
            assert_eq!((out.scale_x, out.scale_y), (2.0, 2.0));
            for row in out.pixels.chunks_exact(8) {
                (0..4).for_each(|j| assert!((row[2 * j][0] - j as f32 / 4.0).abs() < 1e-5));
            }
        }
    }

    /// C2 rows are assembled from powers of absolute pixel positions, so
    /// accuracy degrades with width; a realistic scanline stays well inside
    /// what an 8- or 16-bit channel can resolve
    #[test]
    fn test_wide_scanline_accuracy() {
        let mut rng = rng_fixed_seed();
        let w = 1024;
        let src: Vec<[f64; 1]> = randn::<f64>(&mut rng, w).into_iter().map(|v| [v]).collect();

        for mode in MODES {
            let out = resample(&src, w, 1, 1.0, mode).unwrap();
            assert_eq!(out.width, w);
            for (p, q) in out.pixels.iter().zip(src.iter()) {
                assert!((p[0] - q[0]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_single_pixel_dimensions() {
        // One row: the vertical pass fits single-node splines
        let src = image_from_fn(4, 1, |x, _| [x as f64 / 4.0]);
        for mode in MODES {
            let out = resample(&src, 4, 1, 2.0, mode).unwrap();
            assert_eq!((out.width, out.height), (8, 2));
            for row in out.pixels.chunks_exact(8) {
                (0..4).for_each(|j| assert!((row[2 * j][0] - j as f64 / 4.0).abs() < 1e-12));
            }
        }
    }

    #[test]
    fn test_errors() {
        let src = image_from_fn(2, 2, |x, y| [(x * y) as f64]);
        assert_eq!(
            resample(&src, 2, 2, 0.0, Continuity::C1),
            Err(ResampleError::InvalidZoom)
        );
        assert_eq!(
            resample(&src, 2, 2, f64::NAN, Continuity::C1),
            Err(ResampleError::InvalidZoom)
        );
        assert_eq!(
            resample(&src, 2, 2, f64::INFINITY, Continuity::C1),
            Err(ResampleError::InvalidZoom)
        );
        assert_eq!(
            resample(&src, 0, 2, 1.0, Continuity::C1),
            Err(ResampleError::EmptySource)
        );
        assert_eq!(
            resample(&src, 3, 2, 1.0, Continuity::C1),
            Err(ResampleError::DimensionMismatch)
        );
        assert_eq!(
            resample(&src, 2, 2, 0.1, Continuity::C1),
            Err(ResampleError::EmptyOutput)
        );
    }
}
