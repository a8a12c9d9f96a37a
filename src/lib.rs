//! Piecewise-cubic splines with banded solves, and separable image resampling
//! built on top of them.
//!
//! * [`banded`]: Gaussian elimination with partial pivoting for band matrices
//! * [`spline`]: cubic polynomials and C1 or C2 splines through ordered nodes
//! * [`resample`]: resize multi-channel images one row and one column at a time
//!
//! ```rust
//! use bandspline::{Continuity, CubicSpline, Point};
//!
//! let mut spline = CubicSpline::from_points(&[
//!     Point::new(0.0_f64, 0.0),
//!     Point::new(1.0, 1.0),
//!     Point::new(2.0, 0.0),
//!     Point::new(3.0, 1.0),
//! ]);
//!
//! spline.fit(Continuity::C1).unwrap();
//! let smooth = spline.value(1.5);
//!
//! spline.fit(Continuity::C2).unwrap();
//! let smoother = spline.value(1.5);
//!
//! assert!(smooth > 0.0 && smoother > 0.0);
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
// These "needless" range loops are a significant speedup
#![allow(clippy::needless_range_loop)]

extern crate alloc;

pub mod banded;
pub mod error;
pub mod resample;
pub mod spline;

pub use banded::BandMatrix;
pub use error::{ResampleError, SolveError, SplineError};
pub use resample::{resample, Resampled, Sample, SeparableResampler};
pub use spline::{Continuity, CubicPolynomial, CubicSpline, FitState, Point};

#[cfg(feature = "std")]
pub mod utils;

#[cfg(all(test, feature = "std"))]
pub(crate) mod testing;
