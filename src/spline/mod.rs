//! Piecewise-cubic splines through an ordered list of nodes.
//!
//! Each interval between two consecutive nodes carries its own
//! [`CubicPolynomial`], expressed in the same (absolute) x coordinate as the
//! nodes. Two fitting modes are available:
//!
//! * [`Continuity::C1`] estimates a tangent at every node from its neighbors
//!   and joins the nodes with Hermite cubics. Value and first derivative are
//!   continuous; each segment only depends on a handful of nearby nodes, and
//!   no linear solve is needed.
//! * [`Continuity::C2`] solves one banded system for all coefficients at once
//!   so that value, first and second derivative are continuous everywhere,
//!   with a zero second derivative at both ends (a natural spline). Every
//!   segment depends on every node.
//!
//! Evaluation outside the node range extrapolates with the nearest end segment.
//!
//! ```rust
//! use bandspline::{Continuity, CubicSpline, Point};
//!
//! let points = [
//!     Point::new(2.0_f64, 1.0),
//!     Point::new(0.0, 0.0),
//!     Point::new(1.0, 3.0),
//!     Point::new(3.0, 0.5),
//! ];
//!
//! // Nodes are sorted by x on the way in
//! let mut spline = CubicSpline::from_points(&points);
//! spline.fit(Continuity::C2).unwrap();
//! assert!(spline.is_fitted(Continuity::C2));
//!
//! for p in points.iter() {
//!     assert!((spline.value(p.x) - p.y).abs() < 1e-9);
//! }
//! ```
use core::cmp::Ordering;
use core::ops::{Add, Sub};

use num_traits::Float;

pub mod cubic;
pub mod polynomial;

pub use cubic::CubicSpline;
pub use polynomial::CubicPolynomial;

/// Vectors shorter than this are left as-is by normalization.
pub const TANGENT_EPSILON: f64 = 1e-7;

/// A 2D node or direction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T: Float> Point<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::new(T::zero(), T::zero())
    }

    pub fn length(&self) -> T {
        self.x.hypot(self.y)
    }

    /// Scale to unit length; vectors shorter than `eps` are returned unchanged.
    #[inline]
    pub(crate) fn normalized(self, eps: T) -> Self {
        let l = self.length();
        if l >= eps {
            Self::new(self.x / l, self.y / l)
        } else {
            self
        }
    }

    /// dy/dx of a direction, or zero for a vertical one.
    #[inline]
    pub(crate) fn slope(&self) -> T {
        let k = self.y / self.x;
        if self.x != T::zero() && k.is_finite() {
            k
        } else {
            T::zero()
        }
    }

    /// Order by x, then by y. Incomparable values sort as equal.
    pub(crate) fn cmp_xy(&self, other: &Self) -> Ordering {
        self.x
            .partial_cmp(&other.x)
            .unwrap_or(Ordering::Equal)
            .then(self.y.partial_cmp(&other.y).unwrap_or(Ordering::Equal))
    }
}

impl<T: Float> Add for Point<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Float> Sub for Point<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Continuity contract of a spline fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Continuity {
    /// Value and first derivative continuous; local tangent estimates
    C1,
    /// Value, first and second derivative continuous; global banded solve
    C2,
}

/// Which fit, if any, the current segments reflect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitState {
    /// Nodes changed since the last fit, or no fit ran yet
    Unfitted,
    /// Segments come from the most recent fit in this mode
    Fitted(Continuity),
    /// The most recent C2 fit could not solve its system
    Failed,
}
