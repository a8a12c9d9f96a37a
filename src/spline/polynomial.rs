//! A single cubic `c0 + c1*x + c2*x^2 + c3*x^3`.
//!
//! ```rust
//! use bandspline::CubicPolynomial;
//!
//! // Value 1 and slope 0 at x=1, value 3 and slope 2 at x=2
//! let p = CubicPolynomial::interpolate(1.0_f64, 2.0, 1.0, 0.0, 3.0, 2.0);
//!
//! assert!((p.value(1.0) - 1.0).abs() < 1e-12);
//! assert!((p.value(2.0) - 3.0).abs() < 1e-12);
//! assert!(p.derivative_value(1.0).abs() < 1e-12);
//! assert!((p.derivative().value(2.0) - 2.0).abs() < 1e-12);
//! ```
use num_traits::Float;

use super::Point;

/// Cubic polynomial with coefficients in ascending order of degree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicPolynomial<T> {
    coeffs: [T; 4],
}

impl<T: Float> Default for CubicPolynomial<T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Float> CubicPolynomial<T> {
    /// The zero polynomial.
    pub fn zero() -> Self {
        Self {
            coeffs: [T::zero(); 4],
        }
    }

    pub(crate) fn from_coeffs(coeffs: [T; 4]) -> Self {
        Self { coeffs }
    }

    /// Coefficients `[c0, c1, c2, c3]`.
    pub fn coeffs(&self) -> [T; 4] {
        self.coeffs
    }

    /// The unique cubic `p` with `p(a) = value_a`, `p'(a) = deriv_a`,
    /// `p(b) = value_b`, and `p'(b) = deriv_b`.
    ///
    /// `a` and `b` must be distinct; coincident endpoints produce
    /// non-finite coefficients.
    #[inline]
    pub fn interpolate(a: T, b: T, value_a: T, deriv_a: T, value_b: T, deriv_b: T) -> Self {
        let one = T::one();
        let two = one + one;
        let three = two + one;

        let h = b - a;
        let dy = value_b - value_a;

        // `p` and `q` are the difference between this function and a linear one going
        // forward or backward with the imposed slopes, in units of the normalized
        // coordinate t = (x - a) / h.
        let p = deriv_a * h - dy;
        let q = -deriv_b * h + dy;

        // Coefficients in u = x - a
        let h2 = h * h;
        let l1 = (dy + p) / h;
        let l2 = (q - (p + p)) / h2;
        let l3 = (p - q) / (h2 * h);

        // Shift back to absolute x
        let a2 = a * a;
        let c0 = value_a - l1 * a + l2 * a2 - l3 * a2 * a;
        let c1 = l1 - two * l2 * a + three * l3 * a2;
        let c2 = l2 - three * l3 * a;
        let c3 = l3;

        Self::from_coeffs([c0, c1, c2, c3])
    }

    /// Cubic spanning `points[0]` to `points[3]`, with the end slopes taken
    /// from the first and last secants.
    ///
    /// The two middle points only steer the end slopes; the curve is not
    /// guaranteed to pass through them.
    pub fn from_secants(points: &[Point<T>; 4]) -> Self {
        let [p0, p1, p2, p3] = *points;
        let k0 = (p1.y - p0.y) / (p1.x - p0.x);
        let k1 = (p3.y - p2.y) / (p3.x - p2.x);
        Self::interpolate(p0.x, p3.x, p0.y, k0, p3.y, k1)
    }

    /// Evaluate with Horner's method.
    #[inline]
    pub fn value(&self, x: T) -> T {
        let [c0, c1, c2, c3] = self.coeffs;
        ((c3 * x + c2) * x + c1) * x + c0
    }

    /// First derivative as a polynomial; the cubic coefficient is zero.
    pub fn derivative(&self) -> Self {
        let [_, c1, c2, c3] = self.coeffs;
        let two = T::one() + T::one();
        let three = two + T::one();
        Self::from_coeffs([c1, two * c2, three * c3, T::zero()])
    }

    /// Second derivative as a polynomial; the quadratic and cubic
    /// coefficients are zero.
    pub fn derivative2(&self) -> Self {
        let [_, _, c2, c3] = self.coeffs;
        let two = T::one() + T::one();
        let six = two + two + two;
        Self::from_coeffs([two * c2, six * c3, T::zero(), T::zero()])
    }

    /// First derivative at `x`.
    #[inline]
    pub fn derivative_value(&self, x: T) -> T {
        let [_, c1, c2, c3] = self.coeffs;
        let two = T::one() + T::one();
        let three = two + T::one();
        (three * c3 * x + two * c2) * x + c1
    }

    /// Second derivative at `x`.
    #[inline]
    pub fn derivative2_value(&self, x: T) -> T {
        let [_, _, c2, c3] = self.coeffs;
        let two = T::one() + T::one();
        let six = two + two + two;
        six * c3 * x + two * c2
    }
}
