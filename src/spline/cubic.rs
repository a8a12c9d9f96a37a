//! Cubic spline over an owned, resizable node buffer.
//!
//! The node buffer, per-segment polynomials, per-node tangents, and the C2
//! solver workspace are all kept between fits so that repeated fits of the
//! same (or a smaller) size do not allocate. That is the access pattern of
//! scanline processing, where one spline is refilled and refit per row:
//!
//! ```rust
//! use bandspline::{Continuity, CubicSpline, Point};
//!
//! let rows = [[0.0_f64, 0.5, 1.0, 0.5], [1.0, 0.0, 1.0, 0.0]];
//! let locs = [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0];
//! let mut out = [0.0; 7];
//!
//! let mut spline = CubicSpline::with_len(4);
//! for row in rows.iter() {
//!     for (i, (node, &y)) in spline.nodes_mut().iter_mut().zip(row).enumerate() {
//!         *node = Point::new(i as f64, y);
//!     }
//!     spline.fit(Continuity::C1).unwrap();
//!     spline.eval_monotonic(&locs, &mut out).unwrap();
//!     (0..4).for_each(|i| assert!((out[2 * i] - row[i]).abs() < 1e-12));
//! }
//! ```
use alloc::vec;
use alloc::vec::Vec;

use num_traits::{Float, NumCast};

use super::{Continuity, CubicPolynomial, FitState, Point, TANGENT_EPSILON};
use crate::banded::BandMatrix;
use crate::error::{SolveError, SplineError};

/// Diagonals below the main one in the C2 system
const C2_LOWER_BANDS: usize = 5;

/// Diagonals from the main one upward in the C2 system
const C2_UPPER_BANDS: usize = 4;

/// Reusable storage for the C2 linear system.
#[derive(Clone, Debug)]
struct C2Workspace<T: Float> {
    matrix: BandMatrix<T>,
    coeffs: Vec<T>,
}

impl<T: Float> C2Workspace<T> {
    fn new(unknowns: usize) -> Result<Self, SolveError> {
        Ok(Self {
            matrix: BandMatrix::new(unknowns, C2_LOWER_BANDS, C2_UPPER_BANDS)?,
            coeffs: vec![T::zero(); unknowns],
        })
    }

    /// Reshape for `unknowns` and zero the system.
    fn resize(&mut self, unknowns: usize) -> Result<(), SolveError> {
        self.matrix
            .resize(unknowns, C2_LOWER_BANDS, C2_UPPER_BANDS)?;
        self.coeffs.resize(unknowns, T::zero());
        Ok(())
    }
}

/// A piecewise-cubic curve through `len()` nodes with strictly increasing x.
///
/// Segment `i` is defined on `[nodes[i].x, nodes[i + 1].x]`.
/// Nodes with repeated or decreasing x break the segment search and the
/// fits; checking this is left to the caller.
#[derive(Clone, Debug)]
pub struct CubicSpline<T: Float> {
    nodes: Vec<Point<T>>,

    /// One polynomial per interval, size nodes.len() - 1
    segments: Vec<CubicPolynomial<T>>,

    /// C1 tangent directions, size nodes.len()
    tangents: Vec<Point<T>>,

    /// Created by the first C2 fit, dropped when the node count grows
    workspace: Option<C2Workspace<T>>,

    state: FitState,
}

impl<T: Float> Default for CubicSpline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> CubicSpline<T> {
    /// An empty spline.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            segments: Vec::new(),
            tangents: Vec::new(),
            workspace: None,
            state: FitState::Unfitted,
        }
    }

    /// A spline with `n` nodes at the origin, to be assigned by the caller.
    pub fn with_len(n: usize) -> Self {
        let mut spline = Self::new();
        spline.resize(n);
        spline
    }

    /// A spline through `points`, sorted by x (ties by y).
    pub fn from_points(points: &[Point<T>]) -> Self {
        let mut spline = Self::new();
        spline.set_points(points);
        spline
    }

    /// Change the node count.
    ///
    /// Growing keeps the existing nodes in the low indices and fills the
    /// new slots with zeros, and releases the C2 workspace so that the next
    /// C2 fit allocates it at the new size. Shrinking truncates and reshapes
    /// an existing workspace in place.
    pub fn resize(&mut self, n: usize) {
        let old = self.nodes.len();
        if n == old {
            return;
        }

        self.nodes.resize(n, Point::zero());
        self.segments
            .resize(n.saturating_sub(1), CubicPolynomial::zero());
        self.tangents.resize(n, Point::zero());

        if n > old {
            self.workspace = None;
        } else if let Some(ws) = self.workspace.as_mut() {
            if ws.resize(c2_unknowns(n)).is_err() {
                self.workspace = None;
            }
        }
        self.state = FitState::Unfitted;
    }

    /// Replace all nodes with `points`, sorted by x (ties by y).
    pub fn set_points(&mut self, points: &[Point<T>]) {
        self.resize(points.len());
        self.nodes.copy_from_slice(points);
        self.nodes.sort_by(|a, b| a.cmp_xy(b));
        self.state = FitState::Unfitted;
    }

    /// Assign one node.
    ///
    /// # Errors
    /// * If `i` is not a valid node index
    pub fn set_node(&mut self, i: usize, node: Point<T>) -> Result<(), SplineError> {
        let slot = self.nodes.get_mut(i).ok_or(SplineError::NodeOutOfRange)?;
        *slot = node;
        self.state = FitState::Unfitted;
        Ok(())
    }

    pub fn nodes(&self) -> &[Point<T>] {
        &self.nodes
    }

    /// Mutable access to the nodes. Invalidates the current fit.
    pub fn nodes_mut(&mut self) -> &mut [Point<T>] {
        self.state = FitState::Unfitted;
        &mut self.nodes
    }

    /// Fitted polynomials, one per interval between consecutive nodes.
    pub fn segments(&self) -> &[CubicPolynomial<T>] {
        &self.segments
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn fit_state(&self) -> FitState {
        self.state
    }

    /// Whether the segments reflect a successful fit in `mode` of the current nodes.
    pub fn is_fitted(&self, mode: Continuity) -> bool {
        self.state == FitState::Fitted(mode)
    }

    /// Fit in the given mode. See [`CubicSpline::fit_c1`] and [`CubicSpline::fit_c2`].
    pub fn fit(&mut self, mode: Continuity) -> Result<(), SplineError> {
        match mode {
            Continuity::C1 => self.fit_c1(),
            Continuity::C2 => self.fit_c2(),
        }
    }

    /// Fit with continuous value and first derivative.
    ///
    /// Each interior node takes the sum of the unit vectors along its
    /// incoming and outgoing chords as its tangent. This is not renormalized.
    /// Each end node takes the direction from the end node to a point
    /// extrapolated from the neighboring tangent, half a node spacing inward,
    /// which keeps the ends from flattening out. With two nodes both
    /// tangents are the chord and the result is the straight line.
    ///
    /// Fewer than two nodes need no segments; the fit is a no-op.
    pub fn fit_c1(&mut self) -> Result<(), SplineError> {
        let n = self.nodes.len();
        if n < 2 {
            self.state = FitState::Fitted(Continuity::C1);
            return Ok(());
        }

        let eps = T::from(TANGENT_EPSILON).ok_or(SplineError::Unrepresentable)?;
        let half = T::one() / (T::one() + T::one());
        let nodes = &self.nodes;
        let tangents = &mut self.tangents;

        for i in 1..n - 1 {
            let incoming = (nodes[i] - nodes[i - 1]).normalized(eps);
            let outgoing = (nodes[i + 1] - nodes[i]).normalized(eps);
            tangents[i] = incoming + outgoing;
        }

        if n == 2 {
            let chord = nodes[1] - nodes[0];
            tangents[0] = chord;
            tangents[1] = chord;
        } else {
            let dx = (nodes[1].x - nodes[0].x) * half;
            let inner = Point::new(
                nodes[1].x - dx,
                nodes[1].y - dx * tangents[1].slope(),
            );
            tangents[0] = inner - nodes[0];

            let dx = (nodes[n - 1].x - nodes[n - 2].x) * half;
            let inner = Point::new(
                nodes[n - 2].x + dx,
                nodes[n - 2].y + dx * tangents[n - 2].slope(),
            );
            tangents[n - 1] = nodes[n - 1] - inner;
        }

        for i in 0..n - 1 {
            self.segments[i] = CubicPolynomial::interpolate(
                nodes[i].x,
                nodes[i + 1].x,
                nodes[i].y,
                tangents[i].slope(),
                nodes[i + 1].y,
                tangents[i + 1].slope(),
            );
        }

        self.state = FitState::Fitted(Continuity::C1);
        Ok(())
    }

    /// Fit a natural spline with continuous value, first and second derivative.
    ///
    /// Solves for all `4 * (len() - 1)` coefficients at once with a banded
    /// system of lower bandwidth 5 and upper bandwidth 4.
    ///
    /// Coefficients are in powers of the absolute x, so the system loses
    /// conditioning as the node x values grow. In `f64`, nodes at the pixel
    /// positions of a 1024-wide scanline are still reproduced to about 1e-6.
    ///
    /// Fewer than two nodes need no segments; the fit is a no-op.
    ///
    /// # Errors
    /// * If the system is singular, which only happens for repeated or
    ///   unordered node x values. The spline is then left in
    ///   [`FitState::Failed`].
    pub fn fit_c2(&mut self) -> Result<(), SplineError> {
        let n = self.nodes.len();
        if n < 2 {
            self.state = FitState::Fitted(Continuity::C2);
            return Ok(());
        }

        let unknowns = c2_unknowns(n);
        let mut ws = self.take_workspace(unknowns)?;
        log::trace!("C2 fit: {n} nodes, {unknowns} unknowns");

        assemble_c2(&mut ws.matrix, &self.nodes);
        let solved = ws.matrix.solve(&mut ws.coeffs);
        if let Err(err) = solved {
            log::warn!("C2 fit of {n} nodes failed: {err}");
            self.workspace = Some(ws);
            self.state = FitState::Failed;
            return Err(err.into());
        }

        for (segment, c) in self.segments.iter_mut().zip(ws.coeffs.chunks_exact(4)) {
            *segment = CubicPolynomial::from_coeffs([c[0], c[1], c[2], c[3]]);
        }

        self.workspace = Some(ws);
        self.state = FitState::Fitted(Continuity::C2);
        Ok(())
    }

    /// Take the C2 workspace out of the spline, sized and zeroed for
    /// `unknowns`, allocating it if this is the first C2 fit at this size.
    fn take_workspace(&mut self, unknowns: usize) -> Result<C2Workspace<T>, SolveError> {
        match self.workspace.take() {
            Some(mut ws) => {
                ws.resize(unknowns)?;
                Ok(ws)
            }
            None => C2Workspace::new(unknowns),
        }
    }

    /// Index of the segment used to evaluate at `x`.
    ///
    /// Points left of the first node map to the first segment, points at or
    /// right of the last node to the last segment, and anything else to the
    /// `i` with `nodes[i].x <= x < nodes[i + 1].x`.
    #[inline]
    pub fn find_segment(&self, x: T) -> usize {
        let n = self.nodes.len();
        if n < 2 {
            return 0;
        }
        // Bisection search for the number of nodes at or left of `x`
        let i = self.nodes.partition_point(|p| p.x <= x);
        i.saturating_sub(1).min(n - 2)
    }

    /// Value at `x`.
    ///
    /// A single-node spline is constant, and an empty one is zero.
    #[inline]
    pub fn value(&self, x: T) -> T {
        match self.nodes.len() {
            0 => T::zero(),
            1 => self.nodes[0].y,
            _ => self.segments[self.find_segment(x)].value(x),
        }
    }

    /// Value at `x` using a segment already known to contain it,
    /// skipping the search.
    ///
    /// # Panics
    /// * If the spline has two or more nodes and `segment >= len() - 1`
    #[inline]
    pub fn value_in_segment(&self, x: T, segment: usize) -> T {
        match self.nodes.len() {
            0 => T::zero(),
            1 => self.nodes[0].y,
            _ => self.segments[segment].value(x),
        }
    }

    /// First derivative at `x`. Zero for fewer than two nodes.
    pub fn derivative(&self, x: T) -> T {
        if self.nodes.len() < 2 {
            return T::zero();
        }
        self.segments[self.find_segment(x)].derivative_value(x)
    }

    /// Second derivative at `x`. Zero for fewer than two nodes.
    pub fn derivative2(&self, x: T) -> T {
        if self.nodes.len() < 2 {
            return T::zero();
        }
        self.segments[self.find_segment(x)].derivative2_value(x)
    }

    /// Evaluate at arbitrary locations.
    ///
    /// # Errors
    /// * If `locs` and `out` differ in length
    pub fn eval(&self, locs: &[T], out: &mut [T]) -> Result<(), SplineError> {
        if locs.len() != out.len() {
            return Err(SplineError::DimensionMismatch);
        }
        for (o, &x) in out.iter_mut().zip(locs) {
            *o = self.value(x);
        }
        Ok(())
    }

    /// Evaluate at non-decreasing locations, advancing the segment
    /// incrementally instead of searching for each point.
    ///
    /// Locations that decrease are evaluated in the segment reached so far.
    ///
    /// # Errors
    /// * If `locs` and `out` differ in length
    pub fn eval_monotonic(&self, locs: &[T], out: &mut [T]) -> Result<(), SplineError> {
        if locs.len() != out.len() {
            return Err(SplineError::DimensionMismatch);
        }
        let last = self.nodes.len().saturating_sub(2);
        let mut segment = 0;
        for (o, &x) in out.iter_mut().zip(locs) {
            while segment < last && x >= self.nodes[segment + 1].x {
                segment += 1;
            }
            *o = self.value_in_segment(x, segment);
        }
        Ok(())
    }

    /// Evaluate at arbitrary locations, allocating for the output.
    pub fn eval_alloc(&self, locs: &[T]) -> Result<Vec<T>, SplineError> {
        let mut out = vec![T::zero(); locs.len()];
        self.eval(locs, &mut out)?;
        Ok(out)
    }

    /// Trace the curve from the first to the last node at a fixed x step.
    ///
    /// The last node is always included as the final point.
    ///
    /// # Errors
    /// * If `step` is not finite and positive
    pub fn sample(&self, step: T) -> Result<Vec<Point<T>>, SplineError> {
        if !(step.is_finite() && step > T::zero()) {
            return Err(SplineError::InvalidStep);
        }
        let (first, last) = match (self.nodes.first(), self.nodes.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Ok(Vec::new()),
        };

        let span = last.x - first.x;
        let count = <usize as NumCast>::from((span / step).floor())
            .ok_or(SplineError::Unrepresentable)?;
        let mut locs = Vec::with_capacity(count + 2);
        for k in 0..=count {
            let k = <T as NumCast>::from(k).ok_or(SplineError::Unrepresentable)?;
            let x = first.x + k * step;
            if x < last.x {
                locs.push(x);
            }
        }
        locs.push(last.x);

        let mut ys = vec![T::zero(); locs.len()];
        self.eval_monotonic(&locs, &mut ys)?;
        Ok(locs
            .into_iter()
            .zip(ys)
            .map(|(x, y)| Point::new(x, y))
            .collect())
    }
}

/// Number of C2 unknowns for `n` nodes, 4 coefficients per segment.
#[inline]
fn c2_unknowns(n: usize) -> usize {
    4 * n.saturating_sub(1)
}

/// Fill the C2 system for `nodes` (at least two) into a zeroed matrix.
///
/// Unknowns are the coefficients of each segment in order,
/// `[c0, c1, c2, c3]` of segment 0, then segment 1, and so on. Rows are:
/// * first node: value of segment 0, zero second derivative of segment 0
/// * each interior node: value of the left segment, value of the right
///   segment, equal first derivatives, equal second derivatives
/// * last node: value of the last segment, zero second derivative
fn assemble_c2<T: Float>(m: &mut BandMatrix<T>, nodes: &[Point<T>]) {
    let n = nodes.len();
    let one = T::one();
    let two = one + one;
    let three = two + one;
    let six = three + three;

    let mut row = 0;

    // First node
    let Point { x, y } = nodes[0];
    value_row(m, row, 0, x, y);
    row += 1;
    m[(row, 2)] = two;
    m[(row, 3)] = six * x;
    row += 1;

    // Interior nodes
    for k in 1..n - 1 {
        let Point { x, y } = nodes[k];
        let x2 = x * x;
        let left = 4 * (k - 1);
        let right = 4 * k;

        value_row(m, row, left, x, y);
        row += 1;
        value_row(m, row, right, x, y);
        row += 1;

        // f' = c1 + 2*c2*x + 3*c3*x^2
        m[(row, left + 1)] = one;
        m[(row, left + 2)] = two * x;
        m[(row, left + 3)] = three * x2;
        m[(row, right + 1)] = -one;
        m[(row, right + 2)] = -(two * x);
        m[(row, right + 3)] = -(three * x2);
        row += 1;

        // f'' = 2*c2 + 6*c3*x
        m[(row, left + 2)] = two;
        m[(row, left + 3)] = six * x;
        m[(row, right + 2)] = -two;
        m[(row, right + 3)] = -(six * x);
        row += 1;
    }

    // Last node
    let Point { x, y } = nodes[n - 1];
    let last = 4 * (n - 2);
    value_row(m, row, last, x, y);
    row += 1;
    m[(row, last + 2)] = two;
    m[(row, last + 3)] = six * x;
}

/// Row requiring the segment whose coefficients start at `col` to pass through `(x, y)`.
#[inline]
fn value_row<T: Float>(m: &mut BandMatrix<T>, row: usize, col: usize, x: T, y: T) {
    let x2 = x * x;
    m[(row, col)] = T::one();
    m[(row, col + 1)] = x;
    m[(row, col + 2)] = x2;
    m[(row, col + 3)] = x2 * x;
    m.rhs_mut()[row] = y;
}
