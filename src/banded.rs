//! Banded linear systems solved by Gaussian elimination with partial pivoting.
//!
//! Only the nonzero band of the matrix is stored. Row `i` initially holds
//! `d0` entries left of the diagonal (columns `i - d0 .. i - 1`) and `d1`
//! entries starting at the diagonal (columns `i .. i + d1 - 1`). Pivoting
//! only ever draws from the `d0` rows below the current one, so a row swap
//! can push nonzeros at most `d0` columns further right; storage reserves
//! those extra diagonals, for a total of `2 * d0 + d1` values per row.
//!
//! ```rust
//! use bandspline::BandMatrix;
//!
//! // Tridiagonal system
//! let mut m = BandMatrix::<f64>::new(3, 1, 2).unwrap();
//! for i in 0..3 {
//!     m[(i, i)] = 4.0;
//!     if i > 0 {
//!         m[(i, i - 1)] = 1.0;
//!     }
//!     if i < 2 {
//!         m[(i, i + 1)] = 1.0;
//!     }
//! }
//! m.rhs_mut().copy_from_slice(&[5.0, 6.0, 5.0]);
//!
//! let x = m.solve_alloc().unwrap();
//! (0..3).for_each(|i| assert!((x[i] - 1.0).abs() < 1e-12));
//! ```
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{Index, IndexMut};

use num_traits::Float;

use crate::error::SolveError;

/// Absolute threshold for pivot selection and singularity detection.
pub const PIVOT_EPSILON: f64 = 1e-8;

/// A square banded matrix with an attached right-hand side column.
#[derive(Clone, Debug)]
pub struct BandMatrix<T: Float> {
    /// Number of rows and columns
    n: usize,

    /// Diagonals strictly below the main diagonal
    d0: usize,

    /// Diagonals at and above the main diagonal, including the main
    d1: usize,

    /// Stored values per row, 2 * d0 + d1
    width: usize,

    /// Row-major band storage, size n * width
    elements: Vec<T>,

    /// Right-hand side, size n
    rhs: Vec<T>,
}

impl<T: Float> BandMatrix<T> {
    /// Allocate a zeroed `n` x `n` system.
    ///
    /// # Errors
    /// * If `d1` is zero; the main diagonal is always part of the band
    pub fn new(n: usize, d0: usize, d1: usize) -> Result<Self, SolveError> {
        if d1 == 0 {
            return Err(SolveError::DimensionMismatch);
        }
        let width = 2 * d0 + d1;
        Ok(Self {
            n,
            d0,
            d1,
            width,
            elements: vec![T::zero(); n * width],
            rhs: vec![T::zero(); n],
        })
    }

    /// Change the shape of the system and zero every entry.
    ///
    /// Existing storage is reused when it is large enough.
    ///
    /// # Errors
    /// * If `d1` is zero
    pub fn resize(&mut self, n: usize, d0: usize, d1: usize) -> Result<(), SolveError> {
        if d1 == 0 {
            return Err(SolveError::DimensionMismatch);
        }
        self.n = n;
        self.d0 = d0;
        self.d1 = d1;
        self.width = 2 * d0 + d1;
        self.reset();
        Ok(())
    }

    /// Zero the matrix and the right-hand side without changing the shape.
    pub fn reset(&mut self) {
        self.elements.clear();
        self.elements.resize(self.n * self.width, T::zero());
        self.rhs.clear();
        self.rhs.resize(self.n, T::zero());
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.n
    }

    /// Number of diagonals below the main one.
    pub fn lower_bandwidth(&self) -> usize {
        self.d0
    }

    /// Number of diagonals from the main one upward, main included.
    pub fn upper_bandwidth(&self) -> usize {
        self.d1
    }

    /// Whether `(i, j)` is addressable, including the fill-in diagonals.
    #[inline]
    pub fn in_band(&self, i: usize, j: usize) -> bool {
        i < self.n && j < self.n && j + self.d0 >= i && j < i + self.d0 + self.d1
    }

    /// Right-hand side column.
    pub fn rhs(&self) -> &[T] {
        &self.rhs
    }

    /// Mutable right-hand side column.
    pub fn rhs_mut(&mut self) -> &mut [T] {
        &mut self.rhs
    }

    /// Last column that row `i` can hold a nonzero in.
    #[inline]
    fn right_extent(&self, i: usize) -> usize {
        (i + self.d0 + self.d1 - 1).min(self.n - 1)
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        assert!(
            self.in_band(i, j),
            "Index ({i}, {j}) is outside the band of the matrix"
        );
        i * self.width + (j + self.d0 - i)
    }

    /// Solve the system in place, writing the unknowns to `out`.
    ///
    /// Elimination destroys the matrix and right-hand side; call
    /// [`BandMatrix::reset`] before filling it again.
    ///
    /// # Errors
    /// * If `out` does not have one entry per row
    /// * If no pivot above [`PIVOT_EPSILON`] exists for some column
    pub fn solve(&mut self, out: &mut [T]) -> Result<(), SolveError> {
        let n = self.n;
        if out.len() != n {
            return Err(SolveError::DimensionMismatch);
        }
        if n == 0 {
            return Ok(());
        }

        self.eliminate()?;

        // Back-substitution on the upper-triangular band
        for i in (0..n).rev() {
            let jm = self.right_extent(i);
            let mut s = self.rhs[i];
            for j in i + 1..=jm {
                s = s - out[j] * self[(i, j)];
            }
            out[i] = s / self[(i, i)];
        }

        Ok(())
    }

    /// Solve the system, allocating for the unknowns.
    pub fn solve_alloc(&mut self) -> Result<Vec<T>, SolveError> {
        let mut out = vec![T::zero(); self.n];
        self.solve(&mut out)?;
        Ok(out)
    }

    /// Forward elimination to upper-triangular form.
    fn eliminate(&mut self) -> Result<(), SolveError> {
        let n = self.n;
        let eps = T::from(PIVOT_EPSILON).ok_or(SolveError::Unrepresentable)?;

        for i in 0..n {
            // Only rows within d0 below can have a nonzero in column i
            let im = (i + self.d0).min(n - 1);
            let mut maxelem = self[(i, i)].abs();
            let mut maxidx = i;
            for k in i + 1..=im {
                let v = self[(k, i)].abs();
                if v > maxelem {
                    maxelem = v;
                    maxidx = k;
                }
            }
            if maxelem <= eps {
                return Err(SolveError::Singular { column: i });
            }

            let jm = self.right_extent(i);
            if maxidx != i {
                // The row moved down is negated along with its right-hand side
                for j in i..=jm {
                    let tmp = self[(i, j)];
                    self[(i, j)] = self[(maxidx, j)];
                    self[(maxidx, j)] = -tmp;
                }
                let tmp = self.rhs[i];
                self.rhs[i] = self.rhs[maxidx];
                self.rhs[maxidx] = -tmp;
            }

            let z = self[(i, i)];
            for k in i + 1..=im {
                let c = -self[(k, i)] / z;
                self[(k, i)] = T::zero();
                for j in i + 1..=jm {
                    let v = self[(i, j)];
                    self[(k, j)] = self[(k, j)] + v * c;
                }
                self.rhs[k] = self.rhs[k] + self.rhs[i] * c;
            }
        }

        if self[(n - 1, n - 1)].abs() > eps {
            Ok(())
        } else {
            Err(SolveError::Singular { column: n - 1 })
        }
    }

    /// Matrix-vector product `q = A p`, touching only each row's band.
    ///
    /// # Errors
    /// * If `p` or `q` does not have one entry per row
    pub fn multiply(&self, p: &[T], q: &mut [T]) -> Result<(), SolveError> {
        if p.len() != self.n || q.len() != self.n {
            return Err(SolveError::DimensionMismatch);
        }
        for i in 0..self.n {
            let jl = i.saturating_sub(self.d0);
            let jr = self.right_extent(i);
            let mut acc = T::zero();
            for j in jl..=jr {
                acc = acc + self[(i, j)] * p[j];
            }
            q[i] = acc;
        }
        Ok(())
    }
}

impl<T: Float> Index<(usize, usize)> for BandMatrix<T> {
    type Output = T;

    /// # Panics
    /// * If `(i, j)` lies outside the stored band
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.elements[self.offset(i, j)]
    }
}

impl<T: Float> IndexMut<(usize, usize)> for BandMatrix<T> {
    /// # Panics
    /// * If `(i, j)` lies outside the stored band
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        let k = self.offset(i, j);
        &mut self.elements[k]
    }
}

/// Dense dump of the matrix with the right-hand side after a bar.
impl<T: Float + fmt::Display> fmt::Display for BandMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.n {
            for j in 0..self.n {
                let v = if self.in_band(i, j) {
                    self[(i, j)]
                } else {
                    T::zero()
                };
                write!(f, "{v:9.3} ")?;
            }
            writeln!(f, " | {:9.3}", self.rhs[i])?;
        }
        Ok(())
    }
}
