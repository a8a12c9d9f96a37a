//! Error types for the banded solver, spline fitting, and resampling.
use thiserror::Error;

/// Failure of a banded linear solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolveError {
    /// No pivot with magnitude above the fixed threshold was found.
    ///
    /// A well-formed spline system never lands here, so this indicates
    /// degenerate input (duplicate or unordered nodes).
    #[error("Singular system: no usable pivot in column {column}")]
    Singular { column: usize },

    #[error("Dimension mismatch")]
    DimensionMismatch,

    #[error("Unrepresentable number")]
    Unrepresentable,
}

/// Failure while fitting or evaluating a spline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SplineError {
    /// The C2 system could not be solved.
    #[error("C2 fit failed: {0}")]
    Solve(#[from] SolveError),

    #[error("Node index out of range")]
    NodeOutOfRange,

    #[error("Sampling step must be finite and positive")]
    InvalidStep,

    #[error("Dimension mismatch")]
    DimensionMismatch,

    #[error("Unrepresentable number")]
    Unrepresentable,
}

/// Failure of a separable resample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResampleError {
    #[error("Zoom factor must be finite and positive")]
    InvalidZoom,

    #[error("Source image has zero width or height")]
    EmptySource,

    /// The zoom factor rounds the destination down to zero pixels.
    #[error("Zoom factor produces an empty image")]
    EmptyOutput,

    #[error("Dimension mismatch")]
    DimensionMismatch,

    #[error("Unrepresentable number")]
    Unrepresentable,

    #[error(transparent)]
    Spline(#[from] SplineError),
}
