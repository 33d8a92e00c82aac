//! Error types for frame operations.

use thiserror::Error;

/// Result type for frame operations.
pub type Result<T> = std::result::Result<T, FrameError>;

/// Errors that can occur while converting coordinates or transforming frames.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    /// The 2x2 linear block of a matrix has a zero (or non-finite) determinant.
    #[error("matrix is singular (determinant {determinant})")]
    SingularMatrix { determinant: f64 },

    /// A node addressed as a frame carries no matrix, or does not exist.
    #[error("node at path {path:?} is not a frame")]
    InvalidFrame { path: Vec<usize> },

    /// Coordinate arrays of the wrong dimensionality.
    #[error("coordinate {index} has {found} components, expected {expected}")]
    ShapeMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    /// A frame matrix whose bottom row is not `[0, 0, 1]`.
    #[error("matrix is not affine (bottom row {bottom_row:?})")]
    NotAffine { bottom_row: [f64; 3] },

    /// Basis ratio must be positive and finite.
    #[error("invalid basis ratio {0}")]
    InvalidRatio(f64),
}
