//! Nested 2D coordinate frames.
//!
//! A frame tree is a hierarchy of affine coordinate systems, each frame
//! carrying a 3x3 homogeneous matrix relative to its parent. This crate
//! converts points and vectors between frames, installs new matrices on a
//! frame while carrying its descendants along, and builds the usual
//! translate / rotate / scale / normalize transforms on top of that.
//!
//! ```
//! use frames_core::{Frame, Matrix2D, point_transform};
//!
//! let root = Frame::default();
//! let papa = Frame::new(Matrix2D::affine(-1.0, 0.0, 1.0, 0.0, -2.0, 0.0));
//! let p = point_transform([0.0, 0.0], &root, &papa).unwrap();
//! assert!((p[0] - 1.0).abs() < 1e-12 && p[1].abs() < 1e-12);
//! ```

pub mod coordinates;
pub mod error;
pub mod frame;
pub mod matrix;
pub mod propagate;
pub mod transforms;

pub use coordinates::{
    FrameConversion, frame_to_frame_matrix, point_transform, points_transform, vector_transform,
    vectors_transform,
};
pub use error::{FrameError, Result};
pub use frame::{Descendants, FRAME_KIND, Frame, Node, identity_frame};
pub use matrix::{Matrix2D, MatrixStack, Vec2, dot, multiply_stack, norm};
pub use transforms::{normalized_matrix, ratio_scale, relative_matrix};
