//! Coordinate conversion between frames.
//!
//! Points are lifted to homogeneous form with a trailing `1` and move with
//! the full affine map; free vectors are lifted with a trailing `0` and only
//! see the linear part.
//!
//! Both frames' matrices must be expressed in the same ambient space (for
//! example two siblings, or frames whose matrices were all composed against
//! one root). This is not checked.

use tracing::warn;

use crate::error::{FrameError, Result};
use crate::frame::Frame;
use crate::matrix::{Matrix2D, Vec2};

/// Homogeneous weight of a lifted coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lift {
    Point,
    Vector,
}

impl Lift {
    fn weight(self) -> f64 {
        match self {
            Lift::Point => 1.0,
            Lift::Vector => 0.0,
        }
    }

    fn lift(self, coords: Vec2) -> [f64; 3] {
        [coords[0], coords[1], self.weight()]
    }
}

fn project(homogeneous: [f64; 3]) -> Vec2 {
    [homogeneous[0], homogeneous[1]]
}

/// Matrix taking coordinates in `from`'s basis to coordinates in `to`'s basis:
/// `inverse(to.world_matrix) · from.world_matrix`.
pub fn frame_to_frame_matrix(from: &Frame, to: &Frame) -> Result<Matrix2D> {
    let to_inverse = to.world_matrix.inverse().inspect_err(|err| {
        warn!(error = %err, "cannot convert into a frame with a singular matrix");
    })?;
    Ok(to_inverse * from.world_matrix)
}

/// A precomputed conversion from one frame's coordinates to another's.
///
/// Useful when the same pair of frames is queried many times, e.g. once per
/// rendered tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameConversion {
    matrix: Matrix2D,
}

impl FrameConversion {
    pub fn between(from: &Frame, to: &Frame) -> Result<Self> {
        Ok(Self {
            matrix: frame_to_frame_matrix(from, to)?,
        })
    }

    pub fn matrix(&self) -> &Matrix2D {
        &self.matrix
    }

    pub fn point(&self, coords: Vec2) -> Vec2 {
        self.map(coords, Lift::Point)
    }

    pub fn vector(&self, coords: Vec2) -> Vec2 {
        self.map(coords, Lift::Vector)
    }

    /// The reverse conversion.
    pub fn inverse(&self) -> Result<Self> {
        Ok(Self {
            matrix: self.matrix.inverse()?,
        })
    }

    fn map(&self, coords: Vec2, lift: Lift) -> Vec2 {
        project(self.matrix.apply(lift.lift(coords)))
    }

    fn map_all(&self, coords: Vec<Vec2>, lift: Lift) -> Vec<Vec2> {
        coords.into_iter().map(|p| self.map(p, lift)).collect()
    }
}

/// Validate that every coordinate has exactly two components.
fn to_pairs<C: AsRef<[f64]>>(coords: &[C]) -> Result<Vec<Vec2>> {
    coords
        .iter()
        .enumerate()
        .map(|(index, c)| match c.as_ref() {
            &[x, y] => Ok([x, y]),
            other => Err(FrameError::ShapeMismatch {
                index,
                expected: 2,
                found: other.len(),
            }),
        })
        .collect()
}

/// Convert a point from `from`'s coordinates to `to`'s coordinates.
pub fn point_transform(coords: Vec2, from: &Frame, to: &Frame) -> Result<Vec2> {
    Ok(FrameConversion::between(from, to)?.point(coords))
}

/// Convert many points with a single matrix inversion.
pub fn points_transform<C: AsRef<[f64]>>(
    coords: &[C],
    from: &Frame,
    to: &Frame,
) -> Result<Vec<Vec2>> {
    // Shape errors are reported before the inversion is attempted.
    let coords = to_pairs(coords)?;
    Ok(FrameConversion::between(from, to)?.map_all(coords, Lift::Point))
}

/// Convert a free vector from `from`'s coordinates to `to`'s coordinates.
pub fn vector_transform(coords: Vec2, from: &Frame, to: &Frame) -> Result<Vec2> {
    Ok(FrameConversion::between(from, to)?.vector(coords))
}

/// Convert many free vectors with a single matrix inversion.
pub fn vectors_transform<C: AsRef<[f64]>>(
    coords: &[C],
    from: &Frame,
    to: &Frame,
) -> Result<Vec<Vec2>> {
    let coords = to_pairs(coords)?;
    Ok(FrameConversion::between(from, to)?.map_all(coords, Lift::Vector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::identity_frame;

    const EPSILON: f64 = 1e-10;

    fn approx_eq(a: Vec2, b: Vec2) -> bool {
        (a[0] - b[0]).abs() < EPSILON && (a[1] - b[1]).abs() < EPSILON
    }

    fn papa() -> Frame {
        Frame::new(Matrix2D::affine(-1.0, 0.0, 1.0, 0.0, -2.0, 0.0))
    }

    #[test]
    fn test_lift_and_project() {
        assert_eq!(Lift::Point.lift([0.4, -1.0]), [0.4, -1.0, 1.0]);
        assert_eq!(Lift::Vector.lift([0.4, -1.0]), [0.4, -1.0, 0.0]);
        assert_eq!(project([0.5, 0.2, 1.0]), [0.5, 0.2]);
    }

    #[test]
    fn test_frame_to_frame_matrix() {
        let m = frame_to_frame_matrix(&identity_frame(), &papa()).unwrap();
        assert!(m.approx_eq(&Matrix2D::affine(-1.0, 0.0, 1.0, 0.0, -0.5, 0.0), EPSILON));
    }

    #[test]
    fn test_point_transform() {
        let root = identity_frame();
        let papa = papa();
        assert!(approx_eq(point_transform([0.0, 0.0], &root, &papa).unwrap(), [1.0, 0.0]));
        assert!(approx_eq(point_transform([-1.0, -2.0], &root, &papa).unwrap(), [2.0, 1.0]));
    }

    #[test]
    fn test_vector_ignores_translation() {
        let root = identity_frame();
        let papa = papa();
        assert!(approx_eq(vector_transform([-1.0, -1.0], &papa, &root).unwrap(), [1.0, 2.0]));
        assert!(approx_eq(vector_transform([1.0, 2.0], &root, &papa).unwrap(), [-1.0, -1.0]));
    }

    #[test]
    fn test_batched_matches_single() {
        let root = identity_frame();
        let papa = papa();
        let points = points_transform(&[[0.0, 0.0], [-1.0, -2.0]], &root, &papa).unwrap();
        assert!(approx_eq(points[0], [1.0, 0.0]));
        assert!(approx_eq(points[1], [2.0, 1.0]));

        let vectors = vectors_transform(&[vec![-1.0, -1.0], vec![3.0, 1.0]], &papa, &root).unwrap();
        assert!(approx_eq(vectors[0], [1.0, 2.0]));
        assert!(approx_eq(vectors[1], [-3.0, -2.0]));
    }

    #[test]
    fn test_batched_empty() {
        let root = identity_frame();
        let empty: [Vec2; 0] = [];
        assert!(points_transform(&empty, &root, &root).unwrap().is_empty());
    }

    #[test]
    fn test_shape_mismatch() {
        let root = identity_frame();
        let coords = vec![vec![1.0, 2.0], vec![1.0, 2.0, 3.0]];
        assert_eq!(
            points_transform(&coords, &root, &root),
            Err(FrameError::ShapeMismatch {
                index: 1,
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn test_shape_checked_before_inversion() {
        let singular = Frame::new(Matrix2D::scaling(0.0, 0.0));
        let coords = vec![vec![1.0]];
        assert!(matches!(
            vectors_transform(&coords, &identity_frame(), &singular),
            Err(FrameError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_singular_target() {
        let singular = Frame::new(Matrix2D::scaling(0.0, 1.0));
        assert!(matches!(
            point_transform([1.0, 1.0], &identity_frame(), &singular),
            Err(FrameError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn test_conversion_inverse() {
        let conversion = FrameConversion::between(&identity_frame(), &papa()).unwrap();
        let back = conversion.inverse().unwrap();
        let p = [3.5, -7.25];
        assert!(approx_eq(back.point(conversion.point(p)), p));
    }
}
