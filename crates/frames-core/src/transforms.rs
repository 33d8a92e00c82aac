//! Affine transform builders for frames.
//!
//! Each builder comes as a pair: a copy-on-write form (`translated`,
//! `rotated`, ...) returning a new tree, and an in-place form (`translate`,
//! `rotate`, ...) mutating the receiver. Both route through frame
//! propagation, so descendants follow their frame.
//!
//! A transform `M` is composed with the frame's matrix `F` as
//! `multiply_stack([M, F]) = F · M`, i.e. it is expressed in the frame's own
//! basis. With a reference frame `R` it becomes
//! `multiply_stack([F, R⁻¹, M, R]) = R · M · R⁻¹ · F`: `M` is read in `R`'s
//! basis instead.

use tracing::debug;

use crate::error::{FrameError, Result};
use crate::frame::Frame;
use crate::matrix::{Matrix2D, MatrixStack, Vec2, norm};

/// New world matrix for `frame` after applying `matrix`, optionally read in
/// the basis of `rel`.
pub fn relative_matrix(
    frame: &Frame,
    matrix: &Matrix2D,
    rel: Option<&Frame>,
) -> Result<Matrix2D> {
    let stack: MatrixStack = match rel {
        Some(rel) => [
            frame.world_matrix,
            rel.world_matrix.inverse()?,
            *matrix,
            rel.world_matrix,
        ]
        .into_iter()
        .collect(),
        None => [*matrix, frame.world_matrix].into_iter().collect(),
    };
    Ok(stack.to_matrix())
}

fn column_norms(matrix: &Matrix2D) -> Result<[f64; 2]> {
    let [first, second] = matrix.basis().map(norm);
    if first == 0.0 || second == 0.0 {
        return Err(FrameError::SingularMatrix {
            determinant: matrix.determinant(),
        });
    }
    Ok([first, second])
}

/// The frame's matrix with each basis vector rescaled to unit length.
/// Directions and translation are kept.
pub fn normalized_matrix(frame: &Frame) -> Result<Matrix2D> {
    let matrix = &frame.world_matrix;
    let norms = column_norms(matrix)?;
    let [first, second] = matrix.basis();
    Ok(matrix.with_basis([
        [first[0] / norms[0], first[1] / norms[0]],
        [second[0] / norms[1], second[1] / norms[1]],
    ]))
}

/// Factor `γ` such that scaling the basis by `(γ, 1/γ)` gives
/// `‖v1‖ / ‖v2‖ = ratio` without changing the determinant.
pub fn ratio_scale(frame: &Frame, ratio: f64) -> Result<f64> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(FrameError::InvalidRatio(ratio));
    }
    let [first, second] = column_norms(&frame.world_matrix)?;
    Ok((ratio * second / first).sqrt())
}

impl Frame {
    /// Copy of this tree transformed by `matrix` (see the module docs for
    /// how `rel` changes the composition).
    pub fn transformed_by_matrix(&self, matrix: &Matrix2D, rel: Option<&Frame>) -> Result<Frame> {
        let target = relative_matrix(self, matrix, rel)?;
        self.with_world_matrix(target)
    }

    /// In-place form of [`Frame::transformed_by_matrix`].
    pub fn transform_with_matrix(
        &mut self,
        matrix: &Matrix2D,
        rel: Option<&Frame>,
    ) -> Result<&mut Self> {
        let target = relative_matrix(self, matrix, rel)?;
        self.give_world_matrix(target)
    }

    pub fn translated(&self, offset: Vec2, rel: Option<&Frame>) -> Result<Frame> {
        debug!(
            dx = offset[0],
            dy = offset[1],
            relative = rel.is_some(),
            "translate frame"
        );
        self.transformed_by_matrix(&Matrix2D::translation(offset[0], offset[1]), rel)
    }

    pub fn translate(&mut self, offset: Vec2, rel: Option<&Frame>) -> Result<&mut Self> {
        debug!(
            dx = offset[0],
            dy = offset[1],
            relative = rel.is_some(),
            "translate frame in place"
        );
        self.transform_with_matrix(&Matrix2D::translation(offset[0], offset[1]), rel)
    }

    /// Counter-clockwise rotation by `theta` radians.
    pub fn rotated(&self, theta: f64, rel: Option<&Frame>) -> Result<Frame> {
        debug!(theta, relative = rel.is_some(), "rotate frame");
        self.transformed_by_matrix(&Matrix2D::rotation(theta), rel)
    }

    pub fn rotate(&mut self, theta: f64, rel: Option<&Frame>) -> Result<&mut Self> {
        debug!(theta, relative = rel.is_some(), "rotate frame in place");
        self.transform_with_matrix(&Matrix2D::rotation(theta), rel)
    }

    /// Scale by `scales = [sx, sy]`.
    pub fn scaled(&self, scales: Vec2, rel: Option<&Frame>) -> Result<Frame> {
        debug!(
            sx = scales[0],
            sy = scales[1],
            relative = rel.is_some(),
            "scale frame"
        );
        self.transformed_by_matrix(&Matrix2D::scaling(scales[0], scales[1]), rel)
    }

    pub fn scale(&mut self, scales: Vec2, rel: Option<&Frame>) -> Result<&mut Self> {
        debug!(
            sx = scales[0],
            sy = scales[1],
            relative = rel.is_some(),
            "scale frame in place"
        );
        self.transform_with_matrix(&Matrix2D::scaling(scales[0], scales[1]), rel)
    }

    /// Copy of this tree with unit-length basis vectors on `self`.
    pub fn normalized(&self) -> Result<Frame> {
        self.with_world_matrix(normalized_matrix(self)?)
    }

    pub fn normalize(&mut self) -> Result<&mut Self> {
        let matrix = normalized_matrix(self)?;
        self.give_world_matrix(matrix)
    }

    /// Copy of this tree whose basis has norm ratio `ratio` and the same
    /// determinant as before.
    pub fn with_ratio(&self, ratio: f64) -> Result<Frame> {
        let gamma = ratio_scale(self, ratio)?;
        self.scaled([gamma, gamma.recip()], None)
    }

    pub fn give_ratio(&mut self, ratio: f64) -> Result<&mut Self> {
        let gamma = ratio_scale(self, ratio)?;
        self.scale([gamma, gamma.recip()], None)
    }
}
