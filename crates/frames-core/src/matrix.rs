//! 3x3 homogeneous matrices for 2D affine frames.
//!
//! Matrices are stored row-major. An affine frame matrix has the layout
//! ```text
//! | a  b  tx |
//! | c  d  ty |
//! | 0  0  1  |
//! ```
//! where the columns `(a, c)` and `(b, d)` are the frame's basis vectors and
//! `(tx, ty)` its origin, all expressed in the parent's coordinates.
//!
//! Composition order matters everywhere in this crate: `multiply_stack`
//! treats the *first* matrix of the slice as the innermost transform.

use serde::{Deserialize, Serialize};
use std::ops::Mul;

use crate::error::{FrameError, Result};

/// A 2D point or free vector.
pub type Vec2 = [f64; 2];

/// Row-major 3x3 matrix of f64 values.
///
/// Deserialization rejects rows whose bottom row is not `[0, 0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[[f64; 3]; 3]", into = "[[f64; 3]; 3]")]
pub struct Matrix2D {
    rows: [[f64; 3]; 3],
}

impl Default for Matrix2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix2D {
    /// The identity matrix.
    pub const fn identity() -> Self {
        Self {
            rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Create from three rows. The bottom row is not checked; see
    /// [`Matrix2D::is_affine`].
    pub const fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Create an affine matrix; the bottom row is `[0, 0, 1]`.
    pub const fn affine(a: f64, b: f64, tx: f64, c: f64, d: f64, ty: f64) -> Self {
        Self {
            rows: [[a, b, tx], [c, d, ty], [0.0, 0.0, 1.0]],
        }
    }

    /// Translation by `(dx, dy)`.
    pub const fn translation(dx: f64, dy: f64) -> Self {
        Self::affine(1.0, 0.0, dx, 0.0, 1.0, dy)
    }

    /// Counter-clockwise rotation by `theta` radians.
    pub fn rotation(theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self::affine(cos, -sin, 0.0, sin, cos, 0.0)
    }

    /// Axis-aligned scale.
    pub const fn scaling(sx: f64, sy: f64) -> Self {
        Self::affine(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    pub const fn rows(&self) -> &[[f64; 3]; 3] {
        &self.rows
    }

    /// Element at `(row, column)`.
    ///
    /// Panics if either index is out of range.
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.rows[row][column]
    }

    /// Whether the bottom row is exactly `[0, 0, 1]`.
    pub fn is_affine(&self) -> bool {
        self.rows[2] == [0.0, 0.0, 1.0]
    }

    /// Matrix product `self · other`: `other` is applied first.
    pub fn multiply(&self, other: &Self) -> Self {
        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.rows[i][k] * other.rows[k][j]).sum();
            }
        }
        Self { rows }
    }

    pub fn transpose(&self) -> Self {
        let r = &self.rows;
        Self {
            rows: [
                [r[0][0], r[1][0], r[2][0]],
                [r[0][1], r[1][1], r[2][1]],
                [r[0][2], r[1][2], r[2][2]],
            ],
        }
    }

    /// Determinant of the 2x2 linear block (signed area scale).
    pub fn determinant(&self) -> f64 {
        let r = &self.rows;
        r[0][0] * r[1][1] - r[0][1] * r[1][0]
    }

    /// Inverse of an affine matrix, using the closed-form block inverse
    /// `[[L⁻¹, -L⁻¹·t], [0, 1]]`.
    ///
    /// Fails with `NotAffine` unless the bottom row is `[0, 0, 1]`.
    pub fn inverse(&self) -> Result<Self> {
        if !self.is_affine() {
            return Err(FrameError::NotAffine {
                bottom_row: self.rows[2],
            });
        }

        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(FrameError::SingularMatrix { determinant: det });
        }

        let [[a, b, tx], [c, d, ty], _] = self.rows;
        let inv_det = 1.0 / det;
        Ok(Self::affine(
            d * inv_det,
            -b * inv_det,
            (b * ty - d * tx) * inv_det,
            -c * inv_det,
            a * inv_det,
            (c * tx - a * ty) * inv_det,
        ))
    }

    /// Apply to a homogeneous 3-vector.
    pub fn apply(&self, v: [f64; 3]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (i, cell) in out.iter_mut().enumerate() {
            *cell = self.rows[i][0] * v[0] + self.rows[i][1] * v[1] + self.rows[i][2] * v[2];
        }
        out
    }

    /// The two basis vectors (first two columns, without the homogeneous row).
    pub fn basis(&self) -> [Vec2; 2] {
        let r = &self.rows;
        [[r[0][0], r[1][0]], [r[0][1], r[1][1]]]
    }

    pub fn translation_part(&self) -> Vec2 {
        [self.rows[0][2], self.rows[1][2]]
    }

    /// Rebuild an affine matrix from new basis columns, keeping this
    /// matrix's translation.
    pub fn with_basis(&self, basis: [Vec2; 2]) -> Self {
        let [tx, ty] = self.translation_part();
        Self::affine(basis[0][0], basis[1][0], tx, basis[0][1], basis[1][1], ty)
    }

    /// Element-wise comparison within `epsilon`.
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.rows
            .iter()
            .flatten()
            .zip(other.rows.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Mul for Matrix2D {
    type Output = Matrix2D;

    fn mul(self, rhs: Matrix2D) -> Matrix2D {
        self.multiply(&rhs)
    }
}

impl TryFrom<[[f64; 3]; 3]> for Matrix2D {
    type Error = FrameError;

    fn try_from(rows: [[f64; 3]; 3]) -> Result<Self> {
        let matrix = Self::from_rows(rows);
        if !matrix.is_affine() {
            return Err(FrameError::NotAffine { bottom_row: rows[2] });
        }
        Ok(matrix)
    }
}

impl From<Matrix2D> for [[f64; 3]; 3] {
    fn from(matrix: Matrix2D) -> Self {
        matrix.rows
    }
}

/// Euclidean norm of a 2-vector.
pub fn norm(v: Vec2) -> f64 {
    v[0].hypot(v[1])
}

/// Dot product of two equally sized vectors.
pub fn dot(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(FrameError::ShapeMismatch {
            index: 1,
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Product of a stack of matrices, `Mn · … · M2 · M1`.
///
/// The first matrix is applied first. An empty stack is the identity.
pub fn multiply_stack(stack: &[Matrix2D]) -> Matrix2D {
    stack
        .iter()
        .fold(Matrix2D::identity(), |acc, m| m.multiply(&acc))
}

/// A stack of matrices composed in push order.
///
/// The first pushed matrix is the innermost transform, so pushing
/// `translate` then `rotate` rotates the translated result.
#[derive(Debug, Clone, Default)]
pub struct MatrixStack {
    matrices: Vec<Matrix2D>,
}

impl MatrixStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, matrix: Matrix2D) -> &mut Self {
        self.matrices.push(matrix);
        self
    }

    pub fn translate(&mut self, dx: f64, dy: f64) -> &mut Self {
        self.push(Matrix2D::translation(dx, dy))
    }

    pub fn rotate(&mut self, theta: f64) -> &mut Self {
        self.push(Matrix2D::rotation(theta))
    }

    pub fn scale(&mut self, sx: f64, sy: f64) -> &mut Self {
        self.push(Matrix2D::scaling(sx, sy))
    }

    /// Compose the stack (see [`multiply_stack`]).
    pub fn to_matrix(&self) -> Matrix2D {
        multiply_stack(&self.matrices)
    }

    pub fn clear(&mut self) {
        self.matrices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }
}

impl FromIterator<Matrix2D> for MatrixStack {
    fn from_iter<I: IntoIterator<Item = Matrix2D>>(iter: I) -> Self {
        Self {
            matrices: iter.into_iter().collect(),
        }
    }
}
