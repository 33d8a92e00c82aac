//! Installing a new matrix on a frame while carrying its subtree along.
//!
//! Every frame descendant `N` of the target is rewritten to
//! `multiply_stack([N, old⁻¹, new]) = new · old⁻¹ · N`, using the one inverse
//! captured before anything is mutated. The rewrite of a node never depends
//! on its parent's rewrite, so visit order is irrelevant; each frame
//! descendant is visited exactly once and opaque subtrees are not entered.

use tracing::trace;

use crate::error::Result;
use crate::frame::{Frame, Node};
use crate::matrix::{Matrix2D, multiply_stack};

/// The change of basis applied to every descendant.
#[derive(Debug, Clone, Copy)]
struct Rebase {
    old_inverse: Matrix2D,
    new: Matrix2D,
}

impl Rebase {
    fn new(current: &Matrix2D, new: Matrix2D) -> Result<Self> {
        Ok(Self {
            old_inverse: current.inverse()?,
            new,
        })
    }

    fn apply(&self, matrix: &Matrix2D) -> Matrix2D {
        multiply_stack(&[*matrix, self.old_inverse, self.new])
    }

    /// Rewrite every frame below `frame`, then install the new matrix on it.
    /// Returns the number of descendants rewritten.
    fn run(&self, frame: &mut Frame) -> usize {
        let mut rewritten = 0;
        let mut stack: Vec<&mut Node> = frame.children.iter_mut().collect();
        while let Some(node) = stack.pop() {
            if let Node::Frame(child) = node {
                child.world_matrix = self.apply(&child.world_matrix);
                rewritten += 1;
                stack.extend(child.children.iter_mut());
            }
        }
        frame.world_matrix = self.new;
        rewritten
    }
}

impl Frame {
    /// Copy of this tree in which `self` has `matrix` as its world matrix
    /// and every descendant keeps its placement relative to `self`.
    ///
    /// The receiver is left untouched.
    pub fn with_world_matrix(&self, matrix: Matrix2D) -> Result<Frame> {
        let rebase = Rebase::new(&self.world_matrix, matrix)?;
        let mut frame = self.clone();
        let rewritten = rebase.run(&mut frame);
        trace!(rewritten, "rebased frame copy");
        Ok(frame)
    }

    /// In-place form of [`Frame::with_world_matrix`].
    ///
    /// Mutates `self` and all of its frame descendants. If the current
    /// matrix is singular nothing is modified.
    pub fn give_world_matrix(&mut self, matrix: Matrix2D) -> Result<&mut Self> {
        let rebase = Rebase::new(&self.world_matrix, matrix)?;
        let rewritten = rebase.run(self);
        trace!(rewritten, "rebased frame in place");
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::point_transform;
    use crate::error::FrameError;
    use serde_json::json;

    const EPSILON: f64 = 1e-10;

    fn tree() -> Frame {
        let baby = Frame::new(Matrix2D::affine(1.0, 0.0, 2.0, 0.0, 1.0, 1.0));
        let mut frame2 = Frame::new(Matrix2D::affine(1.0, 2.0, -5.0, 1.0, -2.0, 8.0));
        frame2.push_child(baby);
        let frame1 = Frame::new(Matrix2D::affine(1.0, 0.0, 0.0, 0.0, 1.0, -1.0));
        let mut papa = Frame::new(Matrix2D::affine(-1.0, 0.0, 1.0, 0.0, -2.0, 0.0));
        papa.push_child(frame1).push_child(frame2);
        let mut root = Frame::new(Matrix2D::identity());
        root.push_child(papa);
        root
    }

    fn moved_tree() -> Frame {
        let baby = Frame::new(Matrix2D::affine(2.0, 0.0, 7.0, 0.0, 1.0, 5.0));
        let mut frame2 = Frame::new(Matrix2D::affine(2.0, 4.0, -7.0, 1.0, -2.0, 12.0));
        frame2.push_child(baby);
        let frame1 = Frame::new(Matrix2D::affine(2.0, 0.0, 3.0, 0.0, 1.0, 3.0));
        let mut papa = Frame::new(Matrix2D::affine(-2.0, 0.0, 5.0, 0.0, -2.0, 4.0));
        papa.push_child(frame1).push_child(frame2);
        let mut root = Frame::new(Matrix2D::affine(2.0, 0.0, 3.0, 0.0, 1.0, 4.0));
        root.push_child(papa);
        root
    }

    #[test]
    fn test_with_world_matrix() {
        let original = tree();
        let moved = original
            .with_world_matrix(Matrix2D::affine(2.0, 0.0, 3.0, 0.0, 1.0, 4.0))
            .unwrap();
        assert_eq!(original, tree());
        assert!(moved.approx_eq(&moved_tree(), EPSILON));
    }

    #[test]
    fn test_give_world_matrix_matches_copy() {
        let mut frame = Frame::new(Matrix2D::affine(1.0, 0.0, 9.0, 0.0, 1.0, -6.0));
        frame.push_child(Frame::new(Matrix2D::affine(1.0, 1.0, 10.0, -1.0, 1.0, -5.0)));
        let matrix = Matrix2D::affine(12.0, -12.0, 5.0, 12.0, 12.0, 13.0);

        let copied = frame.with_world_matrix(matrix).unwrap();
        frame.give_world_matrix(matrix).unwrap();
        assert_eq!(frame, copied);
        assert!(
            frame
                .child(0)
                .unwrap()
                .world_matrix
                .approx_eq(&Matrix2D::affine(24.0, 0.0, 5.0, 0.0, 24.0, 37.0), EPSILON)
        );
    }

    #[test]
    fn test_relative_geometry_is_preserved() {
        let original = tree();
        let moved = original
            .with_world_matrix(Matrix2D::rotation(0.3) * Matrix2D::scaling(2.0, -0.5))
            .unwrap();
        let paths: [&[usize]; 4] = [&[0], &[0, 0], &[0, 1], &[0, 1, 0]];
        for path in paths {
            let before = point_transform(
                [1.5, -2.0],
                original.descendant(path).unwrap(),
                &original,
            )
            .unwrap();
            let after =
                point_transform([1.5, -2.0], moved.descendant(path).unwrap(), &moved).unwrap();
            assert!((before[0] - after[0]).abs() < 1e-9);
            assert!((before[1] - after[1]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_opaque_nodes_pass_through() {
        let mut frame = Frame::new(Matrix2D::translation(1.0, 1.0));
        let payload = json!({
            "type": "text",
            "children": [{ "type": "text", "value": "nested" }]
        });
        frame.push_child(Node::Opaque(payload.clone()));
        frame.push_child(Frame::new(Matrix2D::identity()));

        frame
            .give_world_matrix(Matrix2D::translation(3.0, 0.0))
            .unwrap();
        assert_eq!(frame.children[0], Node::Opaque(payload));
        assert_eq!(
            frame.child(1).unwrap().world_matrix,
            Matrix2D::translation(2.0, -1.0)
        );
    }

    #[test]
    fn test_singular_current_matrix_leaves_tree_untouched() {
        let mut frame = Frame::new(Matrix2D::scaling(0.0, 2.0));
        frame.push_child(Frame::new(Matrix2D::translation(1.0, 1.0)));
        let before = frame.clone();

        let err = frame.give_world_matrix(Matrix2D::identity()).unwrap_err();
        assert!(matches!(err, FrameError::SingularMatrix { .. }));
        assert_eq!(frame, before);
        assert!(before.with_world_matrix(Matrix2D::identity()).is_err());
    }

    #[test]
    fn test_leaf_only_changes_itself() {
        let leaf = Frame::new(Matrix2D::translation(1.0, 2.0));
        let moved = leaf.with_world_matrix(Matrix2D::scaling(3.0, 3.0)).unwrap();
        assert_eq!(moved.world_matrix, Matrix2D::scaling(3.0, 3.0));
        assert!(moved.children.is_empty());
    }
}
