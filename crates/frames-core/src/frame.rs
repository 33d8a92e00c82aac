//! Frame trees.
//!
//! A [`Frame`] is a node carrying a `world_matrix` that places its basis and
//! origin in its parent's coordinate space. Frames own their children, which
//! are either nested frames or [`Node::Opaque`] payloads that carry no matrix.
//! Opaque nodes keep their place in the tree but are never treated as frames.
//!
//! The serialized form matches unist-style JSON trees:
//! ```json
//! { "type": "frame", "worldMatrix": [[1,0,2],[0,1,1],[0,0,1]], "data": {}, "children": [] }
//! ```
//! A child without a `worldMatrix` key deserializes as an opaque node. A child
//! that has one must parse as a frame, or the whole tree is rejected.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{FrameError, Result};
use crate::matrix::Matrix2D;

/// Default `type` tag of a frame node.
pub const FRAME_KIND: &str = "frame";

fn frame_kind() -> String {
    FRAME_KIND.to_string()
}

/// A coordinate frame and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    #[serde(rename = "type", default = "frame_kind")]
    pub kind: String,
    pub world_matrix: Matrix2D,
    /// Caller payload, never read by the engine.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// A child slot in a frame tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Frame(Frame),
    /// Payload without a matrix; kept structurally, skipped by traversal.
    Opaque(Value),
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if value.get("worldMatrix").is_none() {
            return Ok(Node::Opaque(value));
        }
        Frame::deserialize(value)
            .map(Node::Frame)
            .map_err(serde::de::Error::custom)
    }
}

/// A childless frame at the identity.
pub fn identity_frame() -> Frame {
    Frame::new(Matrix2D::identity())
}

impl Default for Frame {
    fn default() -> Self {
        identity_frame()
    }
}

impl From<Frame> for Node {
    fn from(frame: Frame) -> Self {
        Node::Frame(frame)
    }
}

impl Node {
    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            Node::Frame(frame) => Some(frame),
            Node::Opaque(_) => None,
        }
    }

    pub fn as_frame_mut(&mut self) -> Option<&mut Frame> {
        match self {
            Node::Frame(frame) => Some(frame),
            Node::Opaque(_) => None,
        }
    }

    /// The frame in this slot, or `InvalidFrame` for an opaque node.
    pub fn frame(&self) -> Result<&Frame> {
        self.as_frame()
            .ok_or(FrameError::InvalidFrame { path: Vec::new() })
    }

    pub fn is_frame(&self) -> bool {
        matches!(self, Node::Frame(_))
    }
}

impl TryFrom<Node> for Frame {
    type Error = FrameError;

    fn try_from(node: Node) -> Result<Self> {
        match node {
            Node::Frame(frame) => Ok(frame),
            Node::Opaque(_) => Err(FrameError::InvalidFrame { path: Vec::new() }),
        }
    }
}

impl Frame {
    pub fn new(world_matrix: Matrix2D) -> Self {
        Self {
            kind: frame_kind(),
            world_matrix,
            data: Value::Null,
            children: Vec::new(),
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Copy of this frame with `child` prepended to its children.
    pub fn with_child(&self, child: impl Into<Node>) -> Self {
        let mut children = Vec::with_capacity(self.children.len() + 1);
        children.push(child.into());
        children.extend(self.children.iter().cloned());
        Self {
            kind: self.kind.clone(),
            world_matrix: self.world_matrix,
            data: self.data.clone(),
            children,
        }
    }

    /// Append a child in place.
    pub fn push_child(&mut self, child: impl Into<Node>) -> &mut Self {
        self.children.push(child.into());
        self
    }

    pub fn world_matrix(&self) -> &Matrix2D {
        &self.world_matrix
    }

    /// The `index`-th child, which must be a frame.
    pub fn child(&self, index: usize) -> Result<&Frame> {
        self.descendant(&[index])
    }

    pub fn child_mut(&mut self, index: usize) -> Result<&mut Frame> {
        self.descendant_mut(&[index])
    }

    /// Follow child indices from this frame. An empty path is the frame itself.
    pub fn descendant(&self, path: &[usize]) -> Result<&Frame> {
        let mut current = self;
        for (depth, &index) in path.iter().enumerate() {
            current = current
                .children
                .get(index)
                .and_then(Node::as_frame)
                .ok_or_else(|| FrameError::InvalidFrame {
                    path: path[..=depth].to_vec(),
                })?;
        }
        Ok(current)
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Result<&mut Frame> {
        let mut current = self;
        for (depth, &index) in path.iter().enumerate() {
            current = current
                .children
                .get_mut(index)
                .and_then(Node::as_frame_mut)
                .ok_or_else(|| FrameError::InvalidFrame {
                    path: path[..=depth].to_vec(),
                })?;
        }
        Ok(current)
    }

    /// Frame descendants in pre-order, excluding `self`. Opaque nodes and
    /// everything below them are skipped.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Structural and numeric equality of two trees within `epsilon`.
    /// Opaque payloads and `data` must match exactly.
    pub fn approx_eq(&self, other: &Frame, epsilon: f64) -> bool {
        self.kind == other.kind
            && self.data == other.data
            && self.world_matrix.approx_eq(&other.world_matrix, epsilon)
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|pair| match pair {
                    (Node::Frame(a), Node::Frame(b)) => a.approx_eq(b, epsilon),
                    (Node::Opaque(a), Node::Opaque(b)) => a == b,
                    _ => false,
                })
    }
}

/// Pre-order iterator over frame descendants.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Frame;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if let Node::Frame(frame) = node {
                self.stack.extend(frame.children.iter().rev());
                return Some(frame);
            }
        }
        None
    }
}
