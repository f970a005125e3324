//! Structural nodes.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Node identity (1-based, as in input decks)
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        NodeId(id)
    }
}

/// A node in the finite element model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Node {
    /// Create a new node
    pub fn new(id: u32, x: f64, y: f64, z: f64) -> Self {
        Self {
            id: NodeId(id),
            x,
            y,
            z,
        }
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Vector from this node to `other`
    pub fn vector_to(&self, other: &Node) -> Vector3<f64> {
        other.position() - self.position()
    }
}
