//! Degree-of-freedom vocabulary and the node/DOF key used to address
//! stiffness coefficients.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A directional degree of freedom at a structural node.
///
/// The declaration order is the ordering used by every keyed matrix:
/// translations first, then rotations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dof {
    /// Translation along the first axis
    X,
    /// Translation along the second axis
    Y,
    /// Translation along the third axis
    Z,
    /// Rotation around the first axis
    XX,
    /// Rotation around the second axis
    YY,
    /// Rotation around the third axis
    ZZ,
}

impl Dof {
    pub const ALL: [Dof; 6] = [Dof::X, Dof::Y, Dof::Z, Dof::XX, Dof::YY, Dof::ZZ];
    pub const TRANSLATIONS: [Dof; 3] = [Dof::X, Dof::Y, Dof::Z];
    pub const ROTATIONS: [Dof; 3] = [Dof::XX, Dof::YY, Dof::ZZ];

    pub fn is_translation(self) -> bool {
        matches!(self, Dof::X | Dof::Y | Dof::Z)
    }

    pub fn is_rotation(self) -> bool {
        !self.is_translation()
    }
}

impl fmt::Display for Dof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Dof::X => "X",
            Dof::Y => "Y",
            Dof::Z => "Z",
            Dof::XX => "XX",
            Dof::YY => "YY",
            Dof::ZZ => "ZZ",
        };
        f.write_str(label)
    }
}

/// Composite key pairing a node with one of its degrees of freedom.
///
/// Ordered by node first, then by DOF, so sorting a set of keys groups
/// all freedoms of a node together.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeDof {
    pub node: NodeId,
    pub dof: Dof,
}

impl NodeDof {
    pub fn new(node: NodeId, dof: Dof) -> Self {
        Self { node, dof }
    }
}

impl fmt::Display for NodeDof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.dof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;
    use std::collections::HashSet;

    #[test]
    fn derive_works() {
        let x = Dof::X;
        assert_eq!(format!("{:?}", x), "X");
        assert_eq!(x.cmp(&Dof::Y), Ordering::Less);
        assert!(Dof::Z < Dof::XX);
    }

    #[test]
    fn classifies_translations_and_rotations() {
        for dof in Dof::TRANSLATIONS {
            assert!(dof.is_translation());
        }
        for dof in Dof::ROTATIONS {
            assert!(dof.is_rotation());
        }
    }

    #[test]
    fn node_dof_equality_needs_both_components() {
        let a = NodeDof::new(NodeId(1), Dof::X);
        assert_eq!(a, NodeDof::new(NodeId(1), Dof::X));
        assert_ne!(a, NodeDof::new(NodeId(1), Dof::Y));
        assert_ne!(a, NodeDof::new(NodeId(2), Dof::X));

        let set: HashSet<_> = [a, NodeDof::new(NodeId(1), Dof::X)].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn node_dof_orders_by_node_then_dof() {
        let mut keys = vec![
            NodeDof::new(NodeId(2), Dof::X),
            NodeDof::new(NodeId(1), Dof::ZZ),
            NodeDof::new(NodeId(1), Dof::X),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                NodeDof::new(NodeId(1), Dof::X),
                NodeDof::new(NodeId(1), Dof::ZZ),
                NodeDof::new(NodeId(2), Dof::X),
            ]
        );
        assert_eq!(keys[1].to_string(), "1.ZZ");
    }
}
