//! Stiffness matrices keyed by (node, degree of freedom).

use crate::error::{Result, StiffnessError};
use crate::keyed::{KeyedMatrix, KeyedVector};
use fem_model::{Dof, NodeDof, NodeId};
use std::ops::Deref;

/// Square keyed matrix whose rows and columns share one node/DOF key sequence
#[derive(Debug, Clone, PartialEq)]
pub struct StiffnessMatrix(KeyedMatrix<NodeDof, NodeDof>);

impl StiffnessMatrix {
    /// Zero matrix over the given node/DOF keys
    pub fn zeros(keys: impl IntoIterator<Item = NodeDof>) -> Result<Self> {
        let keys: Vec<NodeDof> = keys.into_iter().collect();
        Ok(Self(KeyedMatrix::zeros(keys.clone(), keys)?))
    }

    /// Coefficient coupling (`row_node`, `row_dof`) to (`col_node`, `col_dof`)
    pub fn at(&self, row_node: NodeId, row_dof: Dof, col_node: NodeId, col_dof: Dof) -> Result<f64> {
        self.0
            .at(&NodeDof::new(row_node, row_dof), &NodeDof::new(col_node, col_dof))
    }

    pub fn add_at(&mut self, row_node: NodeId, row_dof: Dof, col_node: NodeId, col_dof: Dof, value: f64) -> Result<()> {
        self.0.add_at(
            &NodeDof::new(row_node, row_dof),
            &NodeDof::new(col_node, col_dof),
            value,
        )
    }

    /// Set both (a, b) and (b, a)
    pub fn set_symmetric(&mut self, a: NodeDof, b: NodeDof, value: f64) -> Result<()> {
        self.0.set(&a, &b, value)?;
        self.0.set(&b, &a, value)
    }

    pub fn node_dofs(&self) -> &[NodeDof] {
        self.0.row_keys()
    }

    pub fn keyed(&self) -> &KeyedMatrix<NodeDof, NodeDof> {
        &self.0
    }

    /// Whether |K_ij - K_ji| <= tolerance · max|K| for every pair
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let data = self.0.as_dense();
        let bound = tolerance * self.0.max_abs();
        (0..data.nrows()).all(|i| (0..i).all(|j| (data[(i, j)] - data[(j, i)]).abs() <= bound))
    }

    /// Nodal forces `K · u` for the displacements `u`
    pub fn nodal_forces(&self, displacements: &KeyedVector<NodeDof>) -> Result<KeyedVector<NodeDof>> {
        self.0.mul_vector(displacements)
    }
}

impl TryFrom<KeyedMatrix<NodeDof, NodeDof>> for StiffnessMatrix {
    type Error = StiffnessError;

    /// Reinterpret a node/DOF keyed matrix; rows and columns must carry
    /// the same key sequence
    fn try_from(matrix: KeyedMatrix<NodeDof, NodeDof>) -> Result<Self> {
        matrix
            .row_index()
            .ensure_aligned(matrix.col_index(), "stiffness matrix rows vs columns")?;
        Ok(Self(matrix))
    }
}

impl Deref for StiffnessMatrix {
    type Target = KeyedMatrix<NodeDof, NodeDof>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
