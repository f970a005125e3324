//! Sparse assembly of element stiffness contributions.
//!
//! Builders are refreshed in parallel, then every global coefficient is
//! accumulated into a COO matrix keyed by equation numbers and converted to
//! CSR. Only DOFs that some element actually carries receive an equation,
//! so mixed meshes of trusses, beams and plates number cleanly.

use crate::builder::ElementStiffnessBuilder;
use crate::error::{Result, StiffnessError};
use crate::stiffness_matrix::StiffnessMatrix;
use fem_model::{Dof, NodeDof, NodeId};
use log::debug;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Equation number for every node/DOF pair, in key order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DofNumbering {
    equations: BTreeMap<NodeDof, usize>,
}

impl DofNumbering {
    pub fn from_keys(keys: impl IntoIterator<Item = NodeDof>) -> Self {
        let mut equations: BTreeMap<NodeDof, usize> = keys.into_iter().map(|key| (key, 0)).collect();
        for (equation, slot) in equations.values_mut().enumerate() {
            *slot = equation;
        }
        Self { equations }
    }

    /// Number the DOFs of every bound element
    pub fn from_builders(builders: &[Box<dyn ElementStiffnessBuilder>]) -> Result<Self> {
        let mut keys = Vec::new();
        for builder in builders {
            keys.extend(builder.element()?.read().node_dofs());
        }
        Ok(Self::from_keys(keys))
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    pub fn equation(&self, key: &NodeDof) -> Option<usize> {
        self.equations.get(key).copied()
    }

    fn require(&self, key: &NodeDof) -> Result<usize> {
        self.equation(key)
            .ok_or_else(|| StiffnessError::OutOfRange(format!("no equation for {}", key)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &NodeDof> + '_ {
        self.equations.keys()
    }
}

/// Assembled structure stiffness
#[derive(Debug, Clone)]
pub struct AssembledStiffness {
    pub numbering: DofNumbering,
    pub matrix: CsrMatrix<f64>,
}

impl AssembledStiffness {
    pub fn num_equations(&self) -> usize {
        self.numbering.len()
    }

    pub fn at(&self, row_node: NodeId, row_dof: Dof, col_node: NodeId, col_dof: Dof) -> Result<f64> {
        let i = self.numbering.require(&NodeDof::new(row_node, row_dof))?;
        let j = self.numbering.require(&NodeDof::new(col_node, col_dof))?;
        Ok(self
            .matrix
            .get_entry(i, j)
            .map(|entry| entry.into_value())
            .unwrap_or(0.0))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalAssembler;

impl GlobalAssembler {
    /// Refresh every builder and sum their global matrices.
    ///
    /// The first builder error aborts the assembly.
    pub fn assemble(&self, builders: &mut [Box<dyn ElementStiffnessBuilder>]) -> Result<AssembledStiffness> {
        let numbering = DofNumbering::from_builders(builders)?;

        let matrices: Vec<Arc<StiffnessMatrix>> = builders
            .par_iter_mut()
            .map(|builder| builder.global_stiffness())
            .collect::<Result<_>>()?;

        // Accumulate duplicates before building the COO triplets
        let mut entry_map: HashMap<(usize, usize), f64> = HashMap::new();
        for k_e in &matrices {
            let equations = k_e
                .node_dofs()
                .iter()
                .map(|key| numbering.require(key))
                .collect::<Result<Vec<_>>>()?;
            let dense = k_e.as_dense();
            for (i_local, &i_global) in equations.iter().enumerate() {
                for (j_local, &j_global) in equations.iter().enumerate() {
                    let value = dense[(i_local, j_local)];
                    if value != 0.0 {
                        *entry_map.entry((i_global, j_global)).or_insert(0.0) += value;
                    }
                }
            }
        }

        let n = numbering.len();
        let mut rows = Vec::with_capacity(entry_map.len());
        let mut cols = Vec::with_capacity(entry_map.len());
        let mut values = Vec::with_capacity(entry_map.len());
        for ((i, j), v) in entry_map {
            rows.push(i);
            cols.push(j);
            values.push(v);
        }

        let coo = CooMatrix::try_from_triplets(n, n, rows, cols, values)
            .map_err(|e| StiffnessError::InvalidArgument(format!("failed to create COO matrix: {}", e)))?;
        let matrix = CsrMatrix::from(&coo);
        debug!(
            "assembled {} elements into {} equations ({} non-zeros)",
            builders.len(),
            n,
            matrix.nnz()
        );

        Ok(AssembledStiffness { numbering, matrix })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StiffnessBuilder;
    use crate::config::BuilderConfig;
    use crate::elements::TrussFormulation;
    use crate::factory::StiffnessBuilderFactory;
    use approx::assert_relative_eq;
    use fem_model::{BeamSection, Element, Material, Node, TrussSection};

    fn steel() -> Material {
        Material::elastic("STEEL", 200.0, 0.3)
    }

    fn truss(id: u32, a: Node, b: Node) -> Box<dyn ElementStiffnessBuilder> {
        let element = Element::truss(id, [a, b], steel(), TrussSection::new(1.0)).unwrap();
        StiffnessBuilderFactory::new().create(element.into_shared()).unwrap()
    }

    #[test]
    fn numbering_follows_key_order() {
        let numbering = DofNumbering::from_keys([
            NodeDof::new(NodeId(2), Dof::X),
            NodeDof::new(NodeId(1), Dof::Y),
            NodeDof::new(NodeId(1), Dof::X),
            NodeDof::new(NodeId(2), Dof::X),
        ]);
        assert_eq!(numbering.len(), 3);
        assert_eq!(numbering.equation(&NodeDof::new(NodeId(1), Dof::X)), Some(0));
        assert_eq!(numbering.equation(&NodeDof::new(NodeId(2), Dof::X)), Some(2));
        assert_eq!(numbering.equation(&NodeDof::new(NodeId(3), Dof::X)), None);
    }

    #[test]
    fn shared_node_sums_contributions() {
        let mut builders = vec![
            truss(1, Node::new(1, 0.0, 0.0, 0.0), Node::new(2, 1.0, 0.0, 0.0)),
            truss(2, Node::new(2, 1.0, 0.0, 0.0), Node::new(3, 3.0, 0.0, 0.0)),
        ];
        let assembled = GlobalAssembler.assemble(&mut builders).unwrap();
        assert_eq!(assembled.num_equations(), 9);

        assert_relative_eq!(assembled.at(NodeId(2), Dof::X, NodeId(2), Dof::X).unwrap(), 200.0 + 100.0);
        assert_relative_eq!(assembled.at(NodeId(1), Dof::X, NodeId(2), Dof::X).unwrap(), -200.0);
        assert_eq!(assembled.at(NodeId(1), Dof::X, NodeId(3), Dof::X).unwrap(), 0.0);
        assert!(assembled.at(NodeId(1), Dof::XX, NodeId(1), Dof::X).unwrap_err().is_out_of_range());

        // Builders are left valid
        assert!(builders.iter().all(|b| !b.is_stale()));
    }

    #[test]
    fn mixed_mesh_numbers_only_carried_dofs() {
        let beam = Element::beam(
            3,
            [Node::new(2, 1.0, 0.0, 0.0), Node::new(4, 1.0, 1.0, 0.0)],
            steel(),
            BeamSection::circular(0.1),
        )
        .unwrap();
        let mut builders = vec![
            truss(1, Node::new(1, 0.0, 0.0, 0.0), Node::new(2, 1.0, 0.0, 0.0)),
            StiffnessBuilderFactory::new().create(beam.into_shared()).unwrap(),
        ];
        let assembled = GlobalAssembler.assemble(&mut builders).unwrap();
        // Node 1: 3 translations; nodes 2 and 4: 6 each
        assert_eq!(assembled.num_equations(), 15);
        assert!(assembled.numbering.equation(&NodeDof::new(NodeId(1), Dof::ZZ)).is_none());
        assert!(assembled.numbering.equation(&NodeDof::new(NodeId(2), Dof::ZZ)).is_some());
    }

    #[test]
    fn builder_failure_aborts_assembly() {
        let unbound: Box<dyn ElementStiffnessBuilder> =
            Box::new(StiffnessBuilder::new(TrussFormulation, BuilderConfig::default()));
        let mut builders = vec![
            truss(1, Node::new(1, 0.0, 0.0, 0.0), Node::new(2, 1.0, 0.0, 0.0)),
            unbound,
        ];
        assert!(GlobalAssembler.assemble(&mut builders).unwrap_err().is_invalid_operation());
    }
}
