//! 2-node axial bar, used for truss (T3D2) and spring elements.
//!
//! Only the axial freedom resists load. In the local frame, with x running
//! from node 1 to node 2:
//!
//! ```text
//! k_local = k * [ 1  -1]    on (1.X, 2.X)
//!               [-1   1]
//! ```
//!
//! where `k = E*A/L` for a truss and the prescribed stiffness for a spring.
//! Every other coefficient is zero.

use super::{line_length, natural_coordinates};
use crate::builder::ElementFormulation;
use crate::error::{Result, StiffnessError};
use crate::keyed::KeyedMatrix;
use crate::stiffness_matrix::StiffnessMatrix;
use crate::strain::StrainComponent;
use fem_model::{Dof, Element, NodeDof, Section};

#[derive(Debug, Clone, Copy, Default)]
pub struct TrussFormulation;

impl TrussFormulation {
    /// Axial stiffness of the bar
    pub fn axial_stiffness(&self, element: &Element) -> Result<f64> {
        match element.section() {
            Section::Truss(section) => {
                let length = line_length(element)?;
                let e = element.material().require_elastic_modulus()?;
                Ok(e * section.area / length)
            }
            Section::Spring(section) => Ok(section.stiffness),
            other => Err(StiffnessError::InvalidArgument(format!(
                "axial formulation cannot use a {} section (element {})",
                other.name(),
                element.id()
            ))),
        }
    }
}

fn end_keys(element: &Element, dof: Dof) -> (NodeDof, NodeDof) {
    let nodes = element.nodes();
    (NodeDof::new(nodes[0].id, dof), NodeDof::new(nodes[1].id, dof))
}

impl ElementFormulation for TrussFormulation {
    fn name(&self) -> &'static str {
        "truss"
    }

    fn local_stiffness(&self, element: &Element) -> Result<StiffnessMatrix> {
        let k = self.axial_stiffness(element)?;
        // Springs have no length of their own, but the triad still needs one
        line_length(element)?;

        let mut k_local = StiffnessMatrix::zeros(element.node_dofs())?;
        let (a, b) = end_keys(element, Dof::X);
        k_local.set_symmetric(a, a, k)?;
        k_local.set_symmetric(b, b, k)?;
        k_local.set_symmetric(a, b, -k)?;
        Ok(k_local)
    }

    fn shape_function_matrix(&self, element: &Element, natural: &[f64]) -> Result<KeyedMatrix<Dof, NodeDof>> {
        let [xi] = natural_coordinates::<1>(natural)?;
        let n1 = 0.5 * (1.0 - xi);
        let n2 = 0.5 * (1.0 + xi);

        let mut n = KeyedMatrix::zeros(Dof::TRANSLATIONS, element.node_dofs())?;
        for dof in Dof::TRANSLATIONS {
            let (a, b) = end_keys(element, dof);
            n.set(&dof, &a, n1)?;
            n.set(&dof, &b, n2)?;
        }
        Ok(n)
    }

    fn strain_displacement_matrix(
        &self,
        element: &Element,
        natural: &[f64],
    ) -> Result<KeyedMatrix<StrainComponent, NodeDof>> {
        natural_coordinates::<1>(natural)?;
        let length = line_length(element)?;

        let mut b = KeyedMatrix::zeros([StrainComponent::Axial], element.node_dofs())?;
        let (first, second) = end_keys(element, Dof::X);
        b.set(&StrainComponent::Axial, &first, -1.0 / length)?;
        b.set(&StrainComponent::Axial, &second, 1.0 / length)?;
        Ok(b)
    }
}
