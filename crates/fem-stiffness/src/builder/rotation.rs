//! Local-to-global transforms built from an element's local triad.

use crate::error::{Result, StiffnessError};
use crate::keyed::KeyedMatrix;
use fem_model::{Dof, Element, NodeDof};
use nalgebra::DVector;

const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];

/// 3×3 rotation whose rows are the normalized local axes.
///
/// Rows are keyed by the local translational DOFs, columns by the global
/// ones, so `R[(X, Y)]` is the global-Y component of the local x axis.
pub fn axis_rotation(axes: &[DVector<f64>; 3]) -> Result<KeyedMatrix<Dof, Dof>> {
    let mut rotation = KeyedMatrix::zeros(Dof::TRANSLATIONS, Dof::TRANSLATIONS)?;

    for ((axis, name), local) in axes.iter().zip(AXIS_NAMES).zip(Dof::TRANSLATIONS) {
        if axis.len() != 3 {
            return Err(StiffnessError::InvalidArgument(format!(
                "local {} axis must have 3 components, got {}",
                name,
                axis.len()
            )));
        }
        let norm = axis.norm();
        if norm == 0.0 || !norm.is_finite() {
            return Err(StiffnessError::InvalidArgument(format!(
                "local {} axis has zero or non-finite length",
                name
            )));
        }
        for (component, global) in axis.iter().zip(Dof::TRANSLATIONS) {
            rotation.set(&local, &global, component / norm)?;
        }
    }

    Ok(rotation)
}

/// Whether the rotation equals the identity within `tolerance`
pub fn is_identity(rotation: &KeyedMatrix<Dof, Dof>, tolerance: f64) -> bool {
    rotation.entries().all(|(row, col, value)| {
        let expected = if row == col { 1.0 } else { 0.0 };
        (value - expected).abs() <= tolerance
    })
}

/// Expand a 3×3 rotation to the element's node/DOF keys.
///
/// Translations at each node receive the full rotation block; rotational
/// freedoms pass through an identity block and are not rotated.
pub fn expand_rotation(
    rotation: &KeyedMatrix<Dof, Dof>,
    element: &Element,
) -> Result<KeyedMatrix<NodeDof, NodeDof>> {
    let keys = element.node_dofs();
    let mut transform = KeyedMatrix::zeros(keys.clone(), keys)?;
    let dofs = element.kind().dofs();

    for node in element.nodes() {
        for &row in dofs {
            for &col in dofs {
                let value = match (row.is_translation(), col.is_translation()) {
                    (true, true) => rotation.at(&row, &col)?,
                    (false, false) if row == col => 1.0,
                    _ => continue,
                };
                transform.set(&NodeDof::new(node.id, row), &NodeDof::new(node.id, col), value)?;
            }
        }
    }

    Ok(transform)
}

/// Full local-to-global transform for `element`
pub fn element_transform(element: &Element) -> Result<KeyedMatrix<NodeDof, NodeDof>> {
    let rotation = axis_rotation(&element.local_axes())?;
    expand_rotation(&rotation, element)
}
