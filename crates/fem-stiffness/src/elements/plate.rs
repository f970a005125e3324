//! 4-node Mindlin plate (S4) with membrane action.
//!
//! Each node carries 5 freedoms (X, Y, Z, XX, YY); there is no drilling
//! stiffness about the plate normal. Rotations enter through the section
//! rotations `βx = θy` and `βy = -θx`.
//!
//! ## Integration
//! - Membrane and bending: 2×2 Gauss
//! - Transverse shear: 1-point (selective reduced integration, avoids
//!   shear locking in thin plates)
//!
//! Geometry is projected onto the plate's local x-y plane before
//! integration, so the formulation only ever sees a flat quadrilateral.

use super::natural_coordinates;
use crate::builder::ElementFormulation;
use crate::builder::rotation::axis_rotation;
use crate::error::{Result, StiffnessError};
use crate::keyed::KeyedMatrix;
use crate::stiffness_matrix::StiffnessMatrix;
use crate::strain::StrainComponent;
use fem_model::{Dof, Element, NodeDof, PlateSection, Section};
use nalgebra::{DMatrix, Matrix2, SMatrix, Vector2};

/// Strain rows of the plate B matrix, in row order
pub const PLATE_STRAINS: [StrainComponent; 8] = [
    StrainComponent::MembraneXx,
    StrainComponent::MembraneYy,
    StrainComponent::MembraneXy,
    StrainComponent::BendingXx,
    StrainComponent::BendingYy,
    StrainComponent::BendingXy,
    StrainComponent::ShearXz,
    StrainComponent::ShearYz,
];

const PLATE_DOFS: [Dof; 5] = [Dof::X, Dof::Y, Dof::Z, Dof::XX, Dof::YY];
const DOFS_PER_NODE: usize = 5;
const NUM_DOFS: usize = 4 * DOFS_PER_NODE;

/// Natural coordinates of the corner nodes, counter-clockwise
const CORNERS: [(f64, f64); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

#[derive(Debug, Clone, Copy, Default)]
pub struct PlateFormulation;

/// Shape functions and their Cartesian derivatives at one point
struct PointData {
    n: [f64; 4],
    dn_dx: [f64; 4],
    dn_dy: [f64; 4],
    det_j: f64,
}

fn plate_section(element: &Element) -> Result<&PlateSection> {
    match element.section() {
        Section::Plate(section) => Ok(section),
        other => Err(StiffnessError::InvalidArgument(format!(
            "plate formulation cannot use a {} section (element {})",
            other.name(),
            element.id()
        ))),
    }
}

/// In-plane coordinates of the corner nodes in the local frame, measured
/// from node 1
fn local_coordinates(element: &Element) -> Result<[Vector2<f64>; 4]> {
    let rotation = axis_rotation(&element.local_axes())?;
    let r = rotation.as_dense();
    let nodes = element.nodes();
    let origin = nodes[0].position();

    let mut coords = [Vector2::zeros(); 4];
    for (coord, node) in coords.iter_mut().zip(nodes) {
        let d = node.position() - origin;
        let project = |row: usize| r[(row, 0)] * d.x + r[(row, 1)] * d.y + r[(row, 2)] * d.z;
        *coord = Vector2::new(project(0), project(1));
    }
    Ok(coords)
}

fn point_data(element: &Element, coords: &[Vector2<f64>; 4], xi: f64, eta: f64) -> Result<PointData> {
    let mut n = [0.0; 4];
    let mut dn_dxi = [0.0; 4];
    let mut dn_deta = [0.0; 4];
    for (i, &(xi_i, eta_i)) in CORNERS.iter().enumerate() {
        n[i] = 0.25 * (1.0 + xi * xi_i) * (1.0 + eta * eta_i);
        dn_dxi[i] = 0.25 * xi_i * (1.0 + eta * eta_i);
        dn_deta[i] = 0.25 * eta_i * (1.0 + xi * xi_i);
    }

    // J = [[dx/dξ, dy/dξ], [dx/dη, dy/dη]]
    let mut jac = Matrix2::<f64>::zeros();
    for i in 0..4 {
        jac[(0, 0)] += dn_dxi[i] * coords[i].x;
        jac[(0, 1)] += dn_dxi[i] * coords[i].y;
        jac[(1, 0)] += dn_deta[i] * coords[i].x;
        jac[(1, 1)] += dn_deta[i] * coords[i].y;
    }
    let det_j = jac.determinant();
    if !(det_j > 0.0) || !det_j.is_finite() {
        return Err(StiffnessError::InvalidArgument(format!(
            "plate element {} has a non-positive Jacobian determinant {} at ({}, {}); check node order and convexity",
            element.id(),
            det_j,
            xi,
            eta
        )));
    }
    let inv = Matrix2::new(jac[(1, 1)], -jac[(0, 1)], -jac[(1, 0)], jac[(0, 0)]) / det_j;

    let mut dn_dx = [0.0; 4];
    let mut dn_dy = [0.0; 4];
    for i in 0..4 {
        dn_dx[i] = inv[(0, 0)] * dn_dxi[i] + inv[(0, 1)] * dn_deta[i];
        dn_dy[i] = inv[(1, 0)] * dn_dxi[i] + inv[(1, 1)] * dn_deta[i];
    }

    Ok(PointData { n, dn_dx, dn_dy, det_j })
}

/// 8×20 strain-displacement matrix in [`PLATE_STRAINS`] row order
fn b_matrix(p: &PointData) -> SMatrix<f64, 8, NUM_DOFS> {
    let mut b = SMatrix::<f64, 8, NUM_DOFS>::zeros();
    for i in 0..4 {
        let (x, y, z, rx, ry) = (
            DOFS_PER_NODE * i,
            DOFS_PER_NODE * i + 1,
            DOFS_PER_NODE * i + 2,
            DOFS_PER_NODE * i + 3,
            DOFS_PER_NODE * i + 4,
        );

        // Membrane
        b[(0, x)] = p.dn_dx[i];
        b[(1, y)] = p.dn_dy[i];
        b[(2, x)] = p.dn_dy[i];
        b[(2, y)] = p.dn_dx[i];

        // Bending: κxx = βx,x  κyy = βy,y  κxy = βx,y + βy,x
        b[(3, ry)] = p.dn_dx[i];
        b[(4, rx)] = -p.dn_dy[i];
        b[(5, ry)] = p.dn_dy[i];
        b[(5, rx)] = -p.dn_dx[i];

        // Shear: γxz = w,x + βx  γyz = w,y + βy
        b[(6, z)] = p.dn_dx[i];
        b[(6, ry)] = p.n[i];
        b[(7, z)] = p.dn_dy[i];
        b[(7, rx)] = -p.n[i];
    }
    b
}

/// Constitutive matrices for membrane plus bending, and for shear
fn constitutive(element: &Element) -> Result<(SMatrix<f64, 8, 8>, SMatrix<f64, 8, 8>)> {
    let section = plate_section(element)?;
    let material = element.material();
    let e = material.require_elastic_modulus()?;
    let nu = material.require_poissons_ratio()?;
    let g = material.require_shear_modulus()?;
    let t = section.thickness;

    let plane = [[1.0, nu, 0.0], [nu, 1.0, 0.0], [0.0, 0.0, 0.5 * (1.0 - nu)]];
    let membrane = e * t / (1.0 - nu * nu);
    let bending = e * t.powi(3) / (12.0 * (1.0 - nu * nu));

    let mut d_mb = SMatrix::<f64, 8, 8>::zeros();
    for i in 0..3 {
        for j in 0..3 {
            d_mb[(i, j)] = membrane * plane[i][j];
            d_mb[(3 + i, 3 + j)] = bending * plane[i][j];
        }
    }

    let mut d_s = SMatrix::<f64, 8, 8>::zeros();
    let shear = section.shear_correction * g * t;
    d_s[(6, 6)] = shear;
    d_s[(7, 7)] = shear;

    Ok((d_mb, d_s))
}

impl PlateFormulation {
    fn local_matrix(&self, element: &Element) -> Result<SMatrix<f64, NUM_DOFS, NUM_DOFS>> {
        let (d_mb, d_s) = constitutive(element)?;
        let coords = local_coordinates(element)?;
        let mut k = SMatrix::<f64, NUM_DOFS, NUM_DOFS>::zeros();

        let g = 1.0 / 3.0_f64.sqrt();
        for (xi, eta) in [(-g, -g), (g, -g), (g, g), (-g, g)] {
            let p = point_data(element, &coords, xi, eta)?;
            let b = b_matrix(&p);
            k += b.transpose() * d_mb * b * p.det_j;
        }

        let p = point_data(element, &coords, 0.0, 0.0)?;
        let b = b_matrix(&p);
        k += b.transpose() * d_s * b * (4.0 * p.det_j);

        Ok(k)
    }
}

impl ElementFormulation for PlateFormulation {
    fn name(&self) -> &'static str {
        "plate"
    }

    fn local_stiffness(&self, element: &Element) -> Result<StiffnessMatrix> {
        let k = self.local_matrix(element)?;
        let keys = element.node_dofs();
        let dense = DMatrix::from_column_slice(NUM_DOFS, NUM_DOFS, k.as_slice());
        StiffnessMatrix::try_from(KeyedMatrix::from_dense(keys.clone(), keys, dense)?)
    }

    fn shape_function_matrix(&self, element: &Element, natural: &[f64]) -> Result<KeyedMatrix<Dof, NodeDof>> {
        let [xi, eta] = natural_coordinates::<2>(natural)?;
        let mut n = KeyedMatrix::zeros(PLATE_DOFS, element.node_dofs())?;
        for (node, &(xi_i, eta_i)) in element.nodes().iter().zip(CORNERS.iter()) {
            let value = 0.25 * (1.0 + xi * xi_i) * (1.0 + eta * eta_i);
            for dof in PLATE_DOFS {
                n.set(&dof, &NodeDof::new(node.id, dof), value)?;
            }
        }
        Ok(n)
    }

    fn strain_displacement_matrix(
        &self,
        element: &Element,
        natural: &[f64],
    ) -> Result<KeyedMatrix<StrainComponent, NodeDof>> {
        let [xi, eta] = natural_coordinates::<2>(natural)?;
        let coords = local_coordinates(element)?;
        let b = b_matrix(&point_data(element, &coords, xi, eta)?);
        let dense = DMatrix::from_column_slice(8, NUM_DOFS, b.as_slice());
        KeyedMatrix::from_dense(PLATE_STRAINS, element.node_dofs(), dense)
    }
}
