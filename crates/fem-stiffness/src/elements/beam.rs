//! 2-node Euler-Bernoulli beam (B31) with axial and torsional stiffness.
//!
//! Each node carries 6 freedoms (X, Y, Z, XX, YY, ZZ). Bending in the local
//! x-y plane couples Y with ZZ and uses `Izz`; bending in the local x-z
//! plane couples Z with YY and uses `Iyy`. Transverse displacements are
//! interpolated with cubic Hermite polynomials, axial displacement and
//! twist linearly.
//!
//! References:
//! - "Finite Element Procedures" by K.J. Bathe
//! - Cook et al., "Concepts and Applications of Finite Element Analysis"

use super::{line_length, natural_coordinates};
use crate::builder::ElementFormulation;
use crate::error::{Result, StiffnessError};
use crate::keyed::KeyedMatrix;
use crate::stiffness_matrix::StiffnessMatrix;
use crate::strain::StrainComponent;
use fem_model::{BeamSection, Dof, Element, NodeDof};
use nalgebra::{DMatrix, SMatrix};

/// Strain rows of the beam B matrix, in row order
pub const BEAM_STRAINS: [StrainComponent; 4] = [
    StrainComponent::Axial,
    StrainComponent::CurvatureY,
    StrainComponent::CurvatureZ,
    StrainComponent::Twist,
];

// Local indices within the 12 element freedoms
const U1: usize = 0;
const V1: usize = 1;
const W1: usize = 2;
const RX1: usize = 3;
const RY1: usize = 4;
const RZ1: usize = 5;
const U2: usize = 6;
const V2: usize = 7;
const W2: usize = 8;
const RX2: usize = 9;
const RY2: usize = 10;
const RZ2: usize = 11;

#[derive(Debug, Clone, Copy, Default)]
pub struct BeamFormulation;

/// Hermite cubics at s = (1 + ξ) / 2, for an element of length `l`
struct Hermite {
    values: [f64; 4],
    /// d/dx
    slopes: [f64; 4],
    /// d²/dx²
    curvatures: [f64; 4],
}

impl Hermite {
    fn at(xi: f64, l: f64) -> Self {
        let s = 0.5 * (1.0 + xi);
        let (s2, s3) = (s * s, s * s * s);
        Self {
            values: [
                1.0 - 3.0 * s2 + 2.0 * s3,
                l * (s - 2.0 * s2 + s3),
                3.0 * s2 - 2.0 * s3,
                l * (-s2 + s3),
            ],
            slopes: [
                (-6.0 * s + 6.0 * s2) / l,
                1.0 - 4.0 * s + 3.0 * s2,
                (6.0 * s - 6.0 * s2) / l,
                -2.0 * s + 3.0 * s2,
            ],
            curvatures: [
                (-6.0 + 12.0 * s) / (l * l),
                (-4.0 + 6.0 * s) / l,
                (6.0 - 12.0 * s) / (l * l),
                (-2.0 + 6.0 * s) / l,
            ],
        }
    }
}

fn beam_section(element: &Element) -> Result<&BeamSection> {
    match element.section() {
        fem_model::Section::Beam(section) => Ok(section),
        other => Err(StiffnessError::InvalidArgument(format!(
            "beam formulation cannot use a {} section (element {})",
            other.name(),
            element.id()
        ))),
    }
}

fn set_sym(k: &mut SMatrix<f64, 12, 12>, i: usize, j: usize, value: f64) {
    k[(i, j)] = value;
    k[(j, i)] = value;
}

impl BeamFormulation {
    /// 12×12 local stiffness in node-major (X, Y, Z, XX, YY, ZZ) order
    fn local_matrix(&self, element: &Element) -> Result<SMatrix<f64, 12, 12>> {
        let section = beam_section(element)?;
        let l = line_length(element)?;
        let e = element.material().require_elastic_modulus()?;
        let g = element.material().require_shear_modulus()?;

        let l2 = l * l;
        let l3 = l2 * l;
        let mut k = SMatrix::<f64, 12, 12>::zeros();

        // Axial
        let k_axial = e * section.area / l;
        set_sym(&mut k, U1, U1, k_axial);
        set_sym(&mut k, U1, U2, -k_axial);
        set_sym(&mut k, U2, U2, k_axial);

        // Bending in the x-y plane (v, θz), about local z
        let ei = e * section.izz;
        set_sym(&mut k, V1, V1, 12.0 * ei / l3);
        set_sym(&mut k, V1, RZ1, 6.0 * ei / l2);
        set_sym(&mut k, V1, V2, -12.0 * ei / l3);
        set_sym(&mut k, V1, RZ2, 6.0 * ei / l2);
        set_sym(&mut k, RZ1, RZ1, 4.0 * ei / l);
        set_sym(&mut k, RZ1, V2, -6.0 * ei / l2);
        set_sym(&mut k, RZ1, RZ2, 2.0 * ei / l);
        set_sym(&mut k, V2, V2, 12.0 * ei / l3);
        set_sym(&mut k, V2, RZ2, -6.0 * ei / l2);
        set_sym(&mut k, RZ2, RZ2, 4.0 * ei / l);

        // Bending in the x-z plane (w, θy), about local y
        let ei = e * section.iyy;
        set_sym(&mut k, W1, W1, 12.0 * ei / l3);
        set_sym(&mut k, W1, RY1, -6.0 * ei / l2);
        set_sym(&mut k, W1, W2, -12.0 * ei / l3);
        set_sym(&mut k, W1, RY2, -6.0 * ei / l2);
        set_sym(&mut k, RY1, RY1, 4.0 * ei / l);
        set_sym(&mut k, RY1, W2, 6.0 * ei / l2);
        set_sym(&mut k, RY1, RY2, 2.0 * ei / l);
        set_sym(&mut k, W2, W2, 12.0 * ei / l3);
        set_sym(&mut k, W2, RY2, 6.0 * ei / l2);
        set_sym(&mut k, RY2, RY2, 4.0 * ei / l);

        // Torsion
        let k_torsion = g * section.torsion_constant / l;
        set_sym(&mut k, RX1, RX1, k_torsion);
        set_sym(&mut k, RX1, RX2, -k_torsion);
        set_sym(&mut k, RX2, RX2, k_torsion);

        Ok(k)
    }
}

impl ElementFormulation for BeamFormulation {
    fn name(&self) -> &'static str {
        "beam"
    }

    fn local_stiffness(&self, element: &Element) -> Result<StiffnessMatrix> {
        let k = self.local_matrix(element)?;
        let keys = element.node_dofs();
        let dense = DMatrix::from_column_slice(12, 12, k.as_slice());
        StiffnessMatrix::try_from(KeyedMatrix::from_dense(keys.clone(), keys, dense)?)
    }

    fn shape_function_matrix(&self, element: &Element, natural: &[f64]) -> Result<KeyedMatrix<Dof, NodeDof>> {
        let [xi] = natural_coordinates::<1>(natural)?;
        let l = line_length(element)?;
        let h = Hermite::at(xi, l);
        let linear = [0.5 * (1.0 - xi), 0.5 * (1.0 + xi)];

        let mut n = DMatrix::zeros(6, 12);
        // Axial and twist, linear
        for (node, value) in linear.into_iter().enumerate() {
            n[(0, U1 + 6 * node)] = value;
            n[(3, RX1 + 6 * node)] = value;
        }
        // v = H1 v1 + H2 θz1 + H3 v2 + H4 θz2, θz = dv/dx
        for (col, sign, i) in [(V1, 1.0, 0), (RZ1, 1.0, 1), (V2, 1.0, 2), (RZ2, 1.0, 3)] {
            n[(1, col)] = sign * h.values[i];
            n[(5, col)] = sign * h.slopes[i];
        }
        // w = H1 w1 - H2 θy1 + H3 w2 - H4 θy2, θy = -dw/dx
        for (col, sign, i) in [(W1, 1.0, 0), (RY1, -1.0, 1), (W2, 1.0, 2), (RY2, -1.0, 3)] {
            n[(2, col)] = sign * h.values[i];
            n[(4, col)] = -sign * h.slopes[i];
        }

        KeyedMatrix::from_dense(Dof::ALL, element.node_dofs(), n)
    }

    fn strain_displacement_matrix(
        &self,
        element: &Element,
        natural: &[f64],
    ) -> Result<KeyedMatrix<StrainComponent, NodeDof>> {
        let [xi] = natural_coordinates::<1>(natural)?;
        let l = line_length(element)?;
        let h = Hermite::at(xi, l);

        let mut b = DMatrix::zeros(4, 12);
        b[(0, U1)] = -1.0 / l;
        b[(0, U2)] = 1.0 / l;
        // Curvature about y is -d²w/dx²
        for (col, sign, i) in [(W1, -1.0, 0), (RY1, 1.0, 1), (W2, -1.0, 2), (RY2, 1.0, 3)] {
            b[(1, col)] = sign * h.curvatures[i];
        }
        for (col, i) in [(V1, 0), (RZ1, 1), (V2, 2), (RZ2, 3)] {
            b[(2, col)] = h.curvatures[i];
        }
        b[(3, RX1)] = -1.0 / l;
        b[(3, RX2)] = 1.0 / l;

        KeyedMatrix::from_dense(BEAM_STRAINS, element.node_dofs(), b)
    }
}
