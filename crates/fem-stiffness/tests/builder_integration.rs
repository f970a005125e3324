/// Integration tests for the builder protocol: caching, invalidation,
/// frame invariance and the singularity checks on every element family.
use approx::assert_relative_eq;
use fem_model::{
    BeamSection, Dof, Element, ElementKind, Material, Node, NodeDof, NodeId, PlateSection, Section,
    SharedElement, TrussSection,
};
use fem_stiffness::builder::singularity_ratio;
use fem_stiffness::{
    BuilderConfig, BuilderState, ElementFormulation, ElementStiffnessBuilder, FactoryBuilder, Frame,
    KeyedMatrix, PlateFormulation, StiffnessBuilder, StiffnessError, StiffnessBuilderFactory,
    StiffnessMatrix, StrainComponent,
};
use std::sync::Arc;

fn steel() -> Material {
    Material::elastic("STEEL", 200e9, 0.3)
}

fn beam(a: [f64; 3], b: [f64; 3]) -> SharedElement {
    Element::beam(
        1,
        [Node::new(1, a[0], a[1], a[2]), Node::new(2, b[0], b[1], b[2])],
        steel(),
        BeamSection::rectangular(0.1, 0.2),
    )
    .unwrap()
    .into_shared()
}

fn plate(corners: [[f64; 3]; 4]) -> SharedElement {
    let nodes = [0, 1, 2, 3].map(|i| Node::new(i as u32 + 1, corners[i][0], corners[i][1], corners[i][2]));
    Element::plate(7, nodes, steel(), PlateSection::new(0.02))
        .unwrap()
        .into_shared()
}

fn assert_symmetric_and_singular(k: &StiffnessMatrix) {
    assert!(k.is_symmetric(1e-10), "stiffness is not symmetric");
    let ratio = singularity_ratio(k);
    assert!(ratio <= 1e-12, "singular value ratio {ratio:e} is not zero");
}

#[test]
fn repeated_reads_share_one_matrix() {
    let factory = StiffnessBuilderFactory::new();
    let mut builder = factory.create(beam([0.0; 3], [1.0, 1.0, 0.0])).unwrap();
    assert_eq!(builder.state(), BuilderState::Stale);

    let first = builder.global_stiffness().unwrap();
    let value = builder.global_stiffness_at(NodeId(1), Dof::Y, NodeId(2), Dof::Y).unwrap();
    let second = builder.global_stiffness().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(value, first.at(NodeId(1), Dof::Y, NodeId(2), Dof::Y).unwrap());
    assert_eq!(builder.state(), BuilderState::Valid);
}

#[test]
fn material_change_forces_recomputation() {
    let element = beam([0.0; 3], [2.0, 0.0, 0.0]);
    let mut builder = StiffnessBuilderFactory::new().create(Arc::clone(&element)).unwrap();
    let before = builder.global_stiffness().unwrap();

    element.write().set_material(Material::elastic("ALU", 70e9, 0.33));
    assert!(builder.is_stale());

    let after = builder.global_stiffness().unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_relative_eq!(
        after.at(NodeId(1), Dof::X, NodeId(1), Dof::X).unwrap() / before.at(NodeId(1), Dof::X, NodeId(1), Dof::X).unwrap(),
        70.0 / 200.0,
        max_relative = 1e-12
    );
}

#[test]
fn section_change_on_shared_element_invalidates_every_builder() {
    let element = Element::truss(
        2,
        [Node::new(1, 0.0, 0.0, 0.0), Node::new(2, 1.0, 0.0, 0.0)],
        steel(),
        TrussSection::new(0.01),
    )
    .unwrap()
    .into_shared();
    let factory = StiffnessBuilderFactory::new();
    let mut first = factory.create(Arc::clone(&element)).unwrap();
    let mut second = factory.create(Arc::clone(&element)).unwrap();
    first.global_stiffness().unwrap();
    second.global_stiffness().unwrap();

    element.write().set_section(Section::Truss(TrussSection::new(0.02))).unwrap();
    assert!(first.is_stale() && second.is_stale());

    let k1 = first.global_stiffness_at(NodeId(1), Dof::X, NodeId(1), Dof::X).unwrap();
    let k2 = second.global_stiffness_at(NodeId(1), Dof::X, NodeId(1), Dof::X).unwrap();
    assert_relative_eq!(k1, 200e9 * 0.02);
    assert_eq!(k1, k2);
}

#[test]
fn identity_triad_leaves_local_matrix_unchanged() {
    let factory = StiffnessBuilderFactory::new();
    let aligned = [
        beam([0.0; 3], [3.0, 0.0, 0.0]),
        plate([[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 1.0, 0.0], [0.0, 1.0, 0.0]]),
    ];
    for element in aligned {
        let mut builder = factory.create(element).unwrap();
        let local = builder.local_stiffness().unwrap();
        let global = builder.global_stiffness().unwrap();
        let diff = global.keyed().sub(local.keyed()).unwrap();
        assert!(diff.max_abs() <= 1e-12 * local.max_abs());
    }
}

#[test]
fn every_family_is_singular_in_both_frames() {
    let factory = StiffnessBuilderFactory::new();
    let elements = [
        beam([0.0; 3], [1.0, 2.0, 3.0]),
        beam([1.0, 1.0, 1.0], [1.0, 1.0, 4.0]),
        plate([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.2, 0.9, 0.0], [0.1, 1.1, 0.0]]),
        // Plate standing in the global x-z plane
        plate([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]]),
    ];
    for element in elements {
        let mut builder = factory.create(element).unwrap();
        assert_symmetric_and_singular(&builder.local_stiffness().unwrap());
        assert_symmetric_and_singular(&builder.global_stiffness().unwrap());
    }
}

#[test]
fn vertical_plate_resists_out_of_plane_translation_nothing() {
    let element = plate([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]]);
    let mut builder = StiffnessBuilderFactory::new().create(element).unwrap();
    let k = builder.global_stiffness().unwrap();

    // Rigid translation along the plate normal (global y)
    let mut u = fem_stiffness::KeyedVector::zeros(k.node_dofs().to_vec()).unwrap();
    for key in k.node_dofs() {
        if key.dof == Dof::Y {
            u.set(key, 1.0).unwrap();
        }
    }
    let f = k.nodal_forces(&u).unwrap();
    assert!(f.norm() <= 1e-9 * k.max_abs());
}

#[test]
fn strict_tolerance_rejects_nothing_for_correct_elements() {
    let config = BuilderConfig::from_json_str(r#"{ "singularity_tolerance": 1e-12 }"#).unwrap();
    let factory = StiffnessBuilderFactory::with_config(config);
    let mut builder = factory.create(beam([0.0; 3], [0.0, 0.0, 2.0])).unwrap();
    assert!(builder.global_stiffness().is_ok());
}

#[test]
fn collapsed_geometry_fails_without_caching() {
    let element = beam([0.0; 3], [1.0, 0.0, 0.0]);
    let mut builder = StiffnessBuilderFactory::new().create(Arc::clone(&element)).unwrap();
    element.write().set_node_position(NodeId(2), 0.0, 0.0, 0.0).unwrap();

    let err = builder.global_stiffness().unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(builder.cached_global_stiffness().is_none());
    assert_eq!(builder.state(), BuilderState::Stale);
}

/// Plate formulation with a small diagonal shift: well scaled, full rank
#[derive(Debug)]
struct StiffenedPlate;

impl ElementFormulation for StiffenedPlate {
    fn name(&self) -> &'static str {
        "stiffened plate"
    }

    fn local_stiffness(&self, element: &Element) -> fem_stiffness::Result<StiffnessMatrix> {
        let mut k = PlateFormulation.local_stiffness(element)?;
        let shift = 1e-3 * k.max_abs();
        for key in element.node_dofs() {
            let diagonal = k.at(key.node, key.dof, key.node, key.dof)?;
            k.set_symmetric(key, key, diagonal + shift)?;
        }
        Ok(k)
    }

    fn shape_function_matrix(
        &self,
        element: &Element,
        natural: &[f64],
    ) -> fem_stiffness::Result<KeyedMatrix<Dof, NodeDof>> {
        PlateFormulation.shape_function_matrix(element, natural)
    }

    fn strain_displacement_matrix(
        &self,
        element: &Element,
        natural: &[f64],
    ) -> fem_stiffness::Result<KeyedMatrix<StrainComponent, NodeDof>> {
        PlateFormulation.strain_displacement_matrix(element, natural)
    }
}

fn stiffened_plate_builder(element: SharedElement, config: BuilderConfig) -> Box<dyn ElementStiffnessBuilder> {
    Box::new(StiffnessBuilder::bound(StiffenedPlate, element, config))
}

#[test]
fn full_rank_plate_is_rejected_before_rotation() {
    let factory = FactoryBuilder::standard()
        .register(ElementKind::Plate, stiffened_plate_builder)
        .build();
    // Tilted plate, so the global frame differs from the local one
    let element = plate([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]]);
    let mut builder = factory.create(element).unwrap();

    let local = builder.local_stiffness().unwrap();
    assert!(singularity_ratio(&local) > 1e-6);

    match builder.global_stiffness().unwrap_err() {
        StiffnessError::NotSingular { element, kind, frame, .. } => {
            assert_eq!(element.0, 7);
            assert_eq!(kind, ElementKind::Plate);
            assert_eq!(frame, Frame::Local);
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(builder.cached_global_stiffness().is_none());
}

#[test]
fn rotation_keeps_a_full_rank_plate_full_rank() {
    let element = plate([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]]);
    let element = element.read();
    let local = StiffenedPlate.local_stiffness(&element).unwrap();

    let transform = fem_stiffness::builder::rotation::element_transform(&element).unwrap();
    let global = transform
        .transpose()
        .multiply(local.keyed())
        .unwrap()
        .multiply(&transform)
        .unwrap();
    let global = StiffnessMatrix::try_from(global).unwrap();
    assert!(singularity_ratio(&global) > 1e-6);
    assert!((singularity_ratio(&global) - singularity_ratio(&local)).abs() < 1e-9);
}
