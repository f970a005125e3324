//! Builder factory.
//!
//! Maps each [`ElementKind`] to the constructor of its stiffness builder so
//! callers can work with elements polymorphically without knowing which
//! formulation sits behind them. The mapping is fixed once the factory is
//! built; [`FactoryBuilder`] allows a restricted or overridden mapping.

use crate::builder::{ElementStiffnessBuilder, StiffnessBuilder};
use crate::config::BuilderConfig;
use crate::elements::{BeamFormulation, PlateFormulation, TrussFormulation};
use crate::error::{Result, StiffnessError};
use fem_model::{ElementKind, SharedElement};
use log::debug;
use std::collections::HashMap;

/// Constructs a builder bound to an element
pub type BuilderConstructor = fn(SharedElement, BuilderConfig) -> Box<dyn ElementStiffnessBuilder>;

fn truss_builder(element: SharedElement, config: BuilderConfig) -> Box<dyn ElementStiffnessBuilder> {
    Box::new(StiffnessBuilder::bound(TrussFormulation, element, config))
}

fn beam_builder(element: SharedElement, config: BuilderConfig) -> Box<dyn ElementStiffnessBuilder> {
    Box::new(StiffnessBuilder::bound(BeamFormulation, element, config))
}

fn plate_builder(element: SharedElement, config: BuilderConfig) -> Box<dyn ElementStiffnessBuilder> {
    Box::new(StiffnessBuilder::bound(PlateFormulation, element, config))
}

/// Registration stage of a factory
#[derive(Debug, Clone, Default)]
pub struct FactoryBuilder {
    constructors: HashMap<ElementKind, BuilderConstructor>,
    config: BuilderConfig,
}

impl FactoryBuilder {
    /// No kinds registered
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every element kind mapped to its standard formulation
    pub fn standard() -> Self {
        Self::empty()
            .register(ElementKind::Truss, truss_builder)
            .register(ElementKind::Spring, truss_builder)
            .register(ElementKind::Beam, beam_builder)
            .register(ElementKind::Plate, plate_builder)
    }

    /// Register or replace the constructor for `kind`
    pub fn register(mut self, kind: ElementKind, constructor: BuilderConstructor) -> Self {
        self.constructors.insert(kind, constructor);
        self
    }

    pub fn unregister(mut self, kind: ElementKind) -> Self {
        self.constructors.remove(&kind);
        self
    }

    pub fn config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// Freeze the mapping
    pub fn build(self) -> StiffnessBuilderFactory {
        let mut kinds: Vec<ElementKind> = self.constructors.keys().copied().collect();
        kinds.sort();
        debug!("stiffness builder factory created for {:?}", kinds);
        StiffnessBuilderFactory {
            constructors: self.constructors,
            config: self.config,
        }
    }
}

/// Immutable element-kind to builder mapping
#[derive(Debug, Clone)]
pub struct StiffnessBuilderFactory {
    constructors: HashMap<ElementKind, BuilderConstructor>,
    config: BuilderConfig,
}

impl StiffnessBuilderFactory {
    /// Standard mapping with the default configuration
    pub fn new() -> Self {
        FactoryBuilder::standard().build()
    }

    /// Standard mapping with `config` handed to every builder
    pub fn with_config(config: BuilderConfig) -> Self {
        FactoryBuilder::standard().config(config).build()
    }

    pub fn builder() -> FactoryBuilder {
        FactoryBuilder::empty()
    }

    /// Create a builder bound to `element`
    pub fn create(&self, element: SharedElement) -> Result<Box<dyn ElementStiffnessBuilder>> {
        let (kind, id) = {
            let guard = element.read();
            (guard.kind(), guard.id())
        };
        let constructor = self.constructors.get(&kind).ok_or_else(|| {
            StiffnessError::InvalidArgument(format!(
                "no stiffness builder registered for {} element {}",
                kind, id
            ))
        })?;
        Ok(constructor(element, self.config))
    }

    pub fn supports(&self, kind: ElementKind) -> bool {
        self.constructors.contains_key(&kind)
    }

    /// Registered kinds in declaration order
    pub fn registered_kinds(&self) -> Vec<ElementKind> {
        ElementKind::ALL
            .into_iter()
            .filter(|kind| self.supports(*kind))
            .collect()
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }
}

impl Default for StiffnessBuilderFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fem_model::{
        BeamSection, Dof, Element, Material, Node, NodeId, PlateSection, SpringSection, TrussSection,
    };

    fn steel() -> Material {
        Material::elastic("STEEL", 210e9, 0.3)
    }

    fn line_nodes() -> [Node; 2] {
        [Node::new(1, 0.0, 0.0, 0.0), Node::new(2, 1.0, 0.0, 0.0)]
    }

    fn all_elements() -> Vec<SharedElement> {
        vec![
            Element::truss(1, line_nodes(), steel(), TrussSection::new(0.01)).unwrap(),
            Element::spring(2, line_nodes(), SpringSection::new(1000.0)).unwrap(),
            Element::beam(3, line_nodes(), steel(), BeamSection::circular(0.05)).unwrap(),
            Element::plate(
                4,
                [
                    Node::new(1, 0.0, 0.0, 0.0),
                    Node::new(2, 1.0, 0.0, 0.0),
                    Node::new(3, 1.0, 1.0, 0.0),
                    Node::new(4, 0.0, 1.0, 0.0),
                ],
                steel(),
                PlateSection::new(0.01),
            )
            .unwrap(),
        ]
        .into_iter()
        .map(Element::into_shared)
        .collect()
    }

    #[test]
    fn standard_factory_covers_every_kind() {
        let factory = StiffnessBuilderFactory::new();
        assert_eq!(factory.registered_kinds(), ElementKind::ALL.to_vec());

        let names: Vec<&str> = all_elements()
            .into_iter()
            .map(|element| {
                let mut builder = factory.create(element).unwrap();
                builder.global_stiffness().unwrap();
                builder.formulation_name()
            })
            .collect();
        assert_eq!(names, ["truss", "truss", "beam", "plate"]);
    }

    #[test]
    fn unregistered_kind_is_invalid_argument() {
        let factory = FactoryBuilder::standard().unregister(ElementKind::Plate).build();
        assert!(!factory.supports(ElementKind::Plate));

        let plate = all_elements().pop().unwrap();
        let err = factory.create(plate).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("plate element 4"));
    }

    #[test]
    fn empty_factory_rejects_everything() {
        let factory = StiffnessBuilderFactory::builder().build();
        assert!(factory.registered_kinds().is_empty());
        for element in all_elements() {
            assert!(factory.create(element).is_err());
        }
    }

    #[test]
    fn override_replaces_constructor() {
        let factory = FactoryBuilder::standard()
            .register(ElementKind::Truss, beam_builder)
            .build();
        let truss = all_elements().remove(0);
        let builder = factory.create(truss).unwrap();
        assert_eq!(builder.formulation_name(), "beam");
    }

    #[test]
    fn builders_inherit_factory_config() {
        let config = BuilderConfig {
            singularity_tolerance: 1e-3,
            ..Default::default()
        };
        let factory = StiffnessBuilderFactory::with_config(config);
        assert_eq!(factory.config().singularity_tolerance, 1e-3);

        let spring = all_elements().remove(1);
        let mut builder = factory.create(spring).unwrap();
        let k = builder.global_stiffness_at(NodeId(1), Dof::X, NodeId(2), Dof::X).unwrap();
        assert_eq!(k, -1000.0);
    }
}
