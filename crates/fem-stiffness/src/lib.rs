//! Keyed element stiffness for structural finite elements.
//!
//! Element stiffness matrices here are addressed by (node, degree of
//! freedom) pairs instead of raw integer positions. The crate provides:
//!
//! - [`KeyedMatrix`] and [`KeyedVector`]: dense storage addressed by domain keys
//! - [`StiffnessMatrix`]: a square keyed matrix over node/DOF keys
//! - the builder protocol ([`ElementStiffnessBuilder`], [`StiffnessBuilder`])
//!   that computes, rotates, checks and caches an element's global stiffness
//! - formulations for trusses, springs, beams and plates
//! - [`StiffnessBuilderFactory`], which picks a builder by element kind
//! - [`GlobalAssembler`], a sparse assembler on top of the per-element layer
//!
//! # Example
//! ```
//! use fem_model::{Dof, Element, Material, Node, NodeId, TrussSection};
//! use fem_stiffness::StiffnessBuilderFactory;
//!
//! let truss = Element::truss(
//!     1,
//!     [Node::new(1, 0.0, 0.0, 0.0), Node::new(2, 2.0, 0.0, 0.0)],
//!     Material::elastic("STEEL", 210e9, 0.3),
//!     TrussSection::new(0.01),
//! )
//! .unwrap();
//!
//! let factory = StiffnessBuilderFactory::new();
//! let mut builder = factory.create(truss.into_shared()).unwrap();
//! let k = builder.global_stiffness_at(NodeId(1), Dof::X, NodeId(2), Dof::X).unwrap();
//! assert_eq!(k, -210e9 * 0.01 / 2.0);
//! ```

pub mod assembly;
pub mod builder;
pub mod config;
pub mod elements;
pub mod error;
pub mod factory;
pub mod keyed;
pub mod stiffness_matrix;
pub mod strain;

pub use assembly::{AssembledStiffness, DofNumbering, GlobalAssembler};
pub use builder::{BuilderState, ElementFormulation, ElementStiffnessBuilder, Frame, StiffnessBuilder};
pub use config::BuilderConfig;
pub use elements::{BeamFormulation, PlateFormulation, TrussFormulation};
pub use error::{Result, StiffnessError};
pub use factory::{BuilderConstructor, FactoryBuilder, StiffnessBuilderFactory};
pub use keyed::{Key, KeyIndex, KeyedMatrix, KeyedVector};
pub use stiffness_matrix::StiffnessMatrix;
pub use strain::StrainComponent;
