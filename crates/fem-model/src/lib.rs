//! Structural element model shared by the stiffness builders.
//!
//! Nodes, the degree-of-freedom vocabulary, material and section values,
//! and the [`Element`] type whose revision counter lets builders detect
//! changes to geometry, material or section.

pub mod dof;
pub mod element;
pub mod error;
pub mod material;
pub mod node;
pub mod section;

pub use dof::{Dof, NodeDof};
pub use element::{Element, ElementId, ElementKind, Revision, SharedElement};
pub use error::{ModelError, Result};
pub use material::Material;
pub use node::{Node, NodeId};
pub use section::{BeamSection, PlateSection, Section, SpringSection, TrussSection};
