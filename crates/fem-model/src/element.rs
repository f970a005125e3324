//! Structural elements: connectivity, material, section, local triad and
//! the revision counter used to detect changes.

use crate::dof::{Dof, NodeDof};
use crate::error::{ModelError, Result};
use crate::material::Material;
use crate::node::{Node, NodeId};
use crate::section::{BeamSection, PlateSection, Section, SpringSection, TrussSection};
use nalgebra::{DVector, Vector3};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Element shared between builders. Readers take the read lock for the
/// duration of a build; mutation takes the write lock.
pub type SharedElement = Arc<RwLock<Element>>;

/// Element identity
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Element type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// 2-node axial truss
    Truss,
    /// 2-node axial spring with prescribed stiffness
    Spring,
    /// 2-node Euler-Bernoulli beam
    Beam,
    /// 4-node quadrilateral plate
    Plate,
}

const LINE_DOFS: [Dof; 3] = Dof::TRANSLATIONS;
const BEAM_DOFS: [Dof; 6] = Dof::ALL;
const PLATE_DOFS: [Dof; 5] = [Dof::X, Dof::Y, Dof::Z, Dof::XX, Dof::YY];

impl ElementKind {
    pub const ALL: [ElementKind; 4] = [
        ElementKind::Truss,
        ElementKind::Spring,
        ElementKind::Beam,
        ElementKind::Plate,
    ];

    /// Get the number of nodes for this element type
    pub fn num_nodes(&self) -> usize {
        match self {
            ElementKind::Truss | ElementKind::Spring | ElementKind::Beam => 2,
            ElementKind::Plate => 4,
        }
    }

    /// Degrees of freedom carried at every node, in key order
    pub fn dofs(&self) -> &'static [Dof] {
        match self {
            ElementKind::Truss | ElementKind::Spring => &LINE_DOFS,
            ElementKind::Beam => &BEAM_DOFS,
            // No drilling freedom
            ElementKind::Plate => &PLATE_DOFS,
        }
    }

    pub fn is_line(&self) -> bool {
        self.num_nodes() == 2
    }

    pub fn has_rotations(&self) -> bool {
        self.dofs().iter().any(|dof| dof.is_rotation())
    }

    fn accepts(&self, section: &Section) -> bool {
        matches!(
            (self, section),
            (ElementKind::Truss, Section::Truss(_))
                | (ElementKind::Spring, Section::Spring(_))
                | (ElementKind::Beam, Section::Beam(_))
                | (ElementKind::Plate, Section::Plate(_))
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ElementKind::Truss => "truss",
            ElementKind::Spring => "spring",
            ElementKind::Beam => "beam",
            ElementKind::Plate => "plate",
        };
        f.write_str(label)
    }
}

impl FromStr for ElementKind {
    type Err = ModelError;

    /// Accepts the plain names and the CalculiX type labels
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "TRUSS" | "T3D2" => Ok(ElementKind::Truss),
            "SPRING" | "SPRINGA" => Ok(ElementKind::Spring),
            "BEAM" | "B31" | "B31R" => Ok(ElementKind::Beam),
            "PLATE" | "S4" | "S4R" => Ok(ElementKind::Plate),
            other => Err(ModelError::InvalidElement(format!(
                "unknown element type '{}'",
                other
            ))),
        }
    }
}

/// Monotonically increasing element state token. Values are drawn from a
/// process-wide counter, so two different states never share a revision
/// even across elements.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct Revision(u64);

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

impl Revision {
    fn next() -> Self {
        Revision(NEXT_REVISION.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A structural finite element
#[derive(Debug, Clone)]
pub struct Element {
    id: ElementId,
    kind: ElementKind,
    nodes: Vec<Node>,
    material: Material,
    section: Section,
    orientation: Option<Vector3<f64>>,
    revision: Revision,
}

impl Element {
    /// Create an element, checking node count, node uniqueness and that
    /// the section matches the kind
    pub fn new(
        id: u32,
        kind: ElementKind,
        nodes: Vec<Node>,
        material: Material,
        section: Section,
    ) -> Result<Self> {
        if nodes.len() != kind.num_nodes() {
            return Err(ModelError::InvalidElement(format!(
                "{} element {} requires exactly {} nodes, got {}",
                kind,
                id,
                kind.num_nodes(),
                nodes.len()
            )));
        }
        for (i, node) in nodes.iter().enumerate() {
            if nodes[..i].iter().any(|other| other.id == node.id) {
                return Err(ModelError::InvalidElement(format!(
                    "{} element {} references node {} twice",
                    kind, id, node.id
                )));
            }
        }
        Self::check_section(ElementId(id), kind, &section)?;

        Ok(Self {
            id: ElementId(id),
            kind,
            nodes,
            material,
            section,
            orientation: None,
            revision: Revision::next(),
        })
    }

    pub fn truss(id: u32, nodes: [Node; 2], material: Material, section: TrussSection) -> Result<Self> {
        Self::new(id, ElementKind::Truss, nodes.to_vec(), material, Section::Truss(section))
    }

    pub fn spring(id: u32, nodes: [Node; 2], section: SpringSection) -> Result<Self> {
        Self::new(
            id,
            ElementKind::Spring,
            nodes.to_vec(),
            Material::new("SPRING"),
            Section::Spring(section),
        )
    }

    pub fn beam(id: u32, nodes: [Node; 2], material: Material, section: BeamSection) -> Result<Self> {
        Self::new(id, ElementKind::Beam, nodes.to_vec(), material, Section::Beam(section))
    }

    /// Nodes must be given in counter-clockwise order
    pub fn plate(id: u32, nodes: [Node; 4], material: Material, section: PlateSection) -> Result<Self> {
        Self::new(id, ElementKind::Plate, nodes.to_vec(), material, Section::Plate(section))
    }

    /// Wrap the element for sharing between builders
    pub fn into_shared(self) -> SharedElement {
        Arc::new(RwLock::new(self))
    }

    fn check_section(id: ElementId, kind: ElementKind, section: &Section) -> Result<()> {
        if !kind.accepts(section) {
            return Err(ModelError::InvalidElement(format!(
                "{} element {} cannot use a {} section",
                kind,
                id,
                section.name()
            )));
        }
        section.validate()
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn section(&self) -> &Section {
        &self.section
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Whether `dof` is carried by this element at `node`
    pub fn supports(&self, node: NodeId, dof: Dof) -> bool {
        self.nodes.iter().any(|n| n.id == node) && self.kind.dofs().contains(&dof)
    }

    /// All node/DOF keys of the element, node by node in connectivity order
    pub fn node_dofs(&self) -> Vec<NodeDof> {
        self.nodes
            .iter()
            .flat_map(|node| self.kind.dofs().iter().map(move |&dof| NodeDof::new(node.id, dof)))
            .collect()
    }

    /// Distance between the first two nodes (the element length for line elements)
    pub fn length(&self) -> f64 {
        self.nodes[0].vector_to(&self.nodes[1]).norm()
    }

    /// Local coordinate triad (x, y, z), mutually orthogonal but not
    /// normalized. Degenerate geometry yields zero-length axes.
    ///
    /// Line elements take x from node 1 to node 2 and fix the x-y plane
    /// with the orientation vector, defaulting to global X (or global Y
    /// when the element is nearly parallel to X). Plates take z from the
    /// cross product of the diagonals and y perpendicular to z and the
    /// first edge.
    pub fn local_axes(&self) -> [DVector<f64>; 3] {
        let (x, y, z) = if self.kind.is_line() {
            let x = self.nodes[0].vector_to(&self.nodes[1]);
            let reference = self.orientation.unwrap_or_else(|| {
                if x.x.abs() < 0.9 * x.norm() {
                    Vector3::x()
                } else {
                    Vector3::y()
                }
            });
            let z = x.cross(&reference);
            let y = z.cross(&x);
            (x, y, z)
        } else {
            let edge = self.nodes[0].vector_to(&self.nodes[1]);
            let diag1 = self.nodes[0].vector_to(&self.nodes[2]);
            let diag2 = self.nodes[1].vector_to(&self.nodes[3]);
            let z = diag1.cross(&diag2);
            let y = z.cross(&edge);
            let x = y.cross(&z);
            (x, y, z)
        };

        [to_dvector(&x), to_dvector(&y), to_dvector(&z)]
    }

    pub fn set_node_position(&mut self, node: NodeId, x: f64, y: f64, z: f64) -> Result<()> {
        let target = self
            .nodes
            .iter_mut()
            .find(|n| n.id == node)
            .ok_or_else(|| {
                ModelError::InvalidElement(format!("element {} has no node {}", self.id, node))
            })?;
        target.x = x;
        target.y = y;
        target.z = z;
        self.touch();
        Ok(())
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
        self.touch();
    }

    pub fn set_section(&mut self, section: Section) -> Result<()> {
        Self::check_section(self.id, self.kind, &section)?;
        self.section = section;
        self.touch();
        Ok(())
    }

    /// Orientation vector lying in the local x-y plane of a line element
    pub fn set_orientation(&mut self, orientation: Option<Vector3<f64>>) {
        self.orientation = orientation;
        self.touch();
    }

    fn touch(&mut self) {
        self.revision = Revision::next();
    }
}

fn to_dvector(v: &Vector3<f64>) -> DVector<f64> {
    DVector::from_column_slice(v.as_slice())
}
