//! Element stiffness builder protocol.
//!
//! An [`ElementFormulation`] supplies the family-specific numerics in the
//! element's local frame. [`StiffnessBuilder`] wraps a formulation and one
//! element: it rotates the local matrix into the global frame as
//! `Tᵀ · K · T`, checks that both matrices are singular, and caches the
//! result against the element revision it was computed from.
//!
//! Singularity is judged by rank rather than by determinant: the ratio of
//! the smallest to the largest singular value must not exceed the
//! configured tolerance. Determinants of 12×12 or 20×20 element matrices
//! underflow towards zero whether or not a rigid-body mode exists.
//!
//! Builder states:
//!
//! ```text
//! Uninitialized --initialize--> Stale <--element revision changes-- Valid
//!                                 |                                  ^
//!                                 +--------- global_stiffness -------+
//! ```

pub mod rotation;

use crate::config::BuilderConfig;
use crate::error::{Result, StiffnessError};
use crate::keyed::KeyedMatrix;
use crate::stiffness_matrix::StiffnessMatrix;
use crate::strain::StrainComponent;
use fem_model::{Dof, Element, NodeDof, NodeId, Revision, SharedElement};
use log::{debug, trace, warn};
use std::fmt;
use std::sync::Arc;

/// Coordinate frame a stiffness matrix is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Local,
    Global,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Local => f.write_str("local"),
            Frame::Global => f.write_str("global"),
        }
    }
}

/// Family-specific numeric routines, all expressed in the element's local
/// frame and keyed by [`Element::node_dofs`] order.
pub trait ElementFormulation: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn local_stiffness(&self, element: &Element) -> Result<StiffnessMatrix>;

    /// Interpolation of the displacement field at natural coordinates
    fn shape_function_matrix(&self, element: &Element, natural: &[f64]) -> Result<KeyedMatrix<Dof, NodeDof>>;

    /// Generalized strains from nodal displacements at natural coordinates
    fn strain_displacement_matrix(
        &self,
        element: &Element,
        natural: &[f64],
    ) -> Result<KeyedMatrix<StrainComponent, NodeDof>>;
}

/// Capability interface returned by the factory
pub trait ElementStiffnessBuilder: Send + fmt::Debug {
    fn formulation_name(&self) -> &'static str;

    fn state(&self) -> BuilderState;

    /// The bound element; fails while uninitialized
    fn element(&self) -> Result<&SharedElement>;

    fn local_stiffness(&self) -> Result<StiffnessMatrix>;

    fn shape_function_matrix(&self, natural: &[f64]) -> Result<KeyedMatrix<Dof, NodeDof>>;

    fn strain_displacement_matrix(&self, natural: &[f64]) -> Result<KeyedMatrix<StrainComponent, NodeDof>>;

    /// Local-to-global transform `T` for the current element geometry
    fn rotation_transform(&self) -> Result<KeyedMatrix<NodeDof, NodeDof>>;

    /// Global stiffness, rebuilt first if stale
    fn global_stiffness(&mut self) -> Result<Arc<StiffnessMatrix>>;

    /// Last successfully built matrix, whether or not it is still valid
    fn cached_global_stiffness(&self) -> Option<Arc<StiffnessMatrix>>;

    fn global_stiffness_at(&mut self, row_node: NodeId, row_dof: Dof, col_node: NodeId, col_dof: Dof) -> Result<f64> {
        self.global_stiffness()?.at(row_node, row_dof, col_node, col_dof)
    }

    fn is_stale(&self) -> bool {
        self.state() != BuilderState::Valid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// No element bound yet
    Uninitialized,
    /// Element bound; nothing cached or the element changed since
    Stale,
    /// Cached matrix matches the element's current revision
    Valid,
}

#[derive(Debug)]
struct CachedStiffness {
    revision: Revision,
    matrix: Arc<StiffnessMatrix>,
}

/// Generic builder driving one formulation for one element
#[derive(Debug)]
pub struct StiffnessBuilder<F: ElementFormulation> {
    formulation: F,
    element: Option<SharedElement>,
    config: BuilderConfig,
    cache: Option<CachedStiffness>,
}

impl<F: ElementFormulation> StiffnessBuilder<F> {
    /// Builder with no element bound
    pub fn new(formulation: F, config: BuilderConfig) -> Self {
        Self {
            formulation,
            element: None,
            config,
            cache: None,
        }
    }

    /// Builder bound to `element`
    pub fn bound(formulation: F, element: SharedElement, config: BuilderConfig) -> Self {
        let mut builder = Self::new(formulation, config);
        builder.initialize(element);
        builder
    }

    /// Bind `element`, discarding anything cached for a previous element
    pub fn initialize(&mut self, element: SharedElement) {
        self.element = Some(element);
        self.cache = None;
    }

    pub fn formulation(&self) -> &F {
        &self.formulation
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    fn bound_element(&self) -> Result<&SharedElement> {
        self.element.as_ref().ok_or_else(|| {
            StiffnessError::InvalidOperation(format!(
                "{} stiffness builder used before an element was bound",
                self.formulation.name()
            ))
        })
    }

    fn build(&self, element: &Element) -> Result<StiffnessMatrix> {
        let local = self.formulation.local_stiffness(element)?;
        ensure_singular(&local, element, Frame::Local, self.config.singularity_tolerance)?;

        let rotation = rotation::axis_rotation(&element.local_axes())?;
        if element.kind().has_rotations() && !rotation::is_identity(&rotation, self.config.alignment_tolerance) {
            warn!(
                "{} element {} is not aligned with the global axes; its rotational freedoms are not rotated",
                element.kind(),
                element.id()
            );
        }
        let transform = rotation::expand_rotation(&rotation, element)?;

        let global = transform
            .transpose()
            .multiply(local.keyed())?
            .multiply(&transform)?;
        let global = StiffnessMatrix::try_from(global)?;

        ensure_singular(&global, element, Frame::Global, self.config.singularity_tolerance)?;
        Ok(global)
    }
}

impl<F: ElementFormulation> ElementStiffnessBuilder for StiffnessBuilder<F> {
    fn formulation_name(&self) -> &'static str {
        self.formulation.name()
    }

    fn state(&self) -> BuilderState {
        let Some(element) = &self.element else {
            return BuilderState::Uninitialized;
        };
        match &self.cache {
            Some(cache) if cache.revision == element.read().revision() => BuilderState::Valid,
            _ => BuilderState::Stale,
        }
    }

    fn element(&self) -> Result<&SharedElement> {
        self.bound_element()
    }

    fn local_stiffness(&self) -> Result<StiffnessMatrix> {
        let element = self.bound_element()?.read();
        self.formulation.local_stiffness(&element)
    }

    fn shape_function_matrix(&self, natural: &[f64]) -> Result<KeyedMatrix<Dof, NodeDof>> {
        let element = self.bound_element()?.read();
        self.formulation.shape_function_matrix(&element, natural)
    }

    fn strain_displacement_matrix(&self, natural: &[f64]) -> Result<KeyedMatrix<StrainComponent, NodeDof>> {
        let element = self.bound_element()?.read();
        self.formulation.strain_displacement_matrix(&element, natural)
    }

    fn rotation_transform(&self) -> Result<KeyedMatrix<NodeDof, NodeDof>> {
        let element = self.bound_element()?.read();
        rotation::element_transform(&element)
    }

    fn global_stiffness(&mut self) -> Result<Arc<StiffnessMatrix>> {
        let shared = Arc::clone(self.bound_element()?);
        let element = shared.read();

        if let Some(cache) = &self.cache {
            if cache.revision == element.revision() {
                trace!("stiffness cache hit for element {} ({})", element.id(), cache.revision);
                return Ok(Arc::clone(&cache.matrix));
            }
        }

        debug!(
            "building {} stiffness for {} element {} at {}",
            self.formulation.name(),
            element.kind(),
            element.id(),
            element.revision()
        );
        let matrix = Arc::new(self.build(&element)?);
        self.cache = Some(CachedStiffness {
            revision: element.revision(),
            matrix: Arc::clone(&matrix),
        });
        Ok(matrix)
    }

    fn cached_global_stiffness(&self) -> Option<Arc<StiffnessMatrix>> {
        self.cache.as_ref().map(|cache| Arc::clone(&cache.matrix))
    }
}

/// Smallest singular value of `matrix` relative to its largest one
///
/// Zero means rank deficient. A zero matrix has ratio zero; a matrix with
/// non-finite entries has an infinite ratio.
pub fn singularity_ratio(matrix: &StiffnessMatrix) -> f64 {
    let dense = matrix.as_dense();
    if dense.iter().any(|v| !v.is_finite()) {
        return f64::INFINITY;
    }
    if dense.is_empty() || matrix.max_abs() == 0.0 {
        return 0.0;
    }
    let sigma = dense.singular_values();
    sigma.min() / sigma.max()
}

fn ensure_singular(matrix: &StiffnessMatrix, element: &Element, frame: Frame, tolerance: f64) -> Result<()> {
    let ratio = singularity_ratio(matrix);
    if !(ratio <= tolerance) {
        return Err(StiffnessError::NotSingular {
            element: element.id(),
            kind: element.kind(),
            frame,
            ratio,
        });
    }
    Ok(())
}
