//! Error types for fem-stiffness

use crate::builder::Frame;
use fem_model::{ElementId, ElementKind, ModelError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StiffnessError>;

#[derive(Error, Debug)]
pub enum StiffnessError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Key out of range: {0}")]
    OutOfRange(String),

    #[error("{frame} stiffness of {kind} element {element} is not singular (singular value ratio {ratio:e})")]
    NotSingular {
        element: ElementId,
        kind: ElementKind,
        frame: Frame,
        ratio: f64,
    },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl StiffnessError {
    /// Malformed input: bad keys, bad axes, unregistered element kinds
    /// and invalid element definitions
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            StiffnessError::InvalidArgument(_) | StiffnessError::Model(_) | StiffnessError::Config(_)
        )
    }

    /// Misuse of a builder or a violated stiffness invariant
    pub fn is_invalid_operation(&self) -> bool {
        matches!(
            self,
            StiffnessError::InvalidOperation(_) | StiffnessError::NotSingular { .. }
        )
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, StiffnessError::OutOfRange(_))
    }
}
