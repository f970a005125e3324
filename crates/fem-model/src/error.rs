//! Error types for fem-model

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid element: {0}")]
    InvalidElement(String),

    #[error("Invalid material: {0}")]
    InvalidMaterial(String),

    #[error("Invalid section: {0}")]
    InvalidSection(String),
}
