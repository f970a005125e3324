//! Material properties for structural elements.

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};

/// A linear elastic isotropic material definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Material {
    /// Material name
    pub name: String,
    /// Young's modulus (E) [Pa]
    pub elastic_modulus: Option<f64>,
    /// Poisson's ratio (ν) [-]
    pub poissons_ratio: Option<f64>,
    /// Density (ρ) [kg/m³]
    pub density: Option<f64>,
}

impl Material {
    /// Create a new material with a given name and no properties
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a material with elastic constants set
    pub fn elastic(name: impl Into<String>, elastic_modulus: f64, poissons_ratio: f64) -> Self {
        Self {
            name: name.into(),
            elastic_modulus: Some(elastic_modulus),
            poissons_ratio: Some(poissons_ratio),
            density: None,
        }
    }

    /// Young's modulus, failing if it is absent or not positive
    pub fn require_elastic_modulus(&self) -> Result<f64> {
        match self.elastic_modulus {
            Some(e) if e > 0.0 && e.is_finite() => Ok(e),
            Some(e) => Err(ModelError::InvalidMaterial(format!(
                "material '{}' has non-positive elastic modulus {}",
                self.name, e
            ))),
            None => Err(ModelError::InvalidMaterial(format!(
                "material '{}' is missing elastic modulus",
                self.name
            ))),
        }
    }

    /// Poisson's ratio, failing if it is absent or outside (-1, 0.5)
    pub fn require_poissons_ratio(&self) -> Result<f64> {
        match self.poissons_ratio {
            Some(nu) if nu > -1.0 && nu < 0.5 => Ok(nu),
            Some(nu) => Err(ModelError::InvalidMaterial(format!(
                "material '{}' has Poisson's ratio {} outside (-1, 0.5)",
                self.name, nu
            ))),
            None => Err(ModelError::InvalidMaterial(format!(
                "material '{}' is missing Poisson's ratio",
                self.name
            ))),
        }
    }

    /// Get the shear modulus (G) from E and ν
    pub fn shear_modulus(&self) -> Option<f64> {
        match (self.elastic_modulus, self.poissons_ratio) {
            (Some(e), Some(nu)) => Some(e / (2.0 * (1.0 + nu))),
            _ => None,
        }
    }

    pub fn require_shear_modulus(&self) -> Result<f64> {
        let e = self.require_elastic_modulus()?;
        let nu = self.require_poissons_ratio()?;
        Ok(e / (2.0 * (1.0 + nu)))
    }
}
