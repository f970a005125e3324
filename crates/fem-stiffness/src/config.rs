//! Builder configuration.

use crate::error::{Result, StiffnessError};
use serde::{Deserialize, Serialize};

/// Tolerances and checks applied by every stiffness builder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Upper bound on σ_min / σ_max for a matrix to count as singular
    pub singularity_tolerance: f64,
    /// Entry-wise tolerance when deciding whether a rotation is the identity
    pub alignment_tolerance: f64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            singularity_tolerance: 1e-9,
            alignment_tolerance: 1e-12,
        }
    }
}

impl BuilderConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    ///
    /// ```
    /// use fem_stiffness::BuilderConfig;
    ///
    /// let config = BuilderConfig::from_json_str(r#"{ "singularity_tolerance": 1e-6 }"#).unwrap();
    /// assert_eq!(config.singularity_tolerance, 1e-6);
    /// assert_eq!(config.alignment_tolerance, 1e-12);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BuilderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("singularity_tolerance", self.singularity_tolerance),
            ("alignment_tolerance", self.alignment_tolerance),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(StiffnessError::InvalidArgument(format!(
                    "{} must be a non-negative finite number, got {}",
                    label, value
                )));
            }
        }
        Ok(())
    }
}
