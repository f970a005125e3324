//! Cross-section properties for line and plate elements.

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};

/// Truss section (area only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrussSection {
    /// Cross-sectional area [m²]
    pub area: f64,
}

impl TrussSection {
    pub fn new(area: f64) -> Self {
        Self { area }
    }
}

/// Axial spring with a directly prescribed stiffness [N/m]. A zero
/// stiffness is allowed and produces an all-zero contribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringSection {
    pub stiffness: f64,
}

impl SpringSection {
    pub fn new(stiffness: f64) -> Self {
        Self { stiffness }
    }
}

/// Beam section properties for various cross-section shapes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSection {
    /// Cross-sectional area
    pub area: f64,
    /// Second moment of area about local y-axis (Iyy)
    pub iyy: f64,
    /// Second moment of area about local z-axis (Izz)
    pub izz: f64,
    /// Torsional constant (J)
    pub torsion_constant: f64,
}

impl BeamSection {
    /// Create a circular beam section
    ///
    /// # Example
    /// ```
    /// use fem_model::BeamSection;
    ///
    /// let section = BeamSection::circular(0.05); // 5cm radius
    /// assert!((section.area - std::f64::consts::PI * 0.05_f64.powi(2)).abs() < 1e-10);
    /// ```
    pub fn circular(radius: f64) -> Self {
        let area = std::f64::consts::PI * radius.powi(2);
        let i = std::f64::consts::PI * radius.powi(4) / 4.0;
        let j = std::f64::consts::PI * radius.powi(4) / 2.0;

        Self {
            area,
            iyy: i,
            izz: i,
            torsion_constant: j,
        }
    }

    /// Create a rectangular beam section
    ///
    /// `width` is measured along local y, `height` along local z.
    pub fn rectangular(width: f64, height: f64) -> Self {
        let area = width * height;
        let iyy = width * height.powi(3) / 12.0;
        let izz = height * width.powi(3) / 12.0;

        // Saint-Venant approximation for a solid rectangle
        let a = width.max(height);
        let b = width.min(height);
        let j = (a * b.powi(3)) * (1.0 / 3.0 - 0.21 * (b / a) * (1.0 - b.powi(4) / (12.0 * a.powi(4))));

        Self {
            area,
            iyy,
            izz,
            torsion_constant: j,
        }
    }

    /// Create a custom beam section with explicit properties
    pub fn custom(area: f64, iyy: f64, izz: f64, j: f64) -> Self {
        Self {
            area,
            iyy,
            izz,
            torsion_constant: j,
        }
    }
}

/// Plate section properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateSection {
    /// Plate thickness [m]
    pub thickness: f64,
    /// Transverse shear correction factor
    pub shear_correction: f64,
}

impl PlateSection {
    pub fn new(thickness: f64) -> Self {
        Self {
            thickness,
            shear_correction: 5.0 / 6.0,
        }
    }
}

/// Section assigned to an element; the variant must match the element kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Section {
    Truss(TrussSection),
    Spring(SpringSection),
    Beam(BeamSection),
    Plate(PlateSection),
}

impl Section {
    pub fn name(&self) -> &'static str {
        match self {
            Section::Truss(_) => "truss",
            Section::Spring(_) => "spring",
            Section::Beam(_) => "beam",
            Section::Plate(_) => "plate",
        }
    }

    /// Check that every property is finite and physically meaningful
    pub fn validate(&self) -> Result<()> {
        let positive = |label: &str, value: f64| {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ModelError::InvalidSection(format!(
                    "{} section {} must be positive, got {}",
                    self.name(),
                    label,
                    value
                )))
            }
        };

        match self {
            Section::Truss(s) => positive("area", s.area),
            Section::Spring(s) => {
                if s.stiffness >= 0.0 && s.stiffness.is_finite() {
                    Ok(())
                } else {
                    Err(ModelError::InvalidSection(format!(
                        "spring stiffness must be non-negative, got {}",
                        s.stiffness
                    )))
                }
            }
            Section::Beam(s) => {
                positive("area", s.area)?;
                positive("iyy", s.iyy)?;
                positive("izz", s.izz)?;
                positive("torsion constant", s.torsion_constant)
            }
            Section::Plate(s) => {
                positive("thickness", s.thickness)?;
                positive("shear correction", s.shear_correction)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_section() {
        let radius = 0.05;
        let section = BeamSection::circular(radius);

        let expected_area = std::f64::consts::PI * radius.powi(2);
        let expected_i = std::f64::consts::PI * radius.powi(4) / 4.0;
        let expected_j = std::f64::consts::PI * radius.powi(4) / 2.0;

        assert!((section.area - expected_area).abs() < 1e-10);
        assert!((section.iyy - expected_i).abs() < 1e-10);
        assert!((section.izz - expected_i).abs() < 1e-10);
        assert!((section.torsion_constant - expected_j).abs() < 1e-10);
    }

    #[test]
    fn test_rectangular_section() {
        let section = BeamSection::rectangular(0.1, 0.2);

        assert_eq!(section.area, 0.1 * 0.2);
        assert_eq!(section.iyy, 0.1 * 0.2_f64.powi(3) / 12.0);
        assert_eq!(section.izz, 0.2 * 0.1_f64.powi(3) / 12.0);
        assert!(section.torsion_constant > 0.0);
    }

    #[test]
    fn validation_rejects_non_positive_values() {
        assert!(Section::Truss(TrussSection::new(0.01)).validate().is_ok());
        assert!(Section::Truss(TrussSection::new(0.0)).validate().is_err());
        assert!(Section::Spring(SpringSection::new(0.0)).validate().is_ok());
        assert!(Section::Spring(SpringSection::new(-1.0)).validate().is_err());

        let err = Section::Plate(PlateSection::new(-0.01)).validate().unwrap_err();
        assert!(err.to_string().contains("thickness"));
    }
}
