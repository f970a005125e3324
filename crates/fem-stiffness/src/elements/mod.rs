//! Element formulations.
//!
//! Each formulation implements [`ElementFormulation`](crate::builder::ElementFormulation)
//! for one element family, working entirely in the element's local frame:
//!
//! - [`TrussFormulation`]: axial bar, shared by truss and spring elements
//! - [`BeamFormulation`]: 2-node Euler-Bernoulli beam with torsion
//! - [`PlateFormulation`]: 4-node Mindlin plate with membrane action

mod beam;
mod plate;
mod truss;

pub use beam::{BEAM_STRAINS, BeamFormulation};
pub use plate::{PLATE_STRAINS, PlateFormulation};
pub use truss::TrussFormulation;

use crate::error::{Result, StiffnessError};
use fem_model::Element;

/// Shortest element length accepted before the geometry counts as collapsed
const MIN_LENGTH: f64 = 1e-10;

/// Parse `N` natural coordinates, each within [-1, 1]
pub(crate) fn natural_coordinates<const N: usize>(natural: &[f64]) -> Result<[f64; N]> {
    let coords: [f64; N] = natural.try_into().map_err(|_| {
        StiffnessError::InvalidArgument(format!(
            "expected {} natural coordinate(s), got {}",
            N,
            natural.len()
        ))
    })?;
    if let Some(bad) = coords.iter().find(|c| !(-1.0..=1.0).contains(*c)) {
        return Err(StiffnessError::InvalidArgument(format!(
            "natural coordinate {} lies outside [-1, 1]",
            bad
        )));
    }
    Ok(coords)
}

/// Length of a line element, rejecting collapsed geometry
pub(crate) fn line_length(element: &Element) -> Result<f64> {
    let length = element.length();
    if !(length >= MIN_LENGTH) || !length.is_finite() {
        return Err(StiffnessError::InvalidArgument(format!(
            "{} element {} has zero or near-zero length: {}",
            element.kind(),
            element.id(),
            length
        )));
    }
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_natural_coordinates() {
        assert_eq!(natural_coordinates::<1>(&[0.25]).unwrap(), [0.25]);
        assert_eq!(natural_coordinates::<2>(&[-1.0, 1.0]).unwrap(), [-1.0, 1.0]);
    }

    #[test]
    fn rejects_wrong_count_or_range() {
        let err = natural_coordinates::<2>(&[0.0]).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("expected 2"));

        assert!(natural_coordinates::<1>(&[1.5]).is_err());
        assert!(natural_coordinates::<1>(&[f64::NAN]).is_err());
    }
}
