//! Generalized strain components used as row keys of strain-displacement
//! matrices.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrainComponent {
    /// du/dx along a line element
    Axial,
    /// Curvature in the local x-z plane
    CurvatureY,
    /// Curvature in the local x-y plane
    CurvatureZ,
    /// Rate of twist dθx/dx
    Twist,
    MembraneXx,
    MembraneYy,
    MembraneXy,
    BendingXx,
    BendingYy,
    BendingXy,
    ShearXz,
    ShearYz,
}

impl fmt::Display for StrainComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
