//! Named tolerances threaded through every predicate.

use serde::{Deserialize, Serialize};

/// Tolerances used when comparing geometry, in model units.
///
/// Endpoint matching and orientation tests use separate values:
/// a segment can be "vertical enough" at a coarser tolerance than is safe for
/// deciding that two endpoints are the same graph node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Per-axis tolerance for point equality and endpoint matching
    pub position: f64,
    /// Per-axis delta below which a segment counts as vertical or horizontal
    pub orientation: f64,
    /// Per-component tolerance when comparing unit direction vectors
    pub direction: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            position: 1e-3,
            orientation: 1e-2,
            direction: 1e-2,
        }
    }
}

impl Tolerances {
    /// All tolerances are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        [self.position, self.orientation, self.direction]
            .iter()
            .all(|t| t.is_finite() && *t > 0.0)
    }
}
