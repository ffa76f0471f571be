//! Error handling for SpatialPrint geometry
//!
//! Geometry errors describe a single bad input segment. They are never fatal
//! to a whole batch: callers convert them into skip diagnostics and continue.

use serde::Serialize;
use thiserror::Error;

/// Geometry error type
///
/// Represents problems with an individual piece of input geometry.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometryError {
    /// Segment endpoints coincide within tolerance
    #[error("Degenerate segment: length {length} is below tolerance {tolerance}")]
    DegenerateSegment {
        /// The measured segment length.
        length: f64,
        /// The position tolerance it was compared against.
        tolerance: f64,
    },

    /// A coordinate is NaN or infinite
    #[error("Non-finite coordinate in segment: {reason}")]
    NonFinite {
        /// Which endpoint carried the bad value.
        reason: String,
    },
}

impl GeometryError {
    /// Check if this error is a degenerate (zero-length) segment
    pub fn is_degenerate(&self) -> bool {
        matches!(self, GeometryError::DegenerateSegment { .. })
    }
}

/// Result type using GeometryError
pub type GeometryResult<T> = std::result::Result<T, GeometryError>;
