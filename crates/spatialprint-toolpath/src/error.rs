//! Error types for the toolpath crate.
//!
//! Only an empty batch is fatal. Bad individual segments are reported as
//! [`SkippedSegment`] diagnostics next to the main result.

use serde::Serialize;
use spatialprint_core::{GeometryError, Segment};
use spatialprint_settings::ConfigError;
use thiserror::Error;

/// Errors that can occur while planning a toolpath.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// There is nothing to process.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Two parallel inputs disagree in length.
    #[error("Length mismatch: {segments} segments but {weights} weights")]
    LengthMismatch { segments: usize, weights: usize },

    /// The planner configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// A segment excluded from the batch and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSegment {
    /// Position in the caller's input list
    pub index: usize,
    pub segment: Segment,
    pub reason: GeometryError,
}

/// Result type alias for planner operations.
pub type PlannerResult<T> = Result<T, PlannerError>;
