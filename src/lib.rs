//! # SpatialPrint
//!
//! Toolpath ordering for robotic spatial 3D printing. Takes the line segments
//! of a free-standing lattice and works out a printable order:
//! - classifies segments as vertical, horizontal or angled
//! - weights and sorts them so supports print before what they carry
//! - merges collinear pieces and drops overlapping duplicates
//! - pairs posts with braces and links the pairs into chains
//! - emits oriented robot waypoints with extrusion events
//!
//! ## Architecture
//!
//! 1. **spatialprint-core** - Geometry types, tolerances, predicates
//! 2. **spatialprint-settings** - Configuration, persistence, validation
//! 3. **spatialprint-toolpath** - Graph, weighting, cleanup, chains, trail search
//! 4. **spatialprint** - CLI binary and JSON input/output

use std::io::Read;
use std::path::Path;

use anyhow::Context;

pub use spatialprint_core::{
    segments_from_polylines, GeometryError, Orientation, Point3, Segment, Tolerances,
};
pub use spatialprint_settings::{default_config_path, Config, SettingsError};
pub use spatialprint_toolpath::{
    PlannerError, SkippedSegment, ToolpathPlan, ToolpathPlanner, TrailPlan, Waypoint,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Cargo profile the binary was built with
pub const BUILD_PROFILE: &str = env!("BUILD_PROFILE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, so stdout stays free for JSON results
/// - RUST_LOG environment variable support (default `info`)
/// - Pretty formatting, or one JSON object per line when `json` is set
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .json();
        registry.with(fmt_layer).try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true)
            .pretty();
        registry.with(fmt_layer).try_init()?;
    }

    Ok(())
}

/// Parse polylines given as JSON arrays of `[x, y, z]` points and split them
/// into segments.
pub fn parse_polylines(json: &str) -> anyhow::Result<Vec<Segment>> {
    let raw: Vec<Vec<[f64; 3]>> =
        serde_json::from_str(json).context("input must be a JSON array of polylines")?;
    let polylines: Vec<Vec<Point3>> = raw
        .into_iter()
        .map(|pl| pl.into_iter().map(|[x, y, z]| Point3::new(x, y, z)).collect())
        .collect();
    Ok(segments_from_polylines(&polylines))
}

/// Read polylines from a file, or from stdin when `path` is `-`.
pub fn read_segments(path: &Path) -> anyhow::Result<Vec<Segment>> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    let segments = parse_polylines(&content)?;
    tracing::debug!("Read {} segments from {}", segments.len(), path.display());
    Ok(segments)
}

/// Resolve the planner configuration.
///
/// An explicit path must load. Otherwise the user config file is used when
/// it exists, and built-in defaults when it does not.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Config::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }

    match default_config_path() {
        Ok(path) if path.exists() => {
            tracing::info!("Using config {}", path.display());
            Config::load_from_file(&path)
                .with_context(|| format!("failed to load config {}", path.display()))
        }
        _ => Ok(Config::default()),
    }
}

/// Write pretty JSON to a file, or stdout when `path` is `None`.
pub fn write_json<T: serde::Serialize>(value: &T, path: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_polylines() {
        let segments =
            parse_polylines("[[[0,0,0],[0,0,10],[10,0,0]], [[5,5,5]]]").unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].to, Point3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_parse_rejects_bad_points() {
        assert!(parse_polylines("[[[0,0],[1,1]]]").is_err());
    }
}
