//! Planner configuration
//!
//! Configuration is organized into logical sections:
//! - Tolerances (point matching, orientation, direction)
//! - Weighting (sort-weight heuristics and refinement)
//! - Cleanup (collinear merge and overlap removal)
//! - Clustering (Z-band width)
//! - Search (longest-trail deadline)
//! - Motion (waypoint offsets, speeds and extrusion attributes)
//!
//! Files may be JSON or TOML; missing keys fall back to defaults.

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use spatialprint_core::Tolerances;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sort-weight heuristics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightingSettings {
    /// Added to a horizontal edge's end Z
    pub horizontal_offset: f64,
    /// Subtracted from a vertical whose top touches an angled edge, added
    /// when its bottom does
    pub vertical_adjustment: f64,
    /// Added to an angled edge whose top touches a vertical, subtracted when
    /// its bottom does
    pub angled_adjustment: f64,
    /// Nudge applied by tie refinement
    pub refine_step: f64,
    /// Maximum refinement passes
    pub max_refine_iterations: u32,
}

impl Default for WeightingSettings {
    fn default() -> Self {
        Self {
            horizontal_offset: 0.9,
            vertical_adjustment: 0.5,
            angled_adjustment: 0.05,
            refine_step: 0.05,
            max_refine_iterations: 5,
        }
    }
}

/// Collinear merge and overlap removal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    /// Merged segments must be strictly shorter than this
    pub max_merge_span: f64,
    /// Added to a merged weight when the absorbed segment is vertical
    pub merged_vertical_bonus: f64,
    /// Overlap removal only deletes segments shorter than this
    pub short_segment_length: f64,
    /// Cap on repeated merge passes
    pub max_merge_passes: u32,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            max_merge_span: 80.0,
            merged_vertical_bonus: 0.13,
            short_segment_length: 40.0,
            max_merge_passes: 8,
        }
    }
}

/// Clustering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringSettings {
    /// Width of a Z bucket for band clustering
    pub z_band_width: f64,
}

impl Default for ClusteringSettings {
    fn default() -> Self {
        Self { z_band_width: 1.0 }
    }
}

/// Longest-trail search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Wall-clock budget in milliseconds
    pub timeout_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { timeout_ms: 20_000 }
    }
}

impl SearchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Waypoint emission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Height of the approach waypoint above the segment start (world Z)
    pub approach_offset: f64,
    /// Extra height of the safe waypoint above the approach
    pub safe_offset: f64,
    /// Speed for joint travel moves
    pub travel_speed: f64,
    /// Speed while extruding
    pub print_speed: f64,
    /// Name of the activation event toggled around each segment
    pub extrude_event: String,
    /// Name of the continuous axis carried on extruding waypoints
    pub extrusion_axis: String,
    /// Value of the extrusion axis while printing
    pub extrusion_rate: f64,
    /// Maximum tilt of a print frame about its X axis, in degrees
    pub max_tilt_degrees: f64,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            approach_offset: 100.0,
            safe_offset: 50.0,
            travel_speed: 1.0,
            print_speed: 0.25,
            extrude_event: "extrude".to_string(),
            extrusion_axis: "extrusion_rate".to_string(),
            extrusion_rate: 1.0,
            max_tilt_degrees: 90.0,
        }
    }
}

/// Complete planner configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub tolerance: Tolerances,
    pub weighting: WeightingSettings,
    pub cleanup: CleanupSettings,
    pub clustering: ClusteringSettings,
    pub search: SearchSettings,
    pub motion: MotionSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Toml,
}

fn format_for(path: &Path) -> ConfigResult<FileFormat> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(FileFormat::Json),
        Some("toml") => Ok(FileFormat::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_for(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            FileFormat::Json => serde_json::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded planner config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating missing parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_for(path)? {
            FileFormat::Json => serde_json::to_string_pretty(self)?,
            FileFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> SettingsResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let tol = &self.tolerance;
        for (key, value) in [
            ("tolerance.position", tol.position),
            ("tolerance.orientation", tol.orientation),
            ("tolerance.direction", tol.direction),
        ] {
            require_positive(key, value)?;
        }

        let w = &self.weighting;
        require_non_negative("weighting.horizontal_offset", w.horizontal_offset)?;
        require_non_negative("weighting.vertical_adjustment", w.vertical_adjustment)?;
        require_non_negative("weighting.angled_adjustment", w.angled_adjustment)?;
        require_positive("weighting.refine_step", w.refine_step)?;
        if w.max_refine_iterations == 0 {
            return Err(ConfigError::out_of_range(
                "weighting.max_refine_iterations",
                0,
                "must be > 0",
            ));
        }

        let c = &self.cleanup;
        require_positive("cleanup.max_merge_span", c.max_merge_span)?;
        require_non_negative("cleanup.merged_vertical_bonus", c.merged_vertical_bonus)?;
        require_positive("cleanup.short_segment_length", c.short_segment_length)?;
        if c.max_merge_passes == 0 {
            return Err(ConfigError::out_of_range(
                "cleanup.max_merge_passes",
                0,
                "must be > 0",
            ));
        }

        require_positive("clustering.z_band_width", self.clustering.z_band_width)?;

        if self.search.timeout_ms == 0 {
            return Err(ConfigError::out_of_range(
                "search.timeout_ms",
                0,
                "must be > 0",
            ));
        }

        let m = &self.motion;
        require_non_negative("motion.approach_offset", m.approach_offset)?;
        require_non_negative("motion.safe_offset", m.safe_offset)?;
        require_positive("motion.travel_speed", m.travel_speed)?;
        require_positive("motion.print_speed", m.print_speed)?;
        if !(0.0..=180.0).contains(&m.max_tilt_degrees) {
            return Err(ConfigError::out_of_range(
                "motion.max_tilt_degrees",
                m.max_tilt_degrees,
                "must be within 0..=180",
            ));
        }

        Ok(())
    }
}

fn require_positive(key: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(key, value, "must be > 0"))
    }
}

fn require_non_negative(key: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(key, value, "must be >= 0"))
    }
}

/// Platform location of the user config file
/// (`<config_dir>/spatialprint/config.toml`).
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("spatialprint").join("config.toml"))
        .ok_or_else(|| {
            SettingsError::ConfigDirectory("platform config directory not found".to_string())
        })
}
