//! SpatialPrint Settings Crate
//!
//! Handles planner configuration: defaults, validation and JSON/TOML
//! persistence. Every tolerance and heuristic constant used by the toolpath
//! engine is read from here rather than hard-coded at the call site.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, CleanupSettings, ClusteringSettings, Config, MotionSettings,
    SearchSettings, WeightingSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
pub use spatialprint_core::Tolerances;
