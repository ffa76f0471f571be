//! # SpatialPrint Toolpath
//!
//! Turns an unordered bag of 3D line segments into a print plan for spatial
//! (free-standing) 3D printing.
//!
//! ## Stages
//!
//! - **Graph**: tolerant endpoint matching into an undirected multigraph
//! - **Weighting**: height-based sort weights with connectivity adjustments
//!   and bounded tie refinement
//! - **Cleanup**: collinear merge and removal of short overlapping segments
//! - **Clustering**: connected components, optionally split into Z bands
//! - **Chains**: post and brace pairing, linked end to end
//! - **Trail**: deadline-bounded longest trail search
//! - **Waypoints**: oriented print frames and robot targets
//!
//! [`ToolpathPlanner`] runs the whole pipeline.

pub mod chain;
pub mod cluster;
pub mod error;
pub mod graph;
pub mod merge;
pub mod planner;
pub mod trail;
pub mod waypoint;
pub mod weighting;

pub use chain::{assemble_chains, pair_verticals_with_angled, Chain, VerticalAngledPair};
pub use cluster::{cluster_by_adjacency, cluster_by_z_band, Cluster};
pub use error::{PlannerError, PlannerResult, SkippedSegment};
pub use graph::{Connections, Edge, EdgeId, GraphBuild, NodeId, SpatialGraph};
pub use merge::{
    combine_collinear, combine_collinear_until_stable, remove_overlaps, MergeOutcome,
    RemovalOutcome,
};
pub use planner::{ToolpathPlan, ToolpathPlanner, TrailPlan, WeightedSegment};
pub use trail::{find_longest_trail, TrailResult};
pub use waypoint::{
    emit_waypoints, frame_at, key_frames, ActivationEvent, AxisValue, EventKind, Frame,
    MoveType, Waypoint, WAYPOINTS_PER_SEGMENT,
};
pub use weighting::{assign_weights, order_by_weight, refine_weights, RefineOutcome};
