//! End-to-end toolpath planning.

use serde::Serialize;
use spatialprint_core::{Orientation, Point3, Segment};
use spatialprint_settings::Config;
use tracing::{debug, info, warn};

use crate::chain::{assemble_chains, pair_verticals_with_angled, Chain, VerticalAngledPair};
use crate::cluster::{cluster_by_adjacency, cluster_by_z_band, Cluster};
use crate::error::{PlannerResult, SkippedSegment};
use crate::graph::{EdgeId, SpatialGraph};
use crate::merge::{combine_collinear_until_stable, remove_overlaps};
use crate::trail::{find_longest_trail, TrailResult};
use crate::waypoint::{emit_waypoints, Waypoint};
use crate::weighting::{assign_weights, order_by_weight, refine_weights, RefineOutcome};

/// A segment in print order with its final weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedSegment {
    /// Edge id in the cleaned graph, as referenced by clusters and pairs
    pub edge: EdgeId,
    pub segment: Segment,
    pub orientation: Orientation,
    pub weight: f64,
}

/// Everything produced by [`ToolpathPlanner::plan`].
#[derive(Debug, Clone, Serialize)]
pub struct ToolpathPlan {
    /// Cleaned segments, lowest weight first
    pub ordered: Vec<WeightedSegment>,
    pub initial_refinement: RefineOutcome,
    pub final_refinement: RefineOutcome,
    /// Input segments dropped before planning
    pub skipped: Vec<SkippedSegment>,
    /// Cleaned segments dropped when the graph was rebuilt; indices refer to
    /// the cleaned list, not the input
    pub cleanup_skipped: Vec<SkippedSegment>,
    /// Collinear pairs joined during cleanup
    pub merged: usize,
    /// Overlapping segments deleted during cleanup
    pub removed: usize,
    /// Connected components of the cleaned graph
    pub clusters: Vec<Cluster>,
    /// Z-band components of the cleaned graph
    pub layers: Vec<Cluster>,
    pub pairs: Vec<VerticalAngledPair>,
    pub chains: Vec<Chain>,
    pub waypoints: Vec<Waypoint>,
}

impl ToolpathPlan {
    /// Segments in print order.
    pub fn segments(&self) -> Vec<Segment> {
        self.ordered.iter().map(|w| w.segment).collect()
    }
}

/// Output of [`ToolpathPlanner::longest_trail`].
#[derive(Debug, Clone, Serialize)]
pub struct TrailPlan {
    pub trail: TrailResult,
    /// Node positions along the walk
    pub points: Vec<Point3>,
    /// Trail edges as segments, oriented in walking order
    pub segments: Vec<Segment>,
    pub skipped: Vec<SkippedSegment>,
}

/// Runs the planning pipeline with one configuration.
///
/// Every call builds its graphs from scratch; nothing is cached between
/// calls.
#[derive(Debug, Clone)]
pub struct ToolpathPlanner {
    config: Config,
}

impl ToolpathPlanner {
    /// Create a planner, rejecting invalid configuration.
    pub fn new(config: Config) -> PlannerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Order segments for printing and derive clusters, chains and waypoints.
    ///
    /// Stages: build the graph, weight and refine, merge collinear pieces and
    /// drop overlaps, rebuild the graph over the cleaned segments, refine the
    /// carried weights again, sort. Clustering, pairing and chain assembly run
    /// on the cleaned graph.
    pub fn plan(&self, segments: &[Segment]) -> PlannerResult<ToolpathPlan> {
        let cfg = &self.config;
        let tol = &cfg.tolerance;

        let build = SpatialGraph::build(segments, tol)?;
        let graph = build.graph;
        let mut weights = assign_weights(&graph, &cfg.weighting)?;
        let initial_refinement = refine_weights(&graph, &mut weights, &cfg.weighting);
        debug!(
            "Initial weights for {} edges refined in {} passes",
            graph.edge_count(),
            initial_refinement.iterations
        );

        let merge = combine_collinear_until_stable(
            &graph.segments(),
            &weights,
            tol,
            &cfg.cleanup,
        )?;
        let cleaned = remove_overlaps(&merge.segments, &merge.weights, tol, &cfg.cleanup)?;

        let rebuilt = SpatialGraph::build(&cleaned.segments, tol)?;
        if !rebuilt.skipped.is_empty() {
            warn!(
                "Dropped {} degenerate segments after cleanup",
                rebuilt.skipped.len()
            );
        }
        let cleanup_skipped = rebuilt.skipped;
        let graph = rebuilt.graph;
        let mut weights: Vec<f64> = graph
            .edges()
            .iter()
            .map(|e| cleaned.weights[e.source_index])
            .collect();
        let final_refinement = refine_weights(&graph, &mut weights, &cfg.weighting);
        if !final_refinement.converged {
            warn!(
                "Weight refinement stopped after {} passes with ties left",
                final_refinement.iterations
            );
        }

        let ordered: Vec<WeightedSegment> = order_by_weight(&weights)
            .into_iter()
            .map(|id| {
                let edge = graph.edge(id);
                WeightedSegment {
                    edge: id,
                    segment: edge.segment,
                    orientation: edge.orientation,
                    weight: weights[id],
                }
            })
            .collect();

        let clusters = cluster_by_adjacency(&graph);
        let layers = cluster_by_z_band(&graph, cfg.clustering.z_band_width)?;
        let pairs: Vec<VerticalAngledPair> = clusters
            .iter()
            .flat_map(|c| pair_verticals_with_angled(&graph, c, tol))
            .collect();
        let chains = assemble_chains(&pairs, tol);

        let print_order: Vec<Segment> = ordered.iter().map(|w| w.segment).collect();
        let waypoints = emit_waypoints(&print_order, &cfg.motion);

        info!(
            "Planned {} segments ({} skipped, {} merged, {} removed): {} clusters, {} pairs, {} chains",
            ordered.len(),
            build.skipped.len(),
            merge.merged,
            cleaned.removed,
            clusters.len(),
            pairs.len(),
            chains.len()
        );

        Ok(ToolpathPlan {
            ordered,
            initial_refinement,
            final_refinement,
            skipped: build.skipped,
            cleanup_skipped,
            merged: merge.merged,
            removed: cleaned.removed,
            clusters,
            layers,
            pairs,
            chains,
            waypoints,
        })
    }

    /// Longest edge-simple walk over the input, within the search deadline.
    pub fn longest_trail(&self, segments: &[Segment]) -> PlannerResult<TrailPlan> {
        let build = SpatialGraph::build(segments, &self.config.tolerance)?;
        let graph = build.graph;
        let trail = find_longest_trail(&graph, self.config.search.timeout());

        let points = trail.walk_points(&graph);
        let segments = points
            .windows(2)
            .map(|w| Segment::new(w[0], w[1]))
            .collect();

        info!(
            "Longest trail covers {} of {} edges{}",
            trail.len(),
            graph.edge_count(),
            if trail.truncated { " (truncated)" } else { "" }
        );

        Ok(TrailPlan {
            trail,
            points,
            segments,
            skipped: build.skipped,
        })
    }
}
