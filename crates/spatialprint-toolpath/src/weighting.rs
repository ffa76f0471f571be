//! Sort weights and tie refinement.
//!
//! A weight is a scalar print-order key: lower weights print earlier. The
//! initial weight of an edge is the Z of its top endpoint, adjusted by what is
//! attached to either end:
//!
//! - horizontal edges get a flat offset and no connectivity adjustment
//! - a vertical edge is pulled earlier when an angled edge hangs off its top
//!   and pushed later when an angled edge leaves from its bottom
//! - an angled edge is pushed later when its top touches a vertical and pulled
//!   earlier when its bottom does
//!
//! These are local heuristics. They approximate a supports-before-supported
//! order but can still leave ties, which [`refine_weights`] tries to break.

use std::collections::BTreeMap;

use serde::Serialize;
use spatialprint_core::Orientation;
use spatialprint_settings::WeightingSettings;
use tracing::{debug, trace};

use crate::error::{PlannerError, PlannerResult};
use crate::graph::{EdgeId, SpatialGraph};

/// Round to three decimals, the resolution weights are compared at.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn weight_key(value: f64) -> i64 {
    (value * 1000.0).round() as i64
}

/// Result of a refinement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefineOutcome {
    /// Passes that changed at least one weight
    pub iterations: u32,
    /// `false` when the iteration cap was hit with ties still pending
    pub converged: bool,
}

/// Initial weight of every edge, indexed by [`EdgeId`].
pub fn assign_weights(
    graph: &SpatialGraph,
    settings: &WeightingSettings,
) -> PlannerResult<Vec<f64>> {
    if graph.edge_count() == 0 {
        return Err(PlannerError::InvalidInput(
            "cannot weight an empty graph".to_string(),
        ));
    }

    let touches = |edges: &[EdgeId], wanted: Orientation| {
        edges
            .iter()
            .any(|&e| graph.edge(e).orientation == wanted)
    };

    let weights = graph
        .edges()
        .iter()
        .enumerate()
        .map(|(id, edge)| {
            let base = round3(edge.segment.to.z);
            let conn = graph.connections(id);
            let weight = match edge.orientation {
                Orientation::Horizontal => base + settings.horizontal_offset,
                Orientation::Vertical => {
                    let mut w = base;
                    if touches(&conn.end, Orientation::Angled) {
                        w -= settings.vertical_adjustment;
                    }
                    if touches(&conn.start, Orientation::Angled) {
                        w += settings.vertical_adjustment;
                    }
                    w
                }
                Orientation::Angled => {
                    let mut w = base;
                    if touches(&conn.end, Orientation::Vertical) {
                        w += settings.angled_adjustment;
                    }
                    if touches(&conn.start, Orientation::Vertical) {
                        w -= settings.angled_adjustment;
                    }
                    w
                }
            };
            round3(weight)
        })
        .collect();

    Ok(weights)
}

/// Groups of edges sharing a weight (at three-decimal resolution), smallest
/// weight first. Singletons are dropped.
pub fn tie_groups(weights: &[f64]) -> Vec<Vec<EdgeId>> {
    let mut groups: BTreeMap<i64, Vec<EdgeId>> = BTreeMap::new();
    for (id, &w) in weights.iter().enumerate() {
        groups.entry(weight_key(w)).or_default().push(id);
    }
    groups.into_values().filter(|g| g.len() > 1).collect()
}

/// Nudges computed from one snapshot of the weights.
fn tie_nudges(graph: &SpatialGraph, weights: &[f64], step: f64) -> Vec<f64> {
    let mut delta = vec![0.0; weights.len()];

    for group in tie_groups(weights) {
        for &edge in &group {
            if graph.edge(edge).orientation != Orientation::Vertical {
                continue;
            }
            let conn = graph.connections(edge);
            let below: Vec<EdgeId> = conn
                .start
                .into_iter()
                .filter(|e| group.contains(e))
                .collect();
            let above: Vec<EdgeId> = conn
                .end
                .into_iter()
                .filter(|e| group.contains(e))
                .collect();

            if !below.is_empty() {
                for e in below {
                    delta[e] -= step;
                }
                delta[edge] += step;
            }
            if !above.is_empty() {
                for e in above {
                    delta[e] += step;
                }
                delta[edge] -= step;
            }
        }
    }

    delta
}

/// Break weight ties around vertical edges.
///
/// For every vertical edge tied with an edge attached to its bottom, the
/// attached edge moves down by `refine_step` and the vertical moves up; ties
/// at the top move the other way. Each pass works from a snapshot so the
/// result does not depend on iteration order inside a group.
///
/// Runs at most `max_refine_iterations` passes. It is best effort: a tie that
/// does not involve a vertical edge is left alone, and the cap can be hit
/// with ties still pending.
pub fn refine_weights(
    graph: &SpatialGraph,
    weights: &mut [f64],
    settings: &WeightingSettings,
) -> RefineOutcome {
    let mut iterations = 0;

    while iterations < settings.max_refine_iterations {
        let delta = tie_nudges(graph, weights, settings.refine_step);
        if delta.iter().all(|d| *d == 0.0) {
            debug!("Weight refinement settled after {} passes", iterations);
            return RefineOutcome {
                iterations,
                converged: true,
            };
        }

        for (w, d) in weights.iter_mut().zip(&delta) {
            *w = round3(*w + d);
        }
        iterations += 1;
        trace!("Refinement pass {} applied", iterations);
    }

    let converged = tie_nudges(graph, weights, settings.refine_step)
        .iter()
        .all(|d| *d == 0.0);
    RefineOutcome {
        iterations,
        converged,
    }
}

/// Edge ids sorted by ascending weight. Equal weights keep edge order.
pub fn order_by_weight(weights: &[f64]) -> Vec<EdgeId> {
    let mut order: Vec<EdgeId> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| weights[a].total_cmp(&weights[b]));
    order
}
