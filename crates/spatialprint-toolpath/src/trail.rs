//! Longest edge-simple walk search.
//!
//! Finding the longest trail is NP-hard in general, so this is an anytime
//! search: it enumerates every edge-simple walk from every node by
//! backtracking, keeps the longest one seen, and stops at a wall-clock
//! deadline. The answer is only guaranteed optimal when the search finishes
//! before the deadline.

use std::time::{Duration, Instant};

use serde::Serialize;
use spatialprint_core::Point3;
use tracing::{debug, warn};

use crate::graph::{EdgeId, NodeId, SpatialGraph};

/// Best trail found by [`find_longest_trail`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailResult {
    /// Edges in walking order
    pub edges: Vec<EdgeId>,
    /// Node the walk starts from, `None` when no edge was walked
    pub start: Option<NodeId>,
    /// The deadline cut the search short
    pub truncated: bool,
    pub elapsed: Duration,
    /// Edges pushed during the search
    pub expansions: u64,
}

impl TrailResult {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Node positions visited by the walk, including the start.
    pub fn walk_points(&self, graph: &SpatialGraph) -> Vec<Point3> {
        let Some(start) = self.start else {
            return Vec::new();
        };
        let mut node = start;
        let mut points = vec![graph.node(node)];
        for &edge in &self.edges {
            node = graph.other_end(edge, node);
            points.push(graph.node(node));
        }
        points
    }
}

struct Frame {
    node: NodeId,
    /// Next position in the node's incident list to try
    next: usize,
}

/// Search for the longest walk that never repeats an edge.
///
/// Uses an explicit backtracking stack, so depth is bounded by the edge
/// count rather than the call stack. The deadline is checked before every
/// expansion; when it passes the search unwinds and returns the best walk so
/// far with `truncated` set.
pub fn find_longest_trail(graph: &SpatialGraph, timeout: Duration) -> TrailResult {
    let started = Instant::now();
    let deadline = started + timeout;
    let edge_count = graph.edge_count();

    let mut used = vec![false; edge_count];
    let mut path: Vec<EdgeId> = Vec::with_capacity(edge_count);
    let mut best: Vec<EdgeId> = Vec::new();
    let mut best_start = None;
    let mut truncated = false;
    let mut expansions: u64 = 0;

    'search: for start in 0..graph.node_count() {
        if graph.degree(start) == 0 {
            continue;
        }
        let mut stack = vec![Frame {
            node: start,
            next: 0,
        }];

        while let Some(top) = stack.last_mut() {
            if Instant::now() >= deadline {
                truncated = true;
                break 'search;
            }

            let incident = graph.incident(top.node);
            if top.next < incident.len() {
                let edge = incident[top.next];
                top.next += 1;
                if used[edge] {
                    continue;
                }

                let next_node = graph.other_end(edge, top.node);
                used[edge] = true;
                path.push(edge);
                stack.push(Frame {
                    node: next_node,
                    next: 0,
                });
                expansions += 1;

                if path.len() > best.len() {
                    best.clone_from(&path);
                    best_start = Some(start);
                    if best.len() == edge_count {
                        break 'search;
                    }
                }
            } else {
                stack.pop();
                if let Some(edge) = path.pop() {
                    used[edge] = false;
                }
            }
        }
    }

    let elapsed = started.elapsed();
    if truncated {
        warn!(
            "Longest trail search hit its {:?} deadline; returning best of {} edges",
            timeout,
            best.len()
        );
    } else {
        debug!(
            "Longest trail: {} of {} edges in {:?} ({} expansions)",
            best.len(),
            edge_count,
            elapsed,
            expansions
        );
    }

    TrailResult {
        edges: best,
        start: best_start,
        truncated,
        elapsed,
        expansions,
    }
}
