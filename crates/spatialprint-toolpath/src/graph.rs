//! Spatial graph of toolpath segments.
//!
//! Nodes are tolerant-merged endpoints, edges are the valid input segments in
//! their canonical (low Z to high Z) direction. Endpoint lookup goes through a
//! grid hash with cells the size of the position tolerance, so matching is
//! linear in the number of segments instead of quadratic.

use std::collections::HashMap;

use spatialprint_core::{
    classify, points_equal, GeometryError, Orientation, Point3, Segment, Tolerances,
};
use tracing::{debug, warn};

use crate::error::{PlannerError, PlannerResult, SkippedSegment};

/// Index of a node in [`SpatialGraph::nodes`].
pub type NodeId = usize;

/// Index of an edge in [`SpatialGraph::edges`].
pub type EdgeId = usize;

/// One segment of the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Canonical copy of the input segment
    pub segment: Segment,
    pub orientation: Orientation,
    /// Node at `segment.from`
    pub start: NodeId,
    /// Node at `segment.to`
    pub end: NodeId,
    /// Position of the segment in the caller's input
    pub source_index: usize,
}

/// Edges touching each end of an edge, excluding the edge itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connections {
    pub start: Vec<EdgeId>,
    pub end: Vec<EdgeId>,
}

type Cell = (i64, i64, i64);

#[derive(Debug, Clone)]
struct NodeIndex {
    cell_size: f64,
    cells: HashMap<Cell, Vec<NodeId>>,
}

impl NodeIndex {
    fn new(tolerance: f64) -> Self {
        Self {
            cell_size: tolerance.max(1e-9),
            cells: HashMap::new(),
        }
    }

    fn cell_of(&self, p: &Point3) -> Cell {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        )
    }

    /// Lowest node id within tolerance of `p`.
    fn find(&self, nodes: &[Point3], p: &Point3, tol: f64) -> Option<NodeId> {
        let (cx, cy, cz) = self.cell_of(p);
        let mut best: Option<NodeId> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(ids) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &id in ids {
                        if points_equal(&nodes[id], p, tol) && best.is_none_or(|b| id < b) {
                            best = Some(id);
                        }
                    }
                }
            }
        }
        best
    }

    fn insert(&mut self, p: &Point3, id: NodeId) {
        let cell = self.cell_of(p);
        self.cells.entry(cell).or_default().push(id);
    }
}

fn skip(skipped: &mut Vec<SkippedSegment>, index: usize, raw: &Segment, reason: GeometryError) {
    warn!("Skipping segment {}: {}", index, reason);
    skipped.push(SkippedSegment {
        index,
        segment: *raw,
        reason,
    });
}

/// Undirected multigraph of points and segments.
///
/// Every edge is registered as incident on both of its end nodes. The graph
/// is read-only once built.
#[derive(Debug, Clone)]
pub struct SpatialGraph {
    nodes: Vec<Point3>,
    edges: Vec<Edge>,
    incident: Vec<Vec<EdgeId>>,
    index: NodeIndex,
    tolerances: Tolerances,
}

/// A built graph plus the segments that could not be added.
#[derive(Debug, Clone)]
pub struct GraphBuild {
    pub graph: SpatialGraph,
    pub skipped: Vec<SkippedSegment>,
}

impl SpatialGraph {
    /// Build a graph from raw segments.
    ///
    /// Degenerate or non-finite segments are skipped and reported. Fails with
    /// [`PlannerError::InvalidInput`] when the input is empty, nothing
    /// survives validation, or a tolerance is not strictly positive.
    pub fn build(segments: &[Segment], tolerances: &Tolerances) -> PlannerResult<GraphBuild> {
        if !tolerances.is_valid() {
            return Err(PlannerError::InvalidInput(format!(
                "tolerances must be finite and > 0: {:?}",
                tolerances
            )));
        }
        if segments.is_empty() {
            return Err(PlannerError::InvalidInput(
                "no segments supplied".to_string(),
            ));
        }

        let mut graph = SpatialGraph {
            nodes: Vec::new(),
            edges: Vec::with_capacity(segments.len()),
            incident: Vec::new(),
            index: NodeIndex::new(tolerances.position),
            tolerances: *tolerances,
        };
        let mut skipped = Vec::new();

        for (index, raw) in segments.iter().enumerate() {
            let orientation = match classify(raw, tolerances) {
                Ok(o) => o,
                Err(reason) => {
                    skip(&mut skipped, index, raw, reason);
                    continue;
                }
            };

            let segment = raw.canonical();
            let degenerate = || GeometryError::DegenerateSegment {
                length: segment.length(),
                tolerance: tolerances.position,
            };
            if points_equal(&segment.from, &segment.to, tolerances.position) {
                skip(&mut skipped, index, raw, degenerate());
                continue;
            }

            let start = graph.node_for(&segment.from);
            let end = graph.node_for(&segment.to);
            if start == end {
                // Both ends snapped onto the same existing node
                skip(&mut skipped, index, raw, degenerate());
                continue;
            }
            let id = graph.edges.len();
            graph.edges.push(Edge {
                segment,
                orientation,
                start,
                end,
                source_index: index,
            });
            graph.incident[start].push(id);
            graph.incident[end].push(id);
        }

        if graph.edges.is_empty() {
            return Err(PlannerError::InvalidInput(format!(
                "all {} segments were rejected",
                segments.len()
            )));
        }

        debug!(
            "Built spatial graph: {} nodes, {} edges, {} skipped",
            graph.nodes.len(),
            graph.edges.len(),
            skipped.len()
        );

        Ok(GraphBuild { graph, skipped })
    }

    fn node_for(&mut self, p: &Point3) -> NodeId {
        if let Some(id) = self.index.find(&self.nodes, p, self.tolerances.position) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(*p);
        self.incident.push(Vec::new());
        self.index.insert(p, id);
        id
    }

    pub fn nodes(&self) -> &[Point3] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Point3 {
        self.nodes[id]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    /// Node within position tolerance of `p`, if any.
    pub fn find_node(&self, p: &Point3) -> Option<NodeId> {
        self.index.find(&self.nodes, p, self.tolerances.position)
    }

    /// Edges incident on a node, in insertion order.
    pub fn incident(&self, node: NodeId) -> &[EdgeId] {
        &self.incident[node]
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.incident[node].len()
    }

    /// Distinct neighbouring nodes, in first-seen order.
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = Vec::new();
        for &e in &self.incident[node] {
            let other = self.other_end(e, node);
            if !out.contains(&other) {
                out.push(other);
            }
        }
        out
    }

    /// The node at the opposite end of `edge` from `node`.
    pub fn other_end(&self, edge: EdgeId, node: NodeId) -> NodeId {
        let e = &self.edges[edge];
        if e.start == node {
            e.end
        } else {
            e.start
        }
    }

    /// Edges touching the start and end of `edge`.
    pub fn connections(&self, edge: EdgeId) -> Connections {
        let e = &self.edges[edge];
        let others = |node: NodeId| -> Vec<EdgeId> {
            self.incident[node]
                .iter()
                .copied()
                .filter(|&other| other != edge)
                .collect()
        };
        Connections {
            start: others(e.start),
            end: others(e.end),
        }
    }

    /// Canonical segments in edge order.
    pub fn segments(&self) -> Vec<Segment> {
        self.edges.iter().map(|e| e.segment).collect()
    }
}
