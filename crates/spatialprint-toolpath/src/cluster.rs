//! Connected-component clustering of graph edges.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::error::{PlannerError, PlannerResult};
use crate::graph::{EdgeId, SpatialGraph};

/// A group of edges processed together for pairing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Edge ids in ascending order
    pub edges: Vec<EdgeId>,
    /// Rounded band height, for band clusters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_band: Option<f64>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Stack-based DFS over edges that share a node, limited to edges for which
/// `allowed` holds. Components are seeded in edge order.
fn components<F>(graph: &SpatialGraph, allowed: F) -> Vec<Vec<EdgeId>>
where
    F: Fn(EdgeId) -> bool,
{
    let mut visited = vec![false; graph.edge_count()];
    let mut out = Vec::new();

    for seed in 0..graph.edge_count() {
        if visited[seed] || !allowed(seed) {
            continue;
        }
        visited[seed] = true;
        let mut stack = vec![seed];
        let mut component = Vec::new();

        while let Some(edge) = stack.pop() {
            component.push(edge);
            let e = graph.edge(edge);
            for node in [e.start, e.end] {
                for &next in graph.incident(node) {
                    if !visited[next] && allowed(next) {
                        visited[next] = true;
                        stack.push(next);
                    }
                }
            }
        }

        component.sort_unstable();
        out.push(component);
    }

    out
}

/// Partition the edges into connected components.
pub fn cluster_by_adjacency(graph: &SpatialGraph) -> Vec<Cluster> {
    let clusters: Vec<Cluster> = components(graph, |_| true)
        .into_iter()
        .map(|edges| Cluster {
            edges,
            z_band: None,
        })
        .collect();
    debug!("Found {} adjacency clusters", clusters.len());
    clusters
}

/// Bucket edges by midpoint height, then split each bucket into connected
/// components using only same-bucket adjacency.
///
/// The bucket of an edge is `round(mid_z / width) * width`. Clusters come out
/// in ascending band order.
pub fn cluster_by_z_band(graph: &SpatialGraph, width: f64) -> PlannerResult<Vec<Cluster>> {
    if !(width.is_finite() && width > 0.0) {
        return Err(PlannerError::InvalidInput(format!(
            "z band width must be positive, got {}",
            width
        )));
    }

    let band_of: Vec<i64> = graph
        .edges()
        .iter()
        .map(|e| (e.segment.midpoint().z / width).round() as i64)
        .collect();

    let bands: BTreeSet<i64> = band_of.iter().copied().collect();

    let mut clusters = Vec::new();
    for &band in &bands {
        for edges in components(graph, |e| band_of[e] == band) {
            clusters.push(Cluster {
                edges,
                z_band: Some(band as f64 * width),
            });
        }
    }

    debug!(
        "Found {} z-band clusters across {} bands",
        clusters.len(),
        bands.len()
    );
    Ok(clusters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spatialprint_core::{Segment, Tolerances};

    fn graph(segments: &[Segment]) -> SpatialGraph {
        SpatialGraph::build(segments, &Tolerances::default())
            .unwrap()
            .graph
    }

    #[test]
    fn test_adjacency_partitions_edges() {
        let g = graph(&[
            Segment::from_coords([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            Segment::from_coords([5.0, 5.0, 0.0], [6.0, 5.0, 0.0]),
            Segment::from_coords([1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
        ]);
        let clusters = cluster_by_adjacency(&g);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].edges, vec![0, 2]);
        assert_eq!(clusters[1].edges, vec![1]);

        let total: usize = clusters.iter().map(Cluster::len).sum();
        assert_eq!(total, g.edge_count());
    }

    #[test]
    fn test_z_band_splits_connected_layers() {
        // A post joins two rings but lives in its own band
        let g = graph(&[
            Segment::from_coords([0.0, 0.0, 0.0], [4.0, 0.0, 0.0]),
            Segment::from_coords([0.0, 0.0, 0.0], [0.0, 0.0, 4.0]),
            Segment::from_coords([0.0, 0.0, 4.0], [4.0, 0.0, 4.0]),
        ]);
        assert_eq!(cluster_by_adjacency(&g).len(), 1);

        let bands = cluster_by_z_band(&g, 1.0).unwrap();
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[0].z_band, Some(0.0));
        assert_eq!(bands[1].edges, vec![1]);
        assert_eq!(bands[2].z_band, Some(4.0));
    }

    #[test]
    fn test_z_band_rejects_bad_width() {
        let g = graph(&[Segment::from_coords([0.0, 0.0, 0.0], [1.0, 0.0, 0.0])]);
        assert!(cluster_by_z_band(&g, 0.0).is_err());
        assert!(cluster_by_z_band(&g, f64::NAN).is_err());
    }
}
