//! Post-and-brace pairing and chain assembly.
//!
//! A pair is one vertical post plus one angled brace meeting at the top of
//! the post. Pairs are linked into chains by walking from one pair's free
//! brace end to the next pair's post foot, giving a continuous
//! post, brace, post, brace path.

use std::collections::VecDeque;

use serde::Serialize;
use spatialprint_core::{point_on_segment, points_equal, Orientation, Point3, Tolerances};
use tracing::debug;

use crate::cluster::Cluster;
use crate::graph::{EdgeId, SpatialGraph};

/// A vertical edge matched with an angled edge sharing its highest point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VerticalAngledPair {
    pub vertical: EdgeId,
    pub angled: EdgeId,
    /// Foot of the post
    pub base: Point3,
    /// Highest of the four endpoints, on both edges
    pub apex: Point3,
    /// Brace endpoint away from the apex
    pub free_end: Point3,
}

impl VerticalAngledPair {
    /// The pair as a three-point polyline.
    pub fn points(&self) -> [Point3; 3] {
        [self.base, self.apex, self.free_end]
    }
}

/// Greedily match verticals with angled edges inside one cluster.
///
/// Verticals are visited in cluster order and take the first unconsumed
/// angled edge whose highest shared point lies on both edges. The result is
/// order dependent and not a maximum matching.
pub fn pair_verticals_with_angled(
    graph: &SpatialGraph,
    cluster: &Cluster,
    tol: &Tolerances,
) -> Vec<VerticalAngledPair> {
    let of_kind = |kind: Orientation| -> Vec<EdgeId> {
        cluster
            .edges
            .iter()
            .copied()
            .filter(|&e| graph.edge(e).orientation == kind)
            .collect()
    };
    let verticals = of_kind(Orientation::Vertical);
    let angled = of_kind(Orientation::Angled);
    let mut used = vec![false; angled.len()];
    let mut pairs = Vec::new();

    for &v in &verticals {
        let post = graph.edge(v).segment;
        for (slot, &a) in angled.iter().enumerate() {
            if used[slot] {
                continue;
            }
            let brace = graph.edge(a).segment;

            let mut apex = post.from;
            for p in [post.to, brace.from, brace.to] {
                if p.z > apex.z {
                    apex = p;
                }
            }
            if !point_on_segment(&post, &apex, tol.position)
                || !point_on_segment(&brace, &apex, tol.position)
            {
                continue;
            }

            let free_end = if nalgebra::distance(&brace.from, &apex)
                > nalgebra::distance(&brace.to, &apex)
            {
                brace.from
            } else {
                brace.to
            };
            let base = if points_equal(&post.from, &apex, tol.position) {
                post.to
            } else {
                post.from
            };

            used[slot] = true;
            pairs.push(VerticalAngledPair {
                vertical: v,
                angled: a,
                base,
                apex,
                free_end,
            });
            break;
        }
    }

    pairs
}

/// An ordered run of linked pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chain {
    /// Indices into the pair list, in walking order
    pub pairs: Vec<usize>,
    /// Polyline through every pair, with shared link points listed once
    pub points: Vec<Point3>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainEnd {
    /// Next pair's post foot must touch the last point
    Tail,
    /// Next pair's brace end must touch the first point
    Head,
}

impl ChainEnd {
    fn toggle(self) -> Self {
        match self {
            Self::Tail => Self::Head,
            Self::Head => Self::Tail,
        }
    }
}

/// Link pairs end to end into maximal chains.
///
/// Each chain starts from the first unused pair and then alternates between
/// extending its tail and its head until neither end can grow. Every pair
/// ends up in exactly one chain.
pub fn assemble_chains(pairs: &[VerticalAngledPair], tol: &Tolerances) -> Vec<Chain> {
    let mut used = vec![false; pairs.len()];
    let mut chains = Vec::new();

    for seed in 0..pairs.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let mut order: VecDeque<usize> = VecDeque::from([seed]);
        let mut points: VecDeque<Point3> = VecDeque::from(pairs[seed].points());

        let mut end = ChainEnd::Tail;
        let mut misses = 0;
        while misses < 2 {
            let extended = match end {
                ChainEnd::Tail => {
                    let tail = points.back().copied();
                    let next = tail.and_then(|t| {
                        (0..pairs.len())
                            .find(|&i| !used[i] && points_equal(&pairs[i].base, &t, tol.position))
                    });
                    if let Some(i) = next {
                        used[i] = true;
                        order.push_back(i);
                        points.push_back(pairs[i].apex);
                        points.push_back(pairs[i].free_end);
                    }
                    next.is_some()
                }
                ChainEnd::Head => {
                    let head = points.front().copied();
                    let next = head.and_then(|h| {
                        (0..pairs.len()).find(|&i| {
                            !used[i] && points_equal(&pairs[i].free_end, &h, tol.position)
                        })
                    });
                    if let Some(i) = next {
                        used[i] = true;
                        order.push_front(i);
                        points.push_front(pairs[i].apex);
                        points.push_front(pairs[i].base);
                    }
                    next.is_some()
                }
            };

            misses = if extended { 0 } else { misses + 1 };
            end = end.toggle();
        }

        chains.push(Chain {
            pairs: order.into(),
            points: points.into(),
        });
    }

    debug!("Assembled {} chains from {} pairs", chains.len(), pairs.len());
    chains
}
