//! Collinear merge and overlap removal.
//!
//! Both passes work on plain segment and weight lists rather than on a graph:
//! merging changes the edge set, so the planner rebuilds its graph afterwards.
//! Segments are compared in their canonical (low Z to high Z) direction and
//! the returned segments are canonical too.
//!
//! Merging is greedy and order dependent. The first acceptable partner wins
//! and nothing is backtracked, so a different input order can produce a
//! different (equally valid) result.

use nalgebra as na;
use serde::Serialize;
use spatialprint_core::{
    classify, point_on_segment, points_equal, vectors_equal, Orientation, Point3, Segment,
    Tolerances,
};
use spatialprint_settings::CleanupSettings;
use tracing::debug;

use crate::error::{PlannerError, PlannerResult};

/// Output of a merge run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeOutcome {
    pub segments: Vec<Segment>,
    pub weights: Vec<f64>,
    /// Number of segment pairs joined
    pub merged: usize,
    /// Passes run (always 1 for [`combine_collinear`])
    pub passes: u32,
}

/// Output of overlap removal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemovalOutcome {
    pub segments: Vec<Segment>,
    pub weights: Vec<f64>,
    pub removed: usize,
}

fn check_lengths(segments: &[Segment], weights: &[f64]) -> PlannerResult<()> {
    if segments.len() != weights.len() {
        return Err(PlannerError::LengthMismatch {
            segments: segments.len(),
            weights: weights.len(),
        });
    }
    Ok(())
}

fn orientation_of(segment: &Segment, tol: &Tolerances) -> Option<Orientation> {
    classify(segment, tol).ok()
}

/// Parallel and pointing the same way.
fn same_direction(a: &Segment, b: &Segment, tol: f64) -> bool {
    match (a.direction(), b.direction()) {
        (Some(da), Some(db)) => vectors_equal(&da, &db, tol),
        _ => false,
    }
}

/// `point` is an endpoint of some horizontal segment outside `exclude`.
fn touches_other_horizontal(
    point: &Point3,
    segments: &[Segment],
    orientations: &[Option<Orientation>],
    exclude: [usize; 2],
    tol: f64,
) -> bool {
    segments.iter().enumerate().any(|(k, s)| {
        !exclude.contains(&k)
            && orientations[k] == Some(Orientation::Horizontal)
            && (points_equal(&s.from, point, tol) || points_equal(&s.to, point, tol))
    })
}

/// Join pairs of collinear segments that meet end to start.
///
/// Segment B is merged onto segment A when B starts where A ends, both run in
/// the same direction, the merged span is shorter than `max_merge_span`, and
/// no unrelated horizontal segment is attached at the link point. The merged
/// segment takes B's weight, plus `merged_vertical_bonus` when B is vertical.
///
/// A single greedy pass: a chain of three or more collinear pieces is only
/// partly collapsed. See [`combine_collinear_until_stable`].
pub fn combine_collinear(
    segments: &[Segment],
    weights: &[f64],
    tol: &Tolerances,
    cleanup: &CleanupSettings,
) -> PlannerResult<MergeOutcome> {
    check_lengths(segments, weights)?;

    let canon: Vec<Segment> = segments.iter().map(Segment::canonical).collect();
    let orientations: Vec<Option<Orientation>> =
        canon.iter().map(|s| orientation_of(s, tol)).collect();

    let mut consumed = vec![false; canon.len()];
    let mut emitted_at: Vec<Option<usize>> = vec![None; canon.len()];
    let mut out: Vec<Option<(Segment, f64)>> = Vec::with_capacity(canon.len());
    let mut merged = 0;

    for i in 0..canon.len() {
        if consumed[i] {
            continue;
        }
        let a = canon[i];

        let partner = (0..canon.len()).find(|&j| {
            if j == i || consumed[j] {
                return false;
            }
            let b = &canon[j];
            points_equal(&a.to, &b.from, tol.position)
                && same_direction(&a, b, tol.direction)
                && na::distance(&a.from, &b.to) < cleanup.max_merge_span
                && !touches_other_horizontal(&a.to, &canon, &orientations, [i, j], tol.position)
        });

        match partner {
            Some(j) => {
                let b = canon[j];
                let mut weight = weights[j];
                if orientations[j] == Some(Orientation::Vertical) {
                    weight += cleanup.merged_vertical_bonus;
                }
                out.push(Some((Segment::new(a.from, b.to), weight)));
                consumed[i] = true;
                consumed[j] = true;
                // B may already have been emitted on its own earlier in the pass
                if let Some(slot) = emitted_at[j] {
                    out[slot] = None;
                }
                merged += 1;
            }
            None => {
                emitted_at[i] = Some(out.len());
                out.push(Some((a, weights[i])));
            }
        }
    }

    let (segments, weights): (Vec<Segment>, Vec<f64>) = out.into_iter().flatten().unzip();
    Ok(MergeOutcome {
        segments,
        weights,
        merged,
        passes: 1,
    })
}

/// Repeat [`combine_collinear`] until a pass merges nothing or
/// `max_merge_passes` is reached.
pub fn combine_collinear_until_stable(
    segments: &[Segment],
    weights: &[f64],
    tol: &Tolerances,
    cleanup: &CleanupSettings,
) -> PlannerResult<MergeOutcome> {
    let mut current = combine_collinear(segments, weights, tol, cleanup)?;

    while current.merged > 0 && current.passes < cleanup.max_merge_passes {
        let next = combine_collinear(&current.segments, &current.weights, tol, cleanup)?;
        let total = current.merged + next.merged;
        let passes = current.passes + 1;
        let done = next.merged == 0;
        current = MergeOutcome {
            merged: total,
            passes,
            ..next
        };
        if done {
            break;
        }
    }

    debug!(
        "Merged {} collinear pairs in {} passes",
        current.merged, current.passes
    );
    Ok(current)
}

fn samples_on(sampled: &Segment, target: &Segment, tol: f64) -> bool {
    [0.2, 0.8]
        .iter()
        .all(|&t| point_on_segment(target, &sampled.point_at(t), tol))
}

/// Delete short segments lying along a longer one.
///
/// Two interior samples (20% and 80%) of one segment are projected onto the
/// other; when both land on it the shorter segment is removed, provided it is
/// under `short_segment_length`. Horizontal segments are never removed as the
/// covered segment. Non-vertical pairs must also be parallel.
pub fn remove_overlaps(
    segments: &[Segment],
    weights: &[f64],
    tol: &Tolerances,
    cleanup: &CleanupSettings,
) -> PlannerResult<RemovalOutcome> {
    check_lengths(segments, weights)?;

    let canon: Vec<Segment> = segments.iter().map(Segment::canonical).collect();
    let orientations: Vec<Option<Orientation>> =
        canon.iter().map(|s| orientation_of(s, tol)).collect();
    let short = cleanup.short_segment_length;
    let mut deleted = vec![false; canon.len()];

    for i in 0..canon.len() {
        for j in 0..canon.len() {
            if i == j || deleted[i] || deleted[j] {
                continue;
            }
            let (a, b) = (&canon[i], &canon[j]);
            match orientations[j] {
                None | Some(Orientation::Horizontal) => continue,
                Some(Orientation::Vertical) => {
                    if samples_on(b, a, tol.position) {
                        if b.length() < short {
                            deleted[j] = true;
                        }
                    } else if samples_on(a, b, tol.position) && a.length() < short {
                        deleted[i] = true;
                    }
                }
                Some(Orientation::Angled) => {
                    if same_direction(a, b, tol.direction) && samples_on(b, a, tol.position) {
                        if b.length() < short {
                            deleted[j] = true;
                        } else if a.length() < short {
                            deleted[i] = true;
                        }
                    }
                }
            }
        }
    }

    let removed = deleted.iter().filter(|d| **d).count();
    let (segments, weights): (Vec<Segment>, Vec<f64>) = canon
        .into_iter()
        .zip(weights.iter().copied())
        .zip(deleted)
        .filter(|(_, d)| !d)
        .map(|(pair, _)| pair)
        .unzip();

    debug!("Removed {} overlapping segments", removed);
    Ok(RemovalOutcome {
        segments,
        weights,
        removed,
    })
}
