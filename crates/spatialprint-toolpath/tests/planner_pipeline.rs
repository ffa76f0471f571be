use spatialprint_core::{Orientation, Segment};
use spatialprint_settings::Config;
use spatialprint_toolpath::{ToolpathPlanner, WAYPOINTS_PER_SEGMENT};

/// 10 x 10 square base, a post at the origin corner, and a brace from the
/// post top down to the opposite base corner.
fn square_with_post_and_brace() -> Vec<Segment> {
    vec![
        Segment::from_coords([0.0, 0.0, 0.0], [10.0, 0.0, 0.0]),
        Segment::from_coords([10.0, 0.0, 0.0], [10.0, 10.0, 0.0]),
        Segment::from_coords([10.0, 10.0, 0.0], [0.0, 10.0, 0.0]),
        Segment::from_coords([0.0, 10.0, 0.0], [0.0, 0.0, 0.0]),
        Segment::from_coords([0.0, 0.0, 0.0], [0.0, 0.0, 10.0]),
        Segment::from_coords([0.0, 0.0, 10.0], [10.0, 10.0, 0.0]),
    ]
}

fn planner() -> ToolpathPlanner {
    ToolpathPlanner::new(Config::default()).unwrap()
}

#[test]
fn test_square_post_and_brace() {
    let plan = planner().plan(&square_with_post_and_brace()).unwrap();

    assert!(plan.skipped.is_empty());
    assert!(plan.cleanup_skipped.is_empty());
    assert_eq!(plan.ordered.len(), 6);

    let horizontal: Vec<_> = plan
        .ordered
        .iter()
        .filter(|w| w.orientation == Orientation::Horizontal)
        .collect();
    assert_eq!(horizontal.len(), 4);
    assert!(horizontal.iter().all(|w| w.weight == 0.9));

    let post = plan
        .ordered
        .iter()
        .position(|w| w.orientation == Orientation::Vertical)
        .unwrap();
    let brace = plan
        .ordered
        .iter()
        .position(|w| w.orientation == Orientation::Angled)
        .unwrap();
    assert!(post < brace);
    assert!(plan.ordered[post].weight < plan.ordered[brace].weight);
    assert_eq!(plan.ordered[post].weight, 9.5);
    assert_eq!(plan.ordered[brace].weight, 10.05);

    assert_eq!(plan.pairs.len(), 1);
    assert_eq!(plan.pairs[0].vertical, plan.ordered[post].edge);
    assert_eq!(plan.pairs[0].angled, plan.ordered[brace].edge);
    assert_eq!(plan.chains.len(), 1);
    assert_eq!(plan.clusters.len(), 1);
    assert!(plan.final_refinement.converged);
    assert_eq!(plan.waypoints.len(), 6 * WAYPOINTS_PER_SEGMENT);
}

#[test]
fn test_plan_is_deterministic() {
    let input = square_with_post_and_brace();
    let first = planner().plan(&input).unwrap();
    let second = planner().plan(&input).unwrap();
    assert_eq!(first.ordered, second.ordered);
    assert_eq!(first.chains, second.chains);
}

#[test]
fn test_collinear_halves_merge_and_keep_orientation() {
    for segments in [
        vec![
            Segment::from_coords([0.0, 0.0, 0.0], [0.0, 0.0, 5.0]),
            Segment::from_coords([0.0, 0.0, 5.0], [0.0, 0.0, 10.0]),
        ],
        vec![
            Segment::from_coords([0.0, 0.0, 0.0], [5.0, 0.0, 0.0]),
            Segment::from_coords([5.0, 0.0, 0.0], [10.0, 0.0, 0.0]),
        ],
    ] {
        let plan = planner().plan(&segments).unwrap();
        assert_eq!(plan.merged, 1);
        assert_eq!(plan.ordered.len(), 1);
        let merged = &plan.ordered[0];
        assert!((merged.segment.length() - 10.0).abs() < 1e-9);

        let half = spatialprint_core::classify(&segments[0], &Default::default()).unwrap();
        assert_eq!(merged.orientation, half);
    }
}

#[test]
fn test_longest_trail_over_square() {
    let trail = planner()
        .longest_trail(&square_with_post_and_brace())
        .unwrap();
    assert!(!trail.trail.truncated);
    // Square loop plus post and brace closing back onto the base
    assert_eq!(trail.trail.len(), 6);
    assert_eq!(trail.points.len(), 7);
}

#[test]
fn test_plan_serializes() {
    let plan = planner().plan(&square_with_post_and_brace()).unwrap();
    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["ordered"].as_array().unwrap().len(), 6);
    assert_eq!(json["ordered"][0]["orientation"], "horizontal");
    assert_eq!(json["waypoints"][2]["move_type"], "linear");
    assert_eq!(json["waypoints"][2]["events"][0]["kind"], "activate");
    assert!(json["cleanup_skipped"].as_array().unwrap().is_empty());
}

#[test]
fn test_waypoint_frames_follow_print_direction() {
    let plan = planner().plan(&square_with_post_and_brace()).unwrap();
    for (i, weighted) in plan.ordered.iter().enumerate() {
        let dir = weighted.segment.direction().unwrap();
        let start = &plan.waypoints[i * WAYPOINTS_PER_SEGMENT + 2];
        assert!(
            start.frame.y_axis.dot(&dir) > 0.99,
            "segment {} frame points away from its print direction",
            i
        );
    }
}
