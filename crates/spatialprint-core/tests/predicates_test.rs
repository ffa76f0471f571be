use spatialprint_core::{
    classify, segments_from_polylines, shared_endpoint, Orientation, Point3, Segment, Tolerances,
};

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

#[test]
fn test_square_base_classification() {
    let tol = Tolerances::default();
    let orientations: Vec<Orientation> = square_with_post_and_brace()
        .iter()
        .map(|s| classify(s, &tol).unwrap())
        .collect();

    assert_eq!(
        orientations,
        vec![
            Orientation::Horizontal,
            Orientation::Horizontal,
            Orientation::Horizontal,
            Orientation::Horizontal,
            Orientation::Vertical,
            Orientation::Angled,
        ]
    );
}

#[test]
fn test_post_and_brace_share_top() {
    let segments = square_with_post_and_brace();
    let shared = shared_endpoint(&segments[4], &segments[5], 1e-3);
    assert_eq!(shared.point(), Some(Point3::new(0.0, 0.0, 10.0)));
}

#[test]
fn test_polyline_split_preserves_order() {
    let polyline = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 10.0),
        Point3::new(10.0, 10.0, 0.0),
    ];
    let segments = segments_from_polylines(&[polyline]);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].to, segments[1].from);
}

#[test]
fn test_segment_serializes_as_coordinate_arrays() {
    let seg = Segment::from_coords([1.0, 2.0, 3.0], [4.0, 5.0, 6.0]);
    let json = serde_json::to_string(&seg).unwrap();
    let back: Segment = serde_json::from_str(&json).unwrap();
    assert_eq!(back, seg);
}
