//! Tolerance-based geometric predicates.
//!
//! All comparisons are per-axis absolute tests (`|a - b| < tol`), which keeps
//! them symmetric in their arguments and independent of segment direction.

use crate::error::GeometryResult;
use crate::geometry::{Orientation, Point3, Segment, Vector3};
use crate::tolerance::Tolerances;

/// Outcome of looking for a common endpoint between two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SharedEndpoint {
    /// The segments meet at this point (taken from the first segment)
    Shared(Point3),
    /// No endpoint of one lies on an endpoint of the other
    Disjoint,
}

impl SharedEndpoint {
    pub fn point(&self) -> Option<Point3> {
        match self {
            Self::Shared(p) => Some(*p),
            Self::Disjoint => None,
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared(_))
    }
}

/// Per-axis point equality.
pub fn points_equal(a: &Point3, b: &Point3, tol: f64) -> bool {
    (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol && (a.z - b.z).abs() < tol
}

/// Per-component vector equality.
pub fn vectors_equal(a: &Vector3, b: &Vector3, tol: f64) -> bool {
    (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol && (a.z - b.z).abs() < tol
}

/// Classify a segment against the world up-axis.
///
/// Zero-length segments are rejected before any axis test. The horizontal
/// test runs before the vertical one, so a very short segment whose every
/// delta is under the orientation tolerance classifies as horizontal.
pub fn classify(segment: &Segment, tol: &Tolerances) -> GeometryResult<Orientation> {
    segment.validate(tol.position)?;

    let d = segment.vector();
    if d.z.abs() < tol.orientation {
        Ok(Orientation::Horizontal)
    } else if d.x.abs() < tol.orientation && d.y.abs() < tol.orientation {
        Ok(Orientation::Vertical)
    } else {
        Ok(Orientation::Angled)
    }
}

/// Find an endpoint common to both segments.
pub fn shared_endpoint(a: &Segment, b: &Segment, tol: f64) -> SharedEndpoint {
    for pa in [&a.from, &a.to] {
        for pb in [&b.from, &b.to] {
            if points_equal(pa, pb, tol) {
                return SharedEndpoint::Shared(*pa);
            }
        }
    }
    SharedEndpoint::Disjoint
}

/// Closest point to `p` on the bounded segment.
pub fn closest_point_on_segment(segment: &Segment, p: &Point3) -> Point3 {
    let v = segment.vector();
    let len_sq = v.norm_squared();
    if len_sq <= f64::EPSILON {
        return segment.from;
    }
    let t = ((p - segment.from).dot(&v) / len_sq).clamp(0.0, 1.0);
    segment.point_at(t)
}

/// `p` lies on the segment within tolerance.
pub fn point_on_segment(segment: &Segment, p: &Point3, tol: f64) -> bool {
    points_equal(&closest_point_on_segment(segment, p), p, tol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tol() -> Tolerances {
        Tolerances::default()
    }

    #[test]
    fn test_classify_basic_orientations() {
        let vertical = Segment::from_coords([0.0, 0.0, 0.0], [0.0, 0.0, 10.0]);
        let horizontal = Segment::from_coords([0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let angled = Segment::from_coords([0.0, 0.0, 0.0], [5.0, 5.0, 10.0]);

        assert_eq!(classify(&vertical, &tol()).unwrap(), Orientation::Vertical);
        assert_eq!(
            classify(&horizontal, &tol()).unwrap(),
            Orientation::Horizontal
        );
        assert_eq!(classify(&angled, &tol()).unwrap(), Orientation::Angled);
    }

    #[test]
    fn test_classify_rejects_zero_length() {
        let seg = Segment::from_coords([3.0, 3.0, 3.0], [3.0, 3.0, 3.0]);
        assert!(classify(&seg, &tol()).unwrap_err().is_degenerate());
    }

    #[test]
    fn test_classify_within_orientation_tolerance() {
        // Slightly off-plumb post still reads as vertical
        let seg = Segment::from_coords([0.0, 0.0, 0.0], [0.005, -0.004, 20.0]);
        assert_eq!(classify(&seg, &tol()).unwrap(), Orientation::Vertical);
    }

    #[test]
    fn test_shared_endpoint() {
        let a = Segment::from_coords([0.0, 0.0, 0.0], [0.0, 0.0, 10.0]);
        let b = Segment::from_coords([5.0, 5.0, 0.0], [0.0, 0.0, 10.0004]);
        let c = Segment::from_coords([7.0, 7.0, 7.0], [8.0, 8.0, 8.0]);

        assert_eq!(
            shared_endpoint(&a, &b, 1e-3),
            SharedEndpoint::Shared(Point3::new(0.0, 0.0, 10.0))
        );
        assert_eq!(shared_endpoint(&a, &c, 1e-3), SharedEndpoint::Disjoint);
        assert!(shared_endpoint(&a, &c, 1e-3).point().is_none());
    }

    #[test]
    fn test_closest_point_is_bounded() {
        let seg = Segment::from_coords([0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let p = closest_point_on_segment(&seg, &Point3::new(15.0, 3.0, 0.0));
        assert_eq!(p, Point3::new(10.0, 0.0, 0.0));
        assert!(point_on_segment(&seg, &Point3::new(4.0, 0.0, 0.0), 1e-6));
        assert!(!point_on_segment(&seg, &Point3::new(4.0, 0.1, 0.0), 1e-3));
    }

    fn coord() -> impl Strategy<Value = f64> {
        -500.0f64..500.0
    }

    proptest! {
        #[test]
        fn prop_points_equal_is_symmetric(
            x in coord(), y in coord(), z in coord(),
            dx in -0.002f64..0.002, dy in -0.002f64..0.002, dz in -0.002f64..0.002,
        ) {
            let p = Point3::new(x, y, z);
            let q = Point3::new(x + dx, y + dy, z + dz);
            prop_assert_eq!(points_equal(&p, &q, 1e-3), points_equal(&q, &p, 1e-3));
        }

        #[test]
        fn prop_orientation_ignores_direction(
            ax in coord(), ay in coord(), az in coord(),
            bx in coord(), by in coord(), bz in coord(),
        ) {
            let seg = Segment::from_coords([ax, ay, az], [bx, by, bz]);
            let forward = classify(&seg, &Tolerances::default());
            let backward = classify(&seg.reversed(), &Tolerances::default());
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn prop_shared_endpoint_is_symmetric(
            x in coord(), y in coord(), z in coord(),
            ex in coord(), ey in coord(), ez in coord(),
        ) {
            let a = Segment::from_coords([x, y, z], [ex, ey, ez]);
            let b = Segment::from_coords([ex, ey, ez], [x + 1.0, y, z]);
            prop_assert_eq!(
                shared_endpoint(&a, &b, 1e-3).is_shared(),
                shared_endpoint(&b, &a, 1e-3).is_shared()
            );
        }
    }
}
