//! Print frames and robot waypoints.
//!
//! The planner does not produce robot programs. It emits an ordered list of
//! oriented waypoints with the attributes a robot-program generator needs:
//! move type, speed, named activation events and an optional continuous axis
//! value.

use nalgebra as na;
use serde::{Deserialize, Serialize};
use spatialprint_core::{Point3, Segment, Vector3};
use spatialprint_settings::MotionSettings;
use tracing::{debug, warn};

/// Orthonormal right-handed frame.
///
/// The Y axis follows the print direction, X stays horizontal and Z is
/// `X × Y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub origin: Point3,
    pub x_axis: Vector3,
    pub y_axis: Vector3,
    pub z_axis: Vector3,
}

impl Frame {
    /// The same orientation at another origin.
    pub fn with_origin(&self, origin: Point3) -> Self {
        Self { origin, ..*self }
    }
}

/// Frame at parameter `t` along `segment`.
///
/// The print direction is tilted out of the horizontal plane by its
/// elevation, clamped to `max_tilt_degrees`. Vertical segments use world X
/// as the frame's X axis. Returns `None` for a zero-length segment.
pub fn frame_at(segment: &Segment, t: f64, max_tilt_degrees: f64) -> Option<Frame> {
    let dir = segment.direction()?;
    let up = Vector3::z();

    let horizontal = Vector3::new(dir.x, dir.y, 0.0);
    let (x_axis, heading) = match horizontal.try_normalize(1e-9) {
        Some(h) => (up.cross(&h), h),
        // Same handedness as the general case: heading = X × up
        None => (Vector3::x(), Vector3::x().cross(&up)),
    };

    let limit = max_tilt_degrees.to_radians();
    let elevation = dir.z.clamp(-1.0, 1.0).asin().clamp(-limit, limit);
    // Rotating the heading by -elevation about X lifts it towards +Z
    let tilt = na::Rotation3::from_axis_angle(&na::Unit::new_normalize(x_axis), -elevation);
    let y_axis = (tilt * heading).normalize();
    let z_axis = x_axis.cross(&y_axis);

    Some(Frame {
        origin: segment.point_at(t),
        x_axis,
        y_axis,
        z_axis,
    })
}

/// Frames at the start, the end, and parameters `t1` and `t2` of a segment.
pub fn key_frames(
    segment: &Segment,
    t1: f64,
    t2: f64,
    max_tilt_degrees: f64,
) -> Option<[Frame; 4]> {
    let base = frame_at(segment, 0.0, max_tilt_degrees)?;
    Some([
        base,
        base.with_origin(segment.point_at(1.0)),
        base.with_origin(segment.point_at(t1)),
        base.with_origin(segment.point_at(t2)),
    ])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveType {
    Joint,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Activate,
    Deactivate,
}

/// A named discrete tool event, such as switching extrusion on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationEvent {
    pub name: String,
    pub kind: EventKind,
}

/// A named continuous axis value, such as extrusion rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisValue {
    pub name: String,
    pub value: f64,
}

/// One robot target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Point3,
    pub frame: Frame,
    pub move_type: MoveType,
    pub speed: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<ActivationEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<AxisValue>,
    /// Index of the segment this waypoint belongs to
    pub segment: usize,
}

/// Waypoints per printed segment.
pub const WAYPOINTS_PER_SEGMENT: usize = 5;

/// Emit five waypoints per segment, in order.
///
/// 1. safe: above the start by `approach_offset + safe_offset`, joint move
/// 2. approach: above the start by `approach_offset`, linear
/// 3. start: extrusion switched on, print speed
/// 4. end: extrusion switched off
/// 5. retreat: above the end by `approach_offset + safe_offset`, joint move
///
/// Offsets are along world Z. Zero-length segments are skipped.
pub fn emit_waypoints(segments: &[Segment], motion: &MotionSettings) -> Vec<Waypoint> {
    let lift = |p: Point3, h: f64| p + Vector3::z() * h;
    let clearance = motion.approach_offset + motion.safe_offset;
    let axis = || {
        Some(AxisValue {
            name: motion.extrusion_axis.clone(),
            value: motion.extrusion_rate,
        })
    };
    let event = |kind| {
        vec![ActivationEvent {
            name: motion.extrude_event.clone(),
            kind,
        }]
    };

    let mut out = Vec::with_capacity(segments.len() * WAYPOINTS_PER_SEGMENT);
    for (index, segment) in segments.iter().enumerate() {
        let Some(frame) = frame_at(segment, 0.0, motion.max_tilt_degrees) else {
            warn!("Skipping waypoints for zero-length segment {}", index);
            continue;
        };
        let (start, end) = (segment.from, segment.to);

        let targets = [
            (lift(start, clearance), MoveType::Joint, motion.travel_speed, vec![], None),
            (
                lift(start, motion.approach_offset),
                MoveType::Linear,
                motion.travel_speed,
                vec![],
                None,
            ),
            (start, MoveType::Linear, motion.print_speed, event(EventKind::Activate), axis()),
            (end, MoveType::Linear, motion.print_speed, event(EventKind::Deactivate), axis()),
            (lift(end, clearance), MoveType::Joint, motion.travel_speed, vec![], None),
        ];

        for (position, move_type, speed, events, axis) in targets {
            out.push(Waypoint {
                position,
                frame: frame.with_origin(position),
                move_type,
                speed,
                events,
                axis,
                segment: index,
            });
        }
    }

    debug!("Emitted {} waypoints for {} segments", out.len(), segments.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_orthonormal(f: &Frame) {
        for v in [f.x_axis, f.y_axis, f.z_axis] {
            assert!((v.norm() - 1.0).abs() < EPS);
        }
        assert!(f.x_axis.dot(&f.y_axis).abs() < EPS);
        assert!(f.y_axis.dot(&f.z_axis).abs() < EPS);
        assert!((f.x_axis.cross(&f.y_axis) - f.z_axis).norm() < EPS);
    }

    #[test]
    fn test_horizontal_frame() {
        let s = Segment::from_coords([0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let f = frame_at(&s, 0.5, 90.0).unwrap();
        assert_orthonormal(&f);
        assert!((f.y_axis - Vector3::x()).norm() < EPS);
        assert!(f.x_axis.z.abs() < EPS);
        assert!((f.origin - Point3::new(5.0, 0.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn test_angled_frame_follows_direction() {
        let s = Segment::from_coords([0.0, 0.0, 0.0], [10.0, 0.0, 10.0]);
        let f = frame_at(&s, 0.0, 90.0).unwrap();
        assert_orthonormal(&f);
        let dir = s.direction().unwrap();
        assert!((f.y_axis - dir).norm() < EPS);
    }

    #[test]
    fn test_vertical_frame_uses_world_x() {
        let s = Segment::from_coords([0.0, 0.0, 0.0], [0.0, 0.0, 10.0]);
        let f = frame_at(&s, 0.0, 90.0).unwrap();
        assert_orthonormal(&f);
        assert!((f.x_axis - Vector3::x()).norm() < EPS);
        assert!((f.y_axis - Vector3::z()).norm() < EPS);
    }

    #[test]
    fn test_vertical_frame_points_up() {
        let s = Segment::from_coords([2.0, 3.0, 0.0], [2.0, 3.0, 10.0]);
        let f = frame_at(&s, 0.0, 90.0).unwrap();
        assert!(f.y_axis.z > 1.0 - EPS);
        assert!(f.y_axis.dot(&s.direction().unwrap()) > 1.0 - EPS);
    }

    #[test]
    fn test_steep_angled_frame_matches_vertical() {
        let steep = Segment::from_coords([0.0, 0.0, 0.0], [1.0, 0.0, 10.0]);
        let f = frame_at(&steep, 0.0, 90.0).unwrap();
        assert_orthonormal(&f);
        assert!((f.y_axis - steep.direction().unwrap()).norm() < EPS);

        let post = Segment::from_coords([0.0, 0.0, 0.0], [0.0, 0.0, 10.0]);
        let g = frame_at(&post, 0.0, 90.0).unwrap();
        // Both print upwards
        assert!(f.y_axis.dot(&g.y_axis) > 0.9);
    }

    #[test]
    fn test_tilt_is_clamped() {
        let s = Segment::from_coords([0.0, 0.0, 0.0], [0.0, 0.0, 10.0]);
        let f = frame_at(&s, 0.0, 45.0).unwrap();
        assert_orthonormal(&f);
        let elevation = f.y_axis.z.asin().to_degrees();
        assert!((elevation - 45.0).abs() < 1e-6);
    }

    #[test]
    fn test_key_frames_origins() {
        let s = Segment::from_coords([0.0, 0.0, 0.0], [0.0, 10.0, 0.0]);
        let frames = key_frames(&s, 0.25, 0.75, 90.0).unwrap();
        let ys: Vec<f64> = frames.iter().map(|f| f.origin.y).collect();
        assert_eq!(ys, vec![0.0, 10.0, 2.5, 7.5]);
    }

    #[test]
    fn test_five_waypoints_per_segment() {
        let motion = MotionSettings::default();
        let segments = vec![
            Segment::from_coords([0.0, 0.0, 0.0], [10.0, 0.0, 0.0]),
            Segment::from_coords([10.0, 0.0, 0.0], [10.0, 0.0, 10.0]),
        ];
        let wps = emit_waypoints(&segments, &motion);
        assert_eq!(wps.len(), 2 * WAYPOINTS_PER_SEGMENT);

        let first = &wps[..WAYPOINTS_PER_SEGMENT];
        assert_eq!(first[0].move_type, MoveType::Joint);
        assert_eq!(first[0].position.z, 150.0);
        assert_eq!(first[1].position.z, 100.0);
        assert_eq!(first[2].events[0].kind, EventKind::Activate);
        assert_eq!(first[2].speed, motion.print_speed);
        assert_eq!(first[3].events[0].kind, EventKind::Deactivate);
        assert_eq!(first[3].position, Point3::new(10.0, 0.0, 0.0));
        assert!(first[4].axis.is_none());
        assert_eq!(wps[5].segment, 1);
    }

    #[test]
    fn test_zero_length_segment_skipped() {
        let segments = vec![Segment::from_coords([1.0, 1.0, 1.0], [1.0, 1.0, 1.0])];
        assert!(emit_waypoints(&segments, &MotionSettings::default()).is_empty());
    }
}
