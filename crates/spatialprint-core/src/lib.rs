//! # SpatialPrint Core
//!
//! Core geometry types and tolerance-aware predicates for SpatialPrint.
//! Everything downstream treats a toolpath as a bag of straight 3D segments;
//! this crate defines those segments, how they are classified against the
//! world up-axis, and how points are compared under floating-point tolerance.

pub mod error;
pub mod geometry;
pub mod predicates;
pub mod tolerance;

pub use error::{GeometryError, GeometryResult};
pub use geometry::{segments_from_polylines, Orientation, Point3, Segment, Vector3};
pub use predicates::{
    classify, closest_point_on_segment, point_on_segment, points_equal, shared_endpoint,
    vectors_equal, SharedEndpoint,
};
pub use tolerance::Tolerances;
