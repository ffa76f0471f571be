//! Segment and orientation types.

use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, GeometryResult};

/// 3D point type
pub type Point3 = na::Point3<f64>;

/// 3D vector type
pub type Vector3 = na::Vector3<f64>;

/// Orientation class of a segment relative to the world up-axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// X and Y of both endpoints match
    Vertical,
    /// Z of both endpoints matches
    Horizontal,
    /// Neither vertical nor horizontal
    Angled,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertical => write!(f, "vertical"),
            Self::Horizontal => write!(f, "horizontal"),
            Self::Angled => write!(f, "angled"),
        }
    }
}

/// A single straight line of the toolpath.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Point3,
    pub to: Point3,
}

impl Segment {
    /// Creates a new segment.
    pub fn new(from: Point3, to: Point3) -> Self {
        Self { from, to }
    }

    /// Creates a segment from raw coordinates.
    pub fn from_coords(from: [f64; 3], to: [f64; 3]) -> Self {
        Self {
            from: Point3::new(from[0], from[1], from[2]),
            to: Point3::new(to[0], to[1], to[2]),
        }
    }

    /// Vector from `from` to `to`.
    pub fn vector(&self) -> Vector3 {
        self.to - self.from
    }

    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// Unit direction, or `None` for a zero-length segment.
    pub fn direction(&self) -> Option<Vector3> {
        let v = self.vector();
        let len = v.norm();
        if len > f64::EPSILON && len.is_finite() {
            Some(v / len)
        } else {
            None
        }
    }

    pub fn midpoint(&self) -> Point3 {
        na::center(&self.from, &self.to)
    }

    /// Point at normalized parameter `t` (0 = from, 1 = to).
    pub fn point_at(&self, t: f64) -> Point3 {
        self.from + self.vector() * t
    }

    pub fn min_z(&self) -> f64 {
        self.from.z.min(self.to.z)
    }

    pub fn max_z(&self) -> f64 {
        self.from.z.max(self.to.z)
    }

    /// The same segment traversed the other way.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }

    /// A copy running from the lower-Z endpoint to the higher one.
    ///
    /// Segments at equal Z keep their direction.
    pub fn canonical(&self) -> Self {
        if self.from.z > self.to.z {
            self.reversed()
        } else {
            *self
        }
    }

    /// Rejects segments that cannot be classified or matched.
    pub fn validate(&self, position_tolerance: f64) -> GeometryResult<()> {
        for (name, p) in [("from", &self.from), ("to", &self.to)] {
            if !p.coords.iter().all(|c| c.is_finite()) {
                return Err(GeometryError::NonFinite {
                    reason: format!("{} = ({}, {}, {})", name, p.x, p.y, p.z),
                });
            }
        }
        let length = self.length();
        if length < position_tolerance {
            return Err(GeometryError::DegenerateSegment {
                length,
                tolerance: position_tolerance,
            });
        }
        Ok(())
    }
}

/// Split polylines into their consecutive point-pair segments.
///
/// Polylines with fewer than two points contribute nothing.
pub fn segments_from_polylines(polylines: &[Vec<Point3>]) -> Vec<Segment> {
    polylines
        .iter()
        .flat_map(|pl| pl.windows(2).map(|w| Segment::new(w[0], w[1])))
        .collect()
}
