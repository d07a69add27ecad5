use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box. `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Box enclosing a sphere of `radius` centred at `center`.
    pub fn around_sphere(center: DVec3, radius: f64) -> Self {
        Self {
            min: center - DVec3::splat(radius),
            max: center + DVec3::splat(radius),
        }
    }

    /// Inclusive interval overlap on the X axis.
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && other.min.x <= self.max.x
    }

    /// Inclusive interval overlap on the Y and Z axes.
    pub fn overlaps_yz(&self, other: &Aabb) -> bool {
        self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && self.overlaps_yz(other)
    }
}

/// Wraps each component of an Euler angle (degrees) into `(-360, 360)`,
/// dropping whole turns and keeping the sign.
pub fn normalize_angle(angle: DVec3) -> DVec3 {
    DVec3::new(angle.x % 360.0, angle.y % 360.0, angle.z % 360.0)
}
