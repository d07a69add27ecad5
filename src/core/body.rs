use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::BodyError;

use super::{sphere::Sphere, Aabb};

/// Capabilities the pipeline needs from any body shape.
pub trait Collidable {
    fn id(&self) -> &str;

    fn bounding_box(&self) -> Result<Aabb, BodyError>;

    fn position(&self) -> Result<DVec3, BodyError>;
    /// Moves the body and recomputes its bounding box.
    fn set_position(&mut self, position: DVec3);

    fn velocity(&self) -> Result<DVec3, BodyError>;
    /// Adds `delta` to the current velocity.
    fn apply_velocity(&mut self, delta: DVec3) -> Result<(), BodyError>;

    fn angle(&self) -> Result<DVec3, BodyError>;
    fn set_angle(&mut self, angle: DVec3);

    fn rotation(&self) -> Result<DVec3, BodyError>;
    /// Adds `delta` to the current angular rate.
    fn apply_rotation(&mut self, delta: DVec3) -> Result<(), BodyError>;
}

/// Discriminant of a [`Body`], used by the kind-dispatched sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BodyKind {
    Sphere,
}

impl BodyKind {
    pub const ALL: [BodyKind; 1] = [BodyKind::Sphere];
}

/// Closed family of simulated bodies. New shapes become new variants; the
/// narrow phase and resolver match on variant pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Body {
    Sphere(Sphere),
}

impl Body {
    pub fn kind(&self) -> BodyKind {
        match self {
            Body::Sphere(_) => BodyKind::Sphere,
        }
    }

    /// Per-tick refresh of the derived bounding box.
    pub fn refresh_bounding_box(&mut self) {
        match self {
            Body::Sphere(sphere) => sphere.refresh_bounding_box(),
        }
    }

    pub fn inverse_mass(&self) -> f64 {
        match self {
            Body::Sphere(sphere) => sphere.inverse_mass(),
        }
    }

    /// Sort key for the spatial sorter. Bodies without a box sort last.
    pub fn sort_key(&self) -> f64 {
        self.bounding_box()
            .map(|bb| bb.min.x)
            .unwrap_or(f64::INFINITY)
    }

    fn shape(&self) -> &dyn Collidable {
        match self {
            Body::Sphere(sphere) => sphere,
        }
    }

    fn shape_mut(&mut self) -> &mut dyn Collidable {
        match self {
            Body::Sphere(sphere) => sphere,
        }
    }
}

impl From<Sphere> for Body {
    fn from(sphere: Sphere) -> Self {
        Body::Sphere(sphere)
    }
}

impl Collidable for Body {
    fn id(&self) -> &str {
        self.shape().id()
    }

    fn bounding_box(&self) -> Result<Aabb, BodyError> {
        self.shape().bounding_box()
    }

    fn position(&self) -> Result<DVec3, BodyError> {
        self.shape().position()
    }

    fn set_position(&mut self, position: DVec3) {
        self.shape_mut().set_position(position);
    }

    fn velocity(&self) -> Result<DVec3, BodyError> {
        self.shape().velocity()
    }

    fn apply_velocity(&mut self, delta: DVec3) -> Result<(), BodyError> {
        self.shape_mut().apply_velocity(delta)
    }

    fn angle(&self) -> Result<DVec3, BodyError> {
        self.shape().angle()
    }

    fn set_angle(&mut self, angle: DVec3) {
        self.shape_mut().set_angle(angle);
    }

    fn rotation(&self) -> Result<DVec3, BodyError> {
        self.shape().rotation()
    }

    fn apply_rotation(&mut self, delta: DVec3) -> Result<(), BodyError> {
        self.shape_mut().apply_rotation(delta)
    }
}
