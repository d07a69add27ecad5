use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{BodyError, BodyField};

use super::{body::Collidable, types::normalize_angle, Aabb};

/// Spherical body. Kinematic fields are optional so that a body which has not
/// been placed yet is distinguishable from one sitting at the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    id: String,
    radius: f64,
    position: Option<DVec3>,
    velocity: Option<DVec3>,
    angle: Option<DVec3>,
    rotation: Option<DVec3>,
    bounding_box: Option<Aabb>,
    /// Immovable bodies take no impulse (inverse mass 0).
    pub is_static: bool,
}

impl Sphere {
    /// Sphere at rest at the origin with its bounding box computed.
    pub fn new(id: impl Into<String>, radius: f64) -> Self {
        Self {
            id: id.into(),
            radius,
            position: Some(DVec3::ZERO),
            velocity: Some(DVec3::ZERO),
            angle: Some(DVec3::ZERO),
            rotation: Some(DVec3::ZERO),
            bounding_box: Some(Aabb::around_sphere(DVec3::ZERO, radius)),
            is_static: false,
        }
    }

    /// Sphere with no kinematic state. Every getter reports `NotSet` until the
    /// matching setter runs.
    pub fn unplaced(id: impl Into<String>, radius: f64) -> Self {
        Self {
            id: id.into(),
            radius,
            position: None,
            velocity: None,
            angle: None,
            rotation: None,
            bounding_box: None,
            is_static: false,
        }
    }

    pub fn with_position(mut self, position: DVec3) -> Self {
        self.set_position(position);
        self
    }

    pub fn with_velocity(mut self, velocity: DVec3) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
        self.refresh_bounding_box();
    }

    /// Recomputes the bounding box from the current position. A sphere without
    /// a position keeps no box.
    pub fn refresh_bounding_box(&mut self) {
        self.bounding_box = self
            .position
            .map(|position| Aabb::around_sphere(position, self.radius));
    }

    /// Drops the cached box, e.g. after external code moved the body through
    /// a path that cannot keep it current.
    pub fn invalidate_bounding_box(&mut self) {
        self.bounding_box = None;
    }

    /// Inverse mass under the unit-mass model.
    pub fn inverse_mass(&self) -> f64 {
        if self.is_static {
            return 0.0;
        }
        let mass = crate::config::DEFAULT_BODY_MASS;
        if mass <= crate::config::MASS_EPSILON {
            0.0
        } else {
            1.0 / mass
        }
    }
}

impl Collidable for Sphere {
    fn id(&self) -> &str {
        &self.id
    }

    fn bounding_box(&self) -> Result<Aabb, BodyError> {
        self.bounding_box
            .ok_or_else(|| BodyError::not_set(&self.id, BodyField::BoundingBox))
    }

    fn position(&self) -> Result<DVec3, BodyError> {
        self.position
            .ok_or_else(|| BodyError::not_set(&self.id, BodyField::Position))
    }

    fn set_position(&mut self, position: DVec3) {
        self.position = Some(position);
        self.refresh_bounding_box();
    }

    fn velocity(&self) -> Result<DVec3, BodyError> {
        self.velocity
            .ok_or_else(|| BodyError::not_set(&self.id, BodyField::Velocity))
    }

    fn apply_velocity(&mut self, delta: DVec3) -> Result<(), BodyError> {
        let velocity = self
            .velocity
            .as_mut()
            .ok_or_else(|| BodyError::not_set(&self.id, BodyField::Velocity))?;
        *velocity += delta;
        Ok(())
    }

    fn angle(&self) -> Result<DVec3, BodyError> {
        self.angle
            .ok_or_else(|| BodyError::not_set(&self.id, BodyField::Angle))
    }

    fn set_angle(&mut self, angle: DVec3) {
        self.angle = Some(normalize_angle(angle));
    }

    fn rotation(&self) -> Result<DVec3, BodyError> {
        self.rotation
            .ok_or_else(|| BodyError::not_set(&self.id, BodyField::Rotation))
    }

    fn apply_rotation(&mut self, delta: DVec3) -> Result<(), BodyError> {
        let rotation = self
            .rotation
            .as_mut()
            .ok_or_else(|| BodyError::not_set(&self.id, BodyField::Rotation))?;
        *rotation += delta;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moving_a_sphere_recomputes_its_box() {
        let mut sphere = Sphere::new("a", 0.5);
        sphere.set_position(DVec3::new(2.0, -1.0, 3.0));
        let bb = sphere.bounding_box().unwrap();
        assert_eq!(bb.min, DVec3::new(1.5, -1.5, 2.5));
        assert_eq!(bb.max, DVec3::new(2.5, -0.5, 3.5));

        sphere.set_radius(1.0);
        assert_eq!(sphere.bounding_box().unwrap().min, DVec3::new(1.0, -2.0, 2.0));
    }

    #[test]
    fn unplaced_sphere_reports_not_set() {
        let mut sphere = Sphere::unplaced("ghost", 1.0);
        assert_eq!(
            sphere.bounding_box(),
            Err(BodyError::not_set("ghost", BodyField::BoundingBox))
        );
        assert!(sphere.position().is_err());
        assert!(sphere.apply_velocity(DVec3::X).is_err());
        assert!(sphere.apply_rotation(DVec3::X).is_err());

        sphere.set_position(DVec3::ONE);
        assert!(sphere.bounding_box().is_ok());
    }

    #[test]
    fn apply_velocity_accumulates() {
        let mut sphere = Sphere::new("a", 1.0).with_velocity(DVec3::new(1.0, 0.0, 0.0));
        sphere.apply_velocity(DVec3::new(-0.25, 0.5, 0.0)).unwrap();
        assert_eq!(sphere.velocity().unwrap(), DVec3::new(0.75, 0.5, 0.0));
    }

    #[test]
    fn static_sphere_has_zero_inverse_mass() {
        assert_eq!(Sphere::new("a", 1.0).inverse_mass(), 1.0);
        assert_eq!(Sphere::new("a", 1.0).with_static(true).inverse_mass(), 0.0);
    }

    #[test]
    fn set_angle_wraps_whole_turns() {
        let mut sphere = Sphere::new("a", 1.0);
        sphere.set_angle(DVec3::new(370.0, 0.0, -720.5));
        assert_eq!(sphere.angle().unwrap(), DVec3::new(10.0, 0.0, -0.5));
    }
}
