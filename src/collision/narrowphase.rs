use glam::DVec3;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    core::{Body, Collidable, Sphere},
    error::BodyError,
};

/// Confirmed intersection between two bodies. Lives for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub body_a: usize,
    pub body_b: usize,
    /// Unit vector from A toward B, or +X when the centres coincide.
    pub normal: DVec3,
    /// Overlap along the normal, never negative.
    pub depth: f64,
}

/// Separating-axis test. For two spheres the only candidate axis is the line
/// between the centres, so the test reduces to comparing the centre distance
/// with the sum of the radii.
pub struct SeparatingAxis;

impl SeparatingAxis {
    /// Tests the bodies at indices `index_a` and `index_b`. Bodies with
    /// missing state are logged and treated as not touching.
    pub fn test(index_a: usize, body_a: &Body, index_b: usize, body_b: &Body) -> Option<Contact> {
        match Self::collide(index_a, body_a, index_b, body_b) {
            Ok(contact) => contact,
            Err(err) => {
                warn!(
                    "narrow phase: skipping pair ({}, {}): {err}",
                    body_a.id(),
                    body_b.id()
                );
                None
            }
        }
    }

    /// Dispatches on the pair of body kinds.
    pub fn collide(
        index_a: usize,
        body_a: &Body,
        index_b: usize,
        body_b: &Body,
    ) -> Result<Option<Contact>, BodyError> {
        match (body_a, body_b) {
            (Body::Sphere(a), Body::Sphere(b)) => Self::sphere_sphere(index_a, a, index_b, b),
        }
    }

    fn sphere_sphere(
        index_a: usize,
        a: &Sphere,
        index_b: usize,
        b: &Sphere,
    ) -> Result<Option<Contact>, BodyError> {
        let center_a = a.position()?;
        let center_b = b.position()?;
        Ok(
            sphere_contact(center_a, a.radius(), center_b, b.radius()).map(|(normal, depth)| {
                Contact {
                    body_a: index_a,
                    body_b: index_b,
                    normal,
                    depth,
                }
            }),
        )
    }
}

/// Contact normal (A toward B) and penetration depth of two spheres, or
/// `None` when they are apart. Touching spheres count as a contact with
/// depth 0.
pub fn sphere_contact(
    center_a: DVec3,
    radius_a: f64,
    center_b: DVec3,
    radius_b: f64,
) -> Option<(DVec3, f64)> {
    let axis = center_b - center_a;
    let distance_sq = axis.length_squared();
    let sum_radii = radius_a + radius_b;
    if distance_sq > sum_radii * sum_radii {
        return None;
    }

    let distance = distance_sq.sqrt();
    if distance == 0.0 {
        return Some((DVec3::X, sum_radii));
    }

    Some((axis / distance, (sum_radii - distance).max(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn overlapping_spheres_report_depth() {
        let (normal, depth) =
            sphere_contact(DVec3::new(-0.95, 0.0, 0.0), 1.0, DVec3::new(0.95, 0.0, 0.0), 1.0)
                .expect("spheres overlap");
        assert_relative_eq!(depth, 0.1, epsilon = 1e-12);
        assert_relative_eq!(normal.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(normal.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn separated_spheres_do_not_collide() {
        assert!(sphere_contact(DVec3::ZERO, 1.0, DVec3::new(0.0, 2.5, 0.0), 1.0).is_none());
    }

    #[test]
    fn touching_spheres_collide_with_zero_depth() {
        let (normal, depth) =
            sphere_contact(DVec3::ZERO, 1.0, DVec3::new(0.0, 0.0, 2.0), 1.0).unwrap();
        assert_eq!(depth, 0.0);
        assert_eq!(normal, DVec3::Z);
    }

    #[test]
    fn coincident_centres_use_fixed_axis() {
        let (normal, depth) = sphere_contact(DVec3::ONE, 0.5, DVec3::ONE, 0.75).unwrap();
        assert_eq!(normal, DVec3::X);
        assert_eq!(depth, 1.25);
    }

    #[test]
    fn unplaced_body_is_skipped() {
        let a: Body = Sphere::new("a", 1.0).into();
        let b: Body = Sphere::unplaced("b", 1.0).into();
        assert!(SeparatingAxis::collide(0, &a, 1, &b).is_err());
        assert!(SeparatingAxis::test(0, &a, 1, &b).is_none());
    }
}
