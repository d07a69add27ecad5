use glam::DVec3;
use log::warn;

use crate::{
    config::{SolverSettings, COINCIDENT_EPSILON},
    core::{Body, Collidable, Sphere},
    error::{CollisionError, Result},
};

/// What a single pair resolution did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// At least one impulse changed the velocities.
    Applied { impulses: u32 },
    /// In contact but already separating; velocities untouched.
    Separating,
    /// The bodies do not overlap.
    NoContact,
    /// Neither body can move.
    Immovable,
    /// A body was missing state; logged and left alone.
    Skipped,
}

impl Resolution {
    pub fn applied(&self) -> bool {
        matches!(self, Resolution::Applied { .. })
    }
}

/// Sequential-impulse (temporal Gauss-Seidel) contact solver. Each
/// sub-iteration reads the velocities written by the previous one, so the
/// loop for a pair must stay sequential.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpulseSolver {
    pub settings: SolverSettings,
}

impl ImpulseSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    /// Resolves the pair at indices `index_a` / `index_b`. The indices only
    /// identify the bodies; a pair naming one body twice is rejected.
    pub fn resolve(
        &self,
        index_a: usize,
        body_a: &mut Body,
        index_b: usize,
        body_b: &mut Body,
    ) -> Result<Resolution> {
        if index_a == index_b {
            return Err(CollisionError::SelfPair {
                index: index_a,
                id: body_a.id().to_owned(),
            });
        }

        match (body_a, body_b) {
            (Body::Sphere(a), Body::Sphere(b)) => Ok(self.resolve_spheres(a, b)),
        }
    }

    fn resolve_spheres(&self, a: &mut Sphere, b: &mut Sphere) -> Resolution {
        let Some((pos_a, mut vel_a)) = kinematics(a) else {
            return Resolution::Skipped;
        };
        let Some((pos_b, mut vel_b)) = kinematics(b) else {
            return Resolution::Skipped;
        };

        // Points from B toward A.
        let mut separation = pos_a - pos_b;
        let distance_sq = separation.length_squared();
        let sum_radii = a.radius() + b.radius();
        if distance_sq > sum_radii * sum_radii {
            return Resolution::NoContact;
        }

        let mut distance = distance_sq.sqrt();
        if distance < COINCIDENT_EPSILON {
            separation = DVec3::X;
            distance = 1.0;
        }
        let normal = separation / distance;

        let inv_mass_a = a.inverse_mass();
        let inv_mass_b = b.inverse_mass();
        if inv_mass_a == 0.0 && inv_mass_b == 0.0 {
            return Resolution::Immovable;
        }
        let inv_mass_sum = inv_mass_a + inv_mass_b;

        let penetration = sum_radii - distance;
        let SolverSettings {
            iterations,
            restitution,
            slop,
            baumgarte_bias,
            position_correction,
        } = self.settings;

        let mut impulses = 0;
        for _ in 0..iterations {
            let relative_velocity = (vel_a - vel_b).dot(normal);

            let bias = if penetration > slop {
                baumgarte_bias / f64::from(iterations) * (penetration - slop)
            } else {
                0.0
            };

            if relative_velocity >= 0.0 && bias == 0.0 {
                continue;
            }

            // The bias adds separating velocity, it never pulls bodies together.
            let impulse = -((1.0 + restitution) * relative_velocity - bias) / inv_mass_sum;
            if impulse <= 0.0 {
                continue;
            }

            let delta_a = normal * (impulse * inv_mass_a);
            let delta_b = -normal * (impulse * inv_mass_b);
            if let Err(err) = a.apply_velocity(delta_a) {
                warn!("resolver: cannot update velocity of {}: {err}", a.id());
            }
            if let Err(err) = b.apply_velocity(delta_b) {
                warn!("resolver: cannot update velocity of {}: {err}", b.id());
            }
            vel_a += delta_a;
            vel_b += delta_b;
            impulses += 1;
        }

        if position_correction > 0.0 {
            correct_position(
                a,
                b,
                normal,
                penetration,
                slop,
                position_correction,
                inv_mass_sum,
            );
        }

        if impulses > 0 {
            Resolution::Applied { impulses }
        } else {
            Resolution::Separating
        }
    }
}

fn kinematics(sphere: &Sphere) -> Option<(DVec3, DVec3)> {
    match (sphere.position(), sphere.velocity()) {
        (Ok(position), Ok(velocity)) => Some((position, velocity)),
        (Err(err), _) | (_, Err(err)) => {
            warn!("resolver: skipping body {}: {err}", sphere.id());
            None
        }
    }
}

/// Pushes the spheres apart along `normal` (B toward A) by the fraction
/// `factor` of the penetration beyond `slop`, split by inverse mass.
fn correct_position(
    a: &mut Sphere,
    b: &mut Sphere,
    normal: DVec3,
    penetration: f64,
    slop: f64,
    factor: f64,
    inv_mass_sum: f64,
) {
    let correction = (penetration - slop).max(0.0) * factor;
    if correction == 0.0 {
        return;
    }
    let push = normal * (correction / inv_mass_sum);

    if let Ok(position) = a.position() {
        let inv_mass = a.inverse_mass();
        if inv_mass > 0.0 {
            a.set_position(position + push * inv_mass);
        }
    }
    if let Ok(position) = b.position() {
        let inv_mass = b.inverse_mass();
        if inv_mass > 0.0 {
            b.set_position(position - push * inv_mass);
        }
    }
}
