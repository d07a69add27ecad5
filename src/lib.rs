//! Particle Collider – sphere collision pipeline for Rust.
//!
//! Each pass sorts bodies along X, finds overlapping bounding boxes with a
//! sweep-and-prune broad phase, confirms contacts with a separating-axis
//! test and resolves them with sequential impulses. Every stage can run
//! sequentially or on the rayon pool, either one stage at a time or fused
//! into the broad-phase workers.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod utils;
pub mod world;

use parking_lot::Mutex;

pub use glam::DVec3;

pub use collision::{CandidatePair, Contact, SeparatingAxis, SweepAndPrune, SweepInput};
pub use config::{
    BroadPhaseAlgorithm, ExecutionMode, NarrowPhaseAlgorithm, PipelineConfig, PipelineMode,
    ResolveAlgorithm, SolverSettings, SortAlgorithm,
};
pub use crate::core::{Aabb, Body, BodyKind, Collidable, Sphere};
pub use dynamics::{ImpulseSolver, Resolution};
pub use error::{BodyError, BodyField, CollisionError, Result};
pub use utils::PassReport;
pub use world::run_collision_pass;

/// High-level wrapper that owns the body collection and a fixed pipeline
/// configuration. Safe to share between threads; passes and body access are
/// serialised by an internal lock.
pub struct CollisionEngine {
    bodies: Mutex<Vec<Body>>,
    config: PipelineConfig,
}

impl Default for CollisionEngine {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl CollisionEngine {
    /// Creates an empty engine and logs the selected pipeline.
    pub fn new(config: PipelineConfig) -> Self {
        utils::logging::log_pipeline_selection(&config);
        Self {
            bodies: Mutex::new(Vec::new()),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Adds a body and returns the new body count.
    pub fn add_body(&self, body: impl Into<Body>) -> usize {
        let mut bodies = self.bodies.lock();
        bodies.push(body.into());
        bodies.len()
    }

    /// Runs one collision pass, blocking until it completes. Bodies are left
    /// sorted by min X afterwards.
    pub fn process_collisions(&self) -> Result<PassReport> {
        let mut bodies = self.bodies.lock();
        world::run_collision_pass(&mut bodies, &self.config)
    }

    /// Read access to the bodies.
    pub fn with_bodies<R>(&self, f: impl FnOnce(&[Body]) -> R) -> R {
        f(&self.bodies.lock())
    }

    /// Write access to the bodies, e.g. to integrate positions between passes.
    pub fn with_bodies_mut<R>(&self, f: impl FnOnce(&mut Vec<Body>) -> R) -> R {
        f(&mut self.bodies.lock())
    }

    pub fn len(&self) -> usize {
        self.bodies.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.lock().is_empty()
    }

    /// Drops every body and returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut bodies = self.bodies.lock();
        let removed = bodies.len();
        bodies.clear();
        log::debug!("collision engine: cleared {removed} bodies");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_resolves_added_bodies() {
        let engine = CollisionEngine::default();
        engine.add_body(
            Sphere::new("left", 1.0)
                .with_position(DVec3::new(-0.95, 0.0, 0.0))
                .with_velocity(DVec3::new(0.5, 0.0, 0.0)),
        );
        let count = engine.add_body(
            Sphere::new("right", 1.0)
                .with_position(DVec3::new(0.95, 0.0, 0.0))
                .with_velocity(DVec3::new(-0.5, 0.0, 0.0)),
        );
        assert_eq!(count, 2);

        let report = engine.process_collisions().unwrap();
        assert_eq!(report.contacts, 1);
        assert_eq!(report.resolved_pairs, 1);

        engine.with_bodies(|bodies| {
            let left = bodies[0].velocity().unwrap();
            let right = bodies[1].velocity().unwrap();
            assert!(right.x - left.x >= 0.0);
        });

        assert_eq!(engine.clear(), 2);
        assert!(engine.is_empty());
    }
}
