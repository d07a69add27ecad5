//! Core types describing simulated bodies and their bounding volumes.

pub mod body;
pub mod sphere;
pub mod types;

pub use body::{Body, BodyKind, Collidable};
pub use sphere::Sphere;
pub use types::{normalize_angle, Aabb};
