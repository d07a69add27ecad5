//! Contact response: the sequential-impulse resolver.

pub mod solver;

pub use solver::{ImpulseSolver, Resolution};
