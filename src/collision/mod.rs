//! Collision detection modules: spatial sort, broad-phase sweep, narrow-phase tests.

pub mod sort;
pub mod broadphase;
pub mod narrowphase;

pub use broadphase::{CandidatePair, SweepAndPrune, SweepInput};
pub use narrowphase::{Contact, SeparatingAxis};
pub use sort::{radix_sort_by_key, quick_sort_by_key, sort_bodies, sortable_key};
