//! Utility helpers: scoped logging timers and per-pass profiling.

pub mod logging;
pub mod profiling;

pub use profiling::{PassReport, StageTimer};
