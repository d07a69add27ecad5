//! Configuration for the collision pipeline: default constants, stage
//! selectors and the immutable [`PipelineConfig`] handed to every pass.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::CollisionError;

/// Sequential-impulse sub-iterations per contact.
pub const DEFAULT_SOLVER_ITERATIONS: u32 = 10;

/// Coefficient of restitution (0 inelastic, 1 elastic).
pub const DEFAULT_RESTITUTION: f64 = 0.5;

/// Penetration below this depth produces no bias.
pub const DEFAULT_SLOP: f64 = 0.001;

/// Baumgarte velocity bias coefficient. Zero keeps resolution purely
/// velocity based.
pub const DEFAULT_BAUMGARTE_BIAS: f64 = 0.0;

/// Fraction of the penetration removed by positional correction. Zero
/// disables the position pass.
pub const DEFAULT_POSITION_CORRECTION: f64 = 0.0;

/// Every body has unit mass; no per-body mass is stored.
pub const DEFAULT_BODY_MASS: f64 = 1.0;

/// Masses at or below this are treated as infinite (inverse mass 0).
pub const MASS_EPSILON: f64 = 1e-9;

/// Centre distances below this are treated as coincident by the resolver.
pub const COINCIDENT_EPSILON: f64 = 1e-9;

/// At or below this many items the radix sort runs each digit single-threaded.
pub const RADIX_PARALLEL_THRESHOLD: usize = 10_000;

/// Partitioned sweep needs at least this many workers, otherwise it runs the
/// sequential sweep.
pub const MIN_PARTITION_WORKERS: usize = 3;

fn canonical(value: &str) -> String {
    value
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .to_ascii_lowercase()
}

fn unknown(kind: &'static str, value: &str) -> CollisionError {
    CollisionError::UnknownSelector {
        kind,
        value: value.to_owned(),
    }
}

/// Broad-phase algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BroadPhaseAlgorithm {
    SweepAndPrune,
    None,
}

impl fmt::Display for BroadPhaseAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SweepAndPrune => f.write_str("Sweep and Prune"),
            Self::None => f.write_str("No Algorithm"),
        }
    }
}

impl FromStr for BroadPhaseAlgorithm {
    type Err = CollisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match canonical(s).as_str() {
            "sweep and prune" | "sap" | "sweep-and-prune" => Ok(Self::SweepAndPrune),
            "no algorithm" | "none" => Ok(Self::None),
            _ => Err(unknown("broad phase algorithm", s)),
        }
    }
}

/// Narrow-phase algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrowPhaseAlgorithm {
    Sat,
    None,
}

impl fmt::Display for NarrowPhaseAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sat => f.write_str("Separating Axis Theorem"),
            Self::None => f.write_str("No Algorithm"),
        }
    }
}

impl FromStr for NarrowPhaseAlgorithm {
    type Err = CollisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match canonical(s).as_str() {
            "separating axis theorem" | "sat" => Ok(Self::Sat),
            "no algorithm" | "none" => Ok(Self::None),
            _ => Err(unknown("narrow phase algorithm", s)),
        }
    }
}

/// Contact resolution algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveAlgorithm {
    /// Sequential impulses (temporal Gauss-Seidel).
    IterativeImpulse,
    None,
}

impl fmt::Display for ResolveAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IterativeImpulse => f.write_str("Temporal Gauss-Seidel"),
            Self::None => f.write_str("No Algorithm"),
        }
    }
}

impl FromStr for ResolveAlgorithm {
    type Err = CollisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match canonical(s).as_str() {
            "temporal gauss-seidel"
            | "projected gauss-seidel"
            | "method of sequential impulses"
            | "tgs"
            | "pgs"
            | "iterative-impulse" => Ok(Self::IterativeImpulse),
            "no algorithm" | "none" => Ok(Self::None),
            _ => Err(unknown("resolve algorithm", s)),
        }
    }
}

/// How a stage spreads its work over threads. Not every stage supports every
/// mode; unsupported combinations fail when the pass dispatches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    Sequential,
    TrivialParallel,
    PartitionedParallel,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => f.write_str("No Parallel"),
            Self::TrivialParallel => f.write_str("Parallel trivial"),
            Self::PartitionedParallel => f.write_str("Parallel non trivial"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = CollisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match canonical(s).as_str() {
            "no parallel" | "sequential" => Ok(Self::Sequential),
            "parallel trivial" | "trivial-parallel" => Ok(Self::TrivialParallel),
            "parallel non trivial" | "partitioned-parallel" => Ok(Self::PartitionedParallel),
            _ => Err(unknown("execution mode", s)),
        }
    }
}

/// Spatial sorter used before the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortAlgorithm {
    QuickSort,
    Radix,
}

impl fmt::Display for SortAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuickSort => f.write_str("Quicksort"),
            Self::Radix => f.write_str("Parallel radix sort"),
        }
    }
}

impl FromStr for SortAlgorithm {
    type Err = CollisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match canonical(s).as_str() {
            "quicksort" | "quick" => Ok(Self::QuickSort),
            "parallel radix sort" | "radix" => Ok(Self::Radix),
            _ => Err(unknown("sort algorithm", s)),
        }
    }
}

/// Whether narrow phase and resolution run inline with the sweep or after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineMode {
    /// Pairs are collected first, then tested and resolved in discovery order.
    Staged,
    /// Every overlap found by the sweep is tested and resolved on the spot.
    Fused,
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staged => f.write_str("Sequential Pipeline"),
            Self::Fused => f.write_str("Parallel Pipeline"),
        }
    }
}

impl FromStr for PipelineMode {
    type Err = CollisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match canonical(s).as_str() {
            "sequential pipeline" | "staged" | "sequential" => Ok(Self::Staged),
            "parallel pipeline" | "fused" | "parallel" => Ok(Self::Fused),
            _ => Err(unknown("pipeline mode", s)),
        }
    }
}

/// Tunables of the sequential-impulse resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub iterations: u32,
    pub restitution: f64,
    pub slop: f64,
    pub baumgarte_bias: f64,
    pub position_correction: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_SOLVER_ITERATIONS,
            restitution: DEFAULT_RESTITUTION,
            slop: DEFAULT_SLOP,
            baumgarte_bias: DEFAULT_BAUMGARTE_BIAS,
            position_correction: DEFAULT_POSITION_CORRECTION,
        }
    }
}

/// Stage selection for one collision pass. Built once and passed by
/// reference into [`crate::world::run_collision_pass`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub broad_phase: BroadPhaseAlgorithm,
    pub broad_phase_mode: ExecutionMode,
    pub sort: SortAlgorithm,
    pub narrow_phase: NarrowPhaseAlgorithm,
    pub narrow_phase_mode: ExecutionMode,
    pub resolve: ResolveAlgorithm,
    pub resolve_mode: ExecutionMode,
    pub pipeline: PipelineMode,
    /// Worker count for the partitioned sweep. `None` uses the available
    /// parallelism minus one.
    pub partition_workers: Option<usize>,
    pub solver: SolverSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            broad_phase: BroadPhaseAlgorithm::SweepAndPrune,
            broad_phase_mode: ExecutionMode::Sequential,
            sort: SortAlgorithm::QuickSort,
            narrow_phase: NarrowPhaseAlgorithm::Sat,
            narrow_phase_mode: ExecutionMode::Sequential,
            resolve: ResolveAlgorithm::IterativeImpulse,
            resolve_mode: ExecutionMode::Sequential,
            pipeline: PipelineMode::Staged,
            partition_workers: None,
            solver: SolverSettings::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sweep strategy together with its usual sorter: quicksort for
    /// the sequential sweep, radix sort for both parallel ones.
    pub fn with_broad_phase_mode(mut self, mode: ExecutionMode) -> Self {
        self.broad_phase_mode = mode;
        self.sort = match mode {
            ExecutionMode::Sequential => SortAlgorithm::QuickSort,
            ExecutionMode::TrivialParallel | ExecutionMode::PartitionedParallel => {
                SortAlgorithm::Radix
            }
        };
        self
    }

    pub fn with_broad_phase(mut self, algorithm: BroadPhaseAlgorithm) -> Self {
        self.broad_phase = algorithm;
        self
    }

    pub fn with_sort(mut self, sort: SortAlgorithm) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_narrow_phase(mut self, algorithm: NarrowPhaseAlgorithm) -> Self {
        self.narrow_phase = algorithm;
        self
    }

    pub fn with_narrow_phase_mode(mut self, mode: ExecutionMode) -> Self {
        self.narrow_phase_mode = mode;
        self
    }

    pub fn with_resolve(mut self, algorithm: ResolveAlgorithm) -> Self {
        self.resolve = algorithm;
        self
    }

    pub fn with_resolve_mode(mut self, mode: ExecutionMode) -> Self {
        self.resolve_mode = mode;
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineMode) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_partition_workers(mut self, workers: usize) -> Self {
        self.partition_workers = Some(workers);
        self
    }

    pub fn with_solver(mut self, solver: SolverSettings) -> Self {
        self.solver = solver;
        self
    }

    /// One-line label of the selected stages, e.g.
    /// `Sweep and Prune (No Parallel) + Separating Axis Theorem (No Parallel) + ...`.
    pub fn describe(&self) -> String {
        format!(
            "{} ({}) + {} ({}) + {} ({}) [{}]",
            self.broad_phase,
            self.broad_phase_mode,
            self.narrow_phase,
            self.narrow_phase_mode,
            self.resolve,
            self.resolve_mode,
            self.pipeline
        )
    }

    /// Combinations that are valid but almost certainly not intended.
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.broad_phase == BroadPhaseAlgorithm::None {
            warnings.push("broad phase is disabled, no collisions will be processed");
        }
        if self.narrow_phase == NarrowPhaseAlgorithm::None {
            warnings.push("narrow phase is disabled, resolution runs on broad-phase pairs");
        }
        if self.resolve == ResolveAlgorithm::None {
            warnings.push("resolver is disabled, contacts will not change velocities");
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reference_selector_names() {
        assert_eq!(
            "Sweep and Prune".parse::<BroadPhaseAlgorithm>().unwrap(),
            BroadPhaseAlgorithm::SweepAndPrune
        );
        assert_eq!(
            " (Parallel non trivial)".parse::<ExecutionMode>().unwrap(),
            ExecutionMode::PartitionedParallel
        );
        assert_eq!(
            "Projected Gauss-Seidel".parse::<ResolveAlgorithm>().unwrap(),
            ResolveAlgorithm::IterativeImpulse
        );
        assert_eq!(
            "Parallel Pipeline".parse::<PipelineMode>().unwrap(),
            PipelineMode::Fused
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for mode in [
            ExecutionMode::Sequential,
            ExecutionMode::TrivialParallel,
            ExecutionMode::PartitionedParallel,
        ] {
            assert_eq!(mode.to_string().parse::<ExecutionMode>().unwrap(), mode);
        }
    }

    #[test]
    fn unknown_selector_names_the_offender() {
        let err = "Bounding Volume Hierarchy"
            .parse::<BroadPhaseAlgorithm>()
            .unwrap_err();
        assert_eq!(
            err,
            CollisionError::UnknownSelector {
                kind: "broad phase algorithm",
                value: "Bounding Volume Hierarchy".into(),
            }
        );
        assert!(err.to_string().contains("Bounding Volume Hierarchy"));
    }

    #[test]
    fn broad_phase_mode_picks_matching_sorter() {
        let config = PipelineConfig::new().with_broad_phase_mode(ExecutionMode::TrivialParallel);
        assert_eq!(config.sort, SortAlgorithm::Radix);
        let config = config.with_broad_phase_mode(ExecutionMode::Sequential);
        assert_eq!(config.sort, SortAlgorithm::QuickSort);
    }

    #[test]
    fn defaults_match_reference_constants() {
        let settings = SolverSettings::default();
        assert_eq!(settings.iterations, 10);
        assert_eq!(settings.restitution, 0.5);
        assert_eq!(settings.slop, 0.001);
        assert_eq!(settings.baumgarte_bias, 0.0);
        assert!(PipelineConfig::default().warnings().is_empty());
    }
}
