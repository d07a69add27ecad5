//! One collision pass over a body slice: sort, sweep, test, resolve.

mod fused;
mod staged;

use std::time::Instant;

use log::debug;

use crate::{
    collision::{
        broadphase::{SweepAndPrune, SweepInput},
        sort::sort_bodies,
    },
    config::{
        BroadPhaseAlgorithm, ExecutionMode, NarrowPhaseAlgorithm, PipelineConfig, PipelineMode,
        ResolveAlgorithm,
    },
    core::{Body, Collidable},
    error::{CollisionError, Result},
    utils::{PassReport, StageTimer},
};

/// Runs the configured pipeline over `bodies`.
///
/// Every index in the pass refers to the slice sorted by bounding-box min X.
/// The slice is left in min-X order; when positional correction moved bodies
/// it is sorted again after resolution. A pass over zero or one body does
/// nothing.
///
/// Fatal errors abort the pass; bodies with missing state are logged and
/// skipped.
pub fn run_collision_pass(bodies: &mut [Body], config: &PipelineConfig) -> Result<PassReport> {
    let started = Instant::now();
    let mut report = PassReport::new(bodies.len());

    if bodies.len() <= 1 {
        return Ok(report);
    }
    check_modes(config)?;

    if config.broad_phase == BroadPhaseAlgorithm::None {
        debug!("collision pass: broad phase disabled, nothing to do");
        report.total_time = started.elapsed();
        return Ok(report);
    }

    {
        let _timer = StageTimer::new(&mut report.sort_time);
        sort_bodies(bodies, config.sort)?;
    }

    let input = SweepInput::from_bodies(bodies);
    report.skipped_bodies = input.skipped();
    let sweep = SweepAndPrune::new(config.broad_phase_mode)
        .with_partition_workers(config.partition_workers);

    match config.pipeline {
        PipelineMode::Staged => staged::run(bodies, &input, &sweep, config, &mut report)?,
        PipelineMode::Fused => fused::run(bodies, &input, &sweep, config, &mut report)?,
    }

    if moves_bodies(config) {
        let _timer = StageTimer::new(&mut report.sort_time);
        sort_bodies(bodies, config.sort)?;
    }

    report.total_time = started.elapsed();
    report.log_summary();
    Ok(report)
}

/// Positional correction shifts centres, which can reorder min X.
fn moves_bodies(config: &PipelineConfig) -> bool {
    config.resolve != ResolveAlgorithm::None && config.solver.position_correction > 0.0
}

/// Rejects stage modes that have no implementation before any body moves.
fn check_modes(config: &PipelineConfig) -> Result<()> {
    if config.narrow_phase != NarrowPhaseAlgorithm::None
        && config.narrow_phase_mode == ExecutionMode::PartitionedParallel
    {
        return Err(unsupported("narrow phase", config.narrow_phase_mode));
    }
    if config.resolve != ResolveAlgorithm::None && config.resolve_mode != ExecutionMode::Sequential
    {
        return Err(unsupported("resolve", config.resolve_mode));
    }
    Ok(())
}

pub(crate) fn unsupported(stage: &'static str, mode: ExecutionMode) -> CollisionError {
    CollisionError::UnsupportedMode {
        stage,
        mode: mode.to_string(),
    }
}

/// Mutable access to two distinct bodies of the slice.
pub(crate) fn pair_mut(
    bodies: &mut [Body],
    first: usize,
    second: usize,
) -> Result<(&mut Body, &mut Body)> {
    if first == second {
        return Err(CollisionError::SelfPair {
            index: first,
            id: bodies[first].id().to_owned(),
        });
    }
    if first < second {
        let (head, tail) = bodies.split_at_mut(second);
        Ok((&mut head[first], &mut tail[0]))
    } else {
        let (head, tail) = bodies.split_at_mut(first);
        Ok((&mut tail[0], &mut head[second]))
    }
}
