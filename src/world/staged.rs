//! Staged pipeline: each stage finishes over all bodies before the next one
//! starts, and stages hand over plain vectors.

use rayon::prelude::*;

use crate::{
    collision::{
        broadphase::{CandidatePair, SweepAndPrune, SweepInput},
        narrowphase::{Contact, SeparatingAxis},
    },
    config::{ExecutionMode, NarrowPhaseAlgorithm, PipelineConfig, ResolveAlgorithm},
    core::Body,
    dynamics::solver::ImpulseSolver,
    error::Result,
    utils::{PassReport, StageTimer},
};

use super::{pair_mut, unsupported};

pub(super) fn run(
    bodies: &mut [Body],
    input: &SweepInput,
    sweep: &SweepAndPrune,
    config: &PipelineConfig,
    report: &mut PassReport,
) -> Result<()> {
    let pairs = {
        let _timer = StageTimer::new(&mut report.broad_phase_time);
        sweep.collect_pairs(input)
    };
    report.candidate_pairs = pairs.len();

    // Without a narrow phase every candidate goes to the resolver, which
    // re-checks the overlap itself.
    let to_resolve: Vec<(usize, usize)> = match config.narrow_phase {
        NarrowPhaseAlgorithm::Sat => {
            let contacts = {
                let _timer = StageTimer::new(&mut report.narrow_phase_time);
                test_pairs(bodies, &pairs, config.narrow_phase_mode)?
            };
            report.contacts = contacts.len();
            contacts.iter().map(|c| (c.body_a, c.body_b)).collect()
        }
        NarrowPhaseAlgorithm::None => pairs.iter().map(|p| (p.a, p.b)).collect(),
    };

    if config.resolve == ResolveAlgorithm::None {
        return Ok(());
    }

    let _timer = StageTimer::new(&mut report.solver_time);
    let solver = ImpulseSolver::new(config.solver);
    for (a, b) in to_resolve {
        let (body_a, body_b) = pair_mut(bodies, a, b)?;
        if solver.resolve(a, body_a, b, body_b)?.applied() {
            report.resolved_pairs += 1;
        }
    }
    Ok(())
}

/// Narrow phase over the candidate list. Contacts come back in candidate
/// order in every mode.
fn test_pairs(
    bodies: &[Body],
    pairs: &[CandidatePair],
    mode: ExecutionMode,
) -> Result<Vec<Contact>> {
    let test = |pair: &CandidatePair| {
        SeparatingAxis::test(pair.a, &bodies[pair.a], pair.b, &bodies[pair.b])
    };
    match mode {
        ExecutionMode::Sequential => Ok(pairs.iter().filter_map(test).collect()),
        ExecutionMode::TrivialParallel => Ok(pairs.par_iter().filter_map(test).collect()),
        ExecutionMode::PartitionedParallel => Err(unsupported("narrow phase", mode)),
    }
}
