//! Fused pipeline: broad-phase workers test and resolve each pair as soon as
//! they find it.
//!
//! Every body sits behind its own lock. A worker holds at most two locks and
//! always takes the lower index first, so two pairs sharing a body resolve
//! one after the other and workers cannot deadlock.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::{
    collision::{
        broadphase::{CandidatePair, SweepAndPrune, SweepInput},
        narrowphase::SeparatingAxis,
    },
    config::{NarrowPhaseAlgorithm, PipelineConfig, ResolveAlgorithm},
    core::{Body, Collidable},
    dynamics::solver::ImpulseSolver,
    error::{CollisionError, Result},
    utils::{PassReport, StageTimer},
};

struct LockedBodies<'a> {
    slots: Vec<Mutex<&'a mut Body>>,
}

impl<'a> LockedBodies<'a> {
    fn new(bodies: &'a mut [Body]) -> Self {
        Self {
            slots: bodies.iter_mut().map(Mutex::new).collect(),
        }
    }

    /// Locks two distinct bodies in ascending index order and returns the
    /// guards as `(first, second)`.
    fn lock_pair(
        &self,
        first: usize,
        second: usize,
    ) -> Result<(MutexGuard<'_, &'a mut Body>, MutexGuard<'_, &'a mut Body>)> {
        if first == second {
            let id = self.slots[first].lock().id().to_owned();
            return Err(CollisionError::SelfPair { index: first, id });
        }
        if first < second {
            let low = self.slots[first].lock();
            let high = self.slots[second].lock();
            Ok((low, high))
        } else {
            let low = self.slots[second].lock();
            let high = self.slots[first].lock();
            Ok((high, low))
        }
    }
}

#[derive(Default)]
struct Tally {
    candidates: AtomicUsize,
    contacts: AtomicUsize,
    resolved: AtomicUsize,
    failed: AtomicBool,
    error: Mutex<Option<CollisionError>>,
}

impl Tally {
    fn fail(&self, err: CollisionError) {
        let mut slot = self.error.lock();
        if slot.is_none() {
            *slot = Some(err);
        }
        self.failed.store(true, Ordering::Release);
    }
}

pub(super) fn run(
    bodies: &mut [Body],
    input: &SweepInput,
    sweep: &SweepAndPrune,
    config: &PipelineConfig,
    report: &mut PassReport,
) -> Result<()> {
    let solver = ImpulseSolver::new(config.solver);
    let locked = LockedBodies::new(bodies);
    let tally = Tally::default();

    {
        let _timer = StageTimer::new(&mut report.broad_phase_time);
        sweep.for_each_pair(input, |pair| {
            tally.candidates.fetch_add(1, Ordering::Relaxed);
            // After a fatal error the sweep still finishes, but no more bodies change.
            if tally.failed.load(Ordering::Acquire) {
                return;
            }
            if let Err(err) = process_pair(&locked, pair, config, &solver, &tally) {
                tally.fail(err);
            }
        });
    }

    report.candidate_pairs = tally.candidates.into_inner();
    report.contacts = tally.contacts.into_inner();
    report.resolved_pairs = tally.resolved.into_inner();
    match tally.error.into_inner() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn process_pair(
    locked: &LockedBodies<'_>,
    pair: CandidatePair,
    config: &PipelineConfig,
    solver: &ImpulseSolver,
    tally: &Tally,
) -> Result<()> {
    let (mut body_a, mut body_b) = locked.lock_pair(pair.a, pair.b)?;

    if config.narrow_phase == NarrowPhaseAlgorithm::Sat {
        if SeparatingAxis::test(pair.a, &body_a, pair.b, &body_b).is_none() {
            return Ok(());
        }
        tally.contacts.fetch_add(1, Ordering::Relaxed);
    }

    if config.resolve == ResolveAlgorithm::None {
        return Ok(());
    }
    if solver
        .resolve(pair.a, &mut body_a, pair.b, &mut body_b)?
        .applied()
    {
        tally.resolved.fetch_add(1, Ordering::Relaxed);
    }
    Ok(())
}
