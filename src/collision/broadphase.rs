//! Sweep-and-prune broad phase over bodies sorted by min X.
//!
//! Three strategies share one contract: report every pair whose bounding
//! boxes overlap on all three axes, each exactly once.
//!
//! * sequential: a single sweep with an active set,
//! * trivially parallel: one active-set sweep per pair of body kinds,
//! * partitioned parallel: workers own contiguous index ranges and scan
//!   forward over the rest of the array.
//!
//! Parallel strategies write into per-worker buffers that the caller
//! concatenates, or hand pairs straight to a visitor in fused mode.

use std::ops::Range;

use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::{ExecutionMode, MIN_PARTITION_WORKERS},
    core::{Aabb, Body, BodyKind, Collidable},
};

/// Unordered pair of distinct indices into the sorted body slice, stored with
/// `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidatePair {
    pub a: usize,
    pub b: usize,
}

impl CandidatePair {
    pub fn new(first: usize, second: usize) -> Self {
        debug_assert_ne!(first, second, "candidate pair needs two bodies");
        if first < second {
            Self {
                a: first,
                b: second,
            }
        } else {
            Self {
                a: second,
                b: first,
            }
        }
    }
}

/// Read-only snapshot of the sorted bodies taken before the sweep, so workers
/// never touch the bodies themselves.
#[derive(Debug, Clone, Default)]
pub struct SweepInput {
    boxes: Vec<Option<Aabb>>,
    kinds: Vec<BodyKind>,
}

impl SweepInput {
    /// Captures bounding boxes and kinds. Bodies without a box are logged and
    /// left out of every pair.
    pub fn from_bodies(bodies: &[Body]) -> Self {
        let boxes = bodies
            .iter()
            .map(|body| match body.bounding_box() {
                Ok(bb) => Some(bb),
                Err(err) => {
                    warn!("broad phase: skipping body {}: {err}", body.id());
                    None
                }
            })
            .collect();
        let kinds = bodies.iter().map(Body::kind).collect();
        Self { boxes, kinds }
    }

    /// Snapshot from raw boxes, every body treated as a sphere.
    pub fn from_boxes(boxes: Vec<Option<Aabb>>) -> Self {
        let kinds = vec![BodyKind::Sphere; boxes.len()];
        Self { boxes, kinds }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Number of bodies that had no bounding box.
    pub fn skipped(&self) -> usize {
        self.boxes.iter().filter(|bb| bb.is_none()).count()
    }
}

/// Sweep-and-prune driver for one execution mode.
#[derive(Debug, Clone, Copy)]
pub struct SweepAndPrune {
    pub mode: ExecutionMode,
    partition_workers: Option<usize>,
}

impl SweepAndPrune {
    pub fn new(mode: ExecutionMode) -> Self {
        Self {
            mode,
            partition_workers: None,
        }
    }

    /// Overrides the worker count of the partitioned strategy.
    pub fn with_partition_workers(mut self, workers: Option<usize>) -> Self {
        self.partition_workers = workers;
        self
    }

    /// Staged mode: returns every overlapping pair.
    pub fn collect_pairs(&self, input: &SweepInput) -> Vec<CandidatePair> {
        if input.len() <= 1 {
            return Vec::new();
        }

        match self.effective_mode() {
            ExecutionMode::Sequential => {
                let mut pairs = Vec::new();
                sweep_active_set(&input.boxes, 0..input.len(), |_, _| true, &mut |pair| {
                    pairs.push(pair)
                });
                pairs
            }
            ExecutionMode::TrivialParallel => kind_pairs()
                .into_par_iter()
                .map(|kinds| {
                    let mut pairs = Vec::new();
                    sweep_kind_pair(input, kinds, &mut |pair| pairs.push(pair));
                    pairs
                })
                .collect::<Vec<_>>()
                .concat(),
            ExecutionMode::PartitionedParallel => {
                partition_ranges(input.len(), self.worker_count())
                    .into_par_iter()
                    .map(|range| {
                        let mut pairs = Vec::new();
                        scan_forward(&input.boxes, range, &mut |pair| pairs.push(pair));
                        pairs
                    })
                    .collect::<Vec<_>>()
                    .concat()
            }
        }
    }

    /// Fused mode: calls `visit` for every overlapping pair as soon as it is
    /// found, from whichever worker found it.
    pub fn for_each_pair<F>(&self, input: &SweepInput, visit: F)
    where
        F: Fn(CandidatePair) + Sync,
    {
        if input.len() <= 1 {
            return;
        }

        match self.effective_mode() {
            ExecutionMode::Sequential => {
                sweep_active_set(&input.boxes, 0..input.len(), |_, _| true, &mut |pair| {
                    visit(pair)
                });
            }
            ExecutionMode::TrivialParallel => {
                kind_pairs().into_par_iter().for_each(|kinds| {
                    sweep_kind_pair(input, kinds, &mut |pair| visit(pair));
                });
            }
            ExecutionMode::PartitionedParallel => {
                partition_ranges(input.len(), self.worker_count())
                    .into_par_iter()
                    .for_each(|range| {
                        scan_forward(&input.boxes, range, &mut |pair| visit(pair));
                    });
            }
        }
    }

    /// Partitioned mode drops to the sequential sweep when too few workers
    /// are available.
    fn effective_mode(&self) -> ExecutionMode {
        if self.mode == ExecutionMode::PartitionedParallel {
            let workers = self.worker_count();
            if workers < MIN_PARTITION_WORKERS {
                warn!(
                    "broad phase: {workers} workers is below {MIN_PARTITION_WORKERS}, using the sequential sweep"
                );
                return ExecutionMode::Sequential;
            }
        }
        self.mode
    }

    fn worker_count(&self) -> usize {
        self.partition_workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .saturating_sub(1)
        })
    }
}

/// Active-set sweep over `indices` in ascending min-X order. An active body
/// whose max X falls behind the current min X can never overlap a later body
/// and is retired.
fn sweep_active_set<I, A, E>(boxes: &[Option<Aabb>], indices: I, accept: A, emit: &mut E)
where
    I: IntoIterator<Item = usize>,
    A: Fn(usize, usize) -> bool,
    E: FnMut(CandidatePair),
{
    let mut active: Vec<(usize, Aabb)> = Vec::new();
    for current in indices {
        let Some(bb) = boxes[current] else {
            continue;
        };

        active.retain(|&(other, other_bb)| {
            if other_bb.max.x < bb.min.x {
                return false;
            }
            if bb.overlaps_yz(&other_bb) && accept(other, current) {
                emit(CandidatePair::new(other, current));
            }
            true
        });

        active.push((current, bb));
    }
}

/// Every unordered pair of body kinds, each once.
fn kind_pairs() -> Vec<(BodyKind, BodyKind)> {
    let mut pairs = Vec::new();
    for (i, &first) in BodyKind::ALL.iter().enumerate() {
        for &second in &BodyKind::ALL[i..] {
            pairs.push((first, second));
        }
    }
    pairs
}

/// Sweeps only the bodies of the two kinds. Mixed kind pairs emit only
/// cross-kind overlaps so that no pair is reported by two sweeps.
fn sweep_kind_pair<E>(input: &SweepInput, (first, second): (BodyKind, BodyKind), emit: &mut E)
where
    E: FnMut(CandidatePair),
{
    let kinds = &input.kinds;
    let indices = (0..input.len()).filter(|&i| kinds[i] == first || kinds[i] == second);
    if first == second {
        sweep_active_set(&input.boxes, indices, |_, _| true, emit);
    } else {
        sweep_active_set(&input.boxes, indices, |a, b| kinds[a] != kinds[b], emit);
    }
}

/// Splits `0..n` into `workers` contiguous, disjoint ranges.
fn partition_ranges(n: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    (0..workers)
        .map(|w| (w * n / workers)..((w + 1) * n / workers))
        .filter(|range| !range.is_empty())
        .collect()
}

/// Outer loop over the worker's own range, inner loop over everything after
/// the outer body. Sortedness makes the first body starting past the outer
/// max X a safe stopping point.
fn scan_forward<E>(boxes: &[Option<Aabb>], range: Range<usize>, emit: &mut E)
where
    E: FnMut(CandidatePair),
{
    for i in range {
        let Some(bb) = boxes[i] else {
            continue;
        };
        for (j, other) in boxes.iter().enumerate().skip(i + 1) {
            let Some(other) = other else {
                continue;
            };
            if other.min.x > bb.max.x {
                break;
            }
            if bb.overlaps_yz(other) {
                emit(CandidatePair::new(i, j));
            }
        }
    }
}
