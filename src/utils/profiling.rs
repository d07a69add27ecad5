use std::time::{Duration, Instant};

use log::debug;

/// Counters and stage timings of one collision pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub body_count: usize,
    /// Bodies left out of the sweep because their bounding box was missing.
    pub skipped_bodies: usize,
    pub candidate_pairs: usize,
    pub contacts: usize,
    pub resolved_pairs: usize,

    pub sort_time: Duration,
    pub broad_phase_time: Duration,
    pub narrow_phase_time: Duration,
    pub solver_time: Duration,
    pub total_time: Duration,
}

impl PassReport {
    pub fn new(body_count: usize) -> Self {
        Self {
            body_count,
            ..Self::default()
        }
    }

    pub fn log_summary(&self) {
        debug!(
            "collision pass: {} bodies ({} skipped), {} pairs, {} contacts, {} resolved in {:.3} ms \
             [sort {:.3} | broad {:.3} | narrow {:.3} | solve {:.3}]",
            self.body_count,
            self.skipped_bodies,
            self.candidate_pairs,
            self.contacts,
            self.resolved_pairs,
            millis(self.total_time),
            millis(self.sort_time),
            millis(self.broad_phase_time),
            millis(self.narrow_phase_time),
            millis(self.solver_time),
        );
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Adds the time until drop to `output`.
pub struct StageTimer<'a> {
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> StageTimer<'a> {
    pub fn new(output: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            output,
        }
    }
}

impl Drop for StageTimer<'_> {
    fn drop(&mut self) {
        *self.output += self.start.elapsed();
    }
}
