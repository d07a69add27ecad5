use log::{debug, log_enabled, trace, warn, Level};
use std::time::Instant;

use crate::config::PipelineConfig;

/// Traces how long one stage of a collision pass took over `items` entries.
/// Nothing is measured unless trace logging is on.
pub struct ScopedTimer {
    stage: &'static str,
    items: usize,
    start: Option<Instant>,
}

impl ScopedTimer {
    pub fn new(stage: &'static str, items: usize) -> Self {
        let start = log_enabled!(Level::Trace).then(Instant::now);
        Self {
            stage,
            items,
            start,
        }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        if let Some(start) = self.start {
            trace!(
                "collision pass: {} over {} items took {} µs",
                self.stage,
                self.items,
                start.elapsed().as_micros()
            );
        }
    }
}

/// Logs the selected stages and any combination that looks unintended.
pub fn log_pipeline_selection(config: &PipelineConfig) {
    debug!("collision pipeline: {}", config.describe());
    for warning in config.warnings() {
        warn!("collision pipeline: {warning}");
    }
}
