//! Simulated timing for the analysis steps.
//!
//! Durations are cosmetic. They decide how fast the simulated steps fill up
//! and what the remaining-time estimate shows, never whether the analysis
//! succeeded.

use std::time::Duration;

use super::step::AnalysisStep;

/// Extra seconds added to the remaining-time estimate per 1000 KB of input.
const ESTIMATE_SECS_PER_1000_KB: f64 = 2.0;

/// Shortest accepted tick interval.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Timing parameters for one analysis session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingModel {
    /// Size of the uploaded file in KB.
    pub file_size_kb: f64,
    /// Fractional slowdown of each simulated step per MB of input.
    pub size_scale_per_mb: f64,
    /// Interval between simulated ticks.
    pub tick_interval: Duration,
}

impl TimingModel {
    /// Create a timing model for a file of the given size.
    pub fn new(file_size_kb: f64, size_scale_per_mb: f64, tick_interval: Duration) -> Self {
        Self {
            file_size_kb: file_size_kb.max(0.0),
            size_scale_per_mb: size_scale_per_mb.max(0.0),
            tick_interval: tick_interval.max(MIN_TICK_INTERVAL),
        }
    }

    /// Tick interval in seconds.
    pub fn tick_secs(&self) -> f64 {
        self.tick_interval.as_secs_f64()
    }

    /// Nominal duration of `step`, stretched for larger files.
    pub fn scaled_secs(&self, step: AnalysisStep) -> f64 {
        let size_mb = self.file_size_kb / 1000.0;
        step.nominal_secs() * (1.0 + size_mb * self.size_scale_per_mb)
    }

    /// Step progress (in percent) gained by one tick during `step`.
    pub fn increment_per_tick(&self, step: AnalysisStep) -> f64 {
        let scaled = self.scaled_secs(step);
        if scaled <= 0.0 {
            return 100.0;
        }
        self.tick_secs() / scaled * 100.0
    }

    /// Initial remaining-time estimate in seconds.
    ///
    /// Sum of all nominal durations plus two seconds per 1000 KB. This is
    /// computed once and then only counted down; it is not reconciled with
    /// actual progress.
    pub fn initial_remaining_secs(&self) -> f64 {
        let nominal: f64 = AnalysisStep::ALL.iter().map(|s| s.nominal_secs()).sum();
        nominal + (self.file_size_kb / 1000.0) * ESTIMATE_SECS_PER_1000_KB
    }
}

impl Default for TimingModel {
    fn default() -> Self {
        Self::new(0.0, 0.1, Duration::from_millis(100))
    }
}
