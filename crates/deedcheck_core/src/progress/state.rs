//! Progress state owned by the controller.

use serde::{Deserialize, Serialize};

use crate::models::AnalysisResult;

use super::step::AnalysisStep;

/// Message shown when no document was handed to the controller.
pub const MISSING_FILE_MESSAGE: &str =
    "No document selected. Return to the upload page and choose a PDF file.";

/// Message shown for any failure of the analysis call.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "We couldn't analyze your document. Check that it is a readable PDF and that you are online, then try again.";

/// Visible phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Created, `start` not yet called.
    Idle,
    /// Waiting on the analysis call; progress follows the upload.
    Uploading,
    /// Simulated step 1.
    Extracting,
    /// Simulated step 2.
    Analyzing,
    /// Simulated step 3.
    Generating,
    /// Finished; result handed to the host.
    Success,
    /// Failed; may be retryable.
    Error,
    /// Abandoned by the user.
    Cancelled,
}

impl Phase {
    /// Phase that shows the given step.
    pub fn for_step(step: AnalysisStep) -> Self {
        match step {
            AnalysisStep::Upload => Phase::Uploading,
            AnalysisStep::Extract => Phase::Extracting,
            AnalysisStep::Analyze => Phase::Analyzing,
            AnalysisStep::Generate => Phase::Generating,
        }
    }

    /// Step shown in this phase, if it is one of the four step phases.
    pub fn step(self) -> Option<AnalysisStep> {
        match self {
            Phase::Uploading => Some(AnalysisStep::Upload),
            Phase::Extracting => Some(AnalysisStep::Extract),
            Phase::Analyzing => Some(AnalysisStep::Analyze),
            Phase::Generating => Some(AnalysisStep::Generate),
            _ => None,
        }
    }

    /// Whether ticks drive this phase.
    pub fn is_simulated(self) -> bool {
        matches!(self, Phase::Extracting | Phase::Analyzing | Phase::Generating)
    }

    /// Whether work is in progress (upload or simulated step).
    pub fn is_in_flight(self) -> bool {
        self.step().is_some()
    }

    /// Success and Cancelled end the flow. Error ends it only when not
    /// retryable, which the controller decides.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Success | Phase::Cancelled)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Uploading => "uploading",
            Phase::Extracting => "extracting",
            Phase::Analyzing => "analyzing",
            Phase::Generating => "generating",
            Phase::Success => "success",
            Phase::Error => "error",
            Phase::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Why the controller entered the error phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// No document was provided. Cannot be fixed by retrying.
    MissingFile,
    /// The analysis call failed.
    Analysis,
    /// Raised explicitly by the host.
    Manual(String),
}

impl Failure {
    /// User-facing message.
    pub fn message(&self) -> &str {
        match self {
            Failure::MissingFile => MISSING_FILE_MESSAGE,
            Failure::Analysis => ANALYSIS_FAILED_MESSAGE,
            Failure::Manual(message) => message,
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, Failure::MissingFile)
    }
}

/// Overall percentage for a step position.
///
/// Every step weighs 25% regardless of its nominal duration:
/// `round(index * 25 + step_progress * 0.25)`, clamped to 0..=100.
pub fn overall_percent(step_index: usize, step_progress: f64) -> u8 {
    let weight = 100.0 / AnalysisStep::COUNT as f64;
    let raw = step_index as f64 * weight + step_progress * weight / 100.0;
    raw.round().clamp(0.0, 100.0) as u8
}

/// Mutable progress state. Single owner: the controller.
#[derive(Debug, Clone, Default)]
pub struct ProgressState {
    /// Index of the current step (0..=3).
    pub step_index: usize,
    /// Progress within the current step (0..=100).
    pub step_progress: f64,
    /// Countdown estimate in seconds, never below zero.
    pub remaining_secs: f64,
    /// Set while in the error phase.
    pub failure: Option<Failure>,
    /// Result of the analysis call, held until the simulated steps finish.
    pub result: Option<AnalysisResult>,
}

impl ProgressState {
    /// Fresh state with the given remaining-time estimate.
    pub fn new(remaining_secs: f64) -> Self {
        Self {
            remaining_secs: remaining_secs.max(0.0),
            ..Default::default()
        }
    }

    /// Back to step 0 with zero progress and a new estimate.
    pub fn reset(&mut self, remaining_secs: f64) {
        *self = Self::new(remaining_secs);
    }

    /// Step at the current index.
    pub fn step(&self) -> AnalysisStep {
        AnalysisStep::from_index(self.step_index).unwrap_or(AnalysisStep::Generate)
    }

    /// Overall percentage across all steps.
    pub fn overall_percent(&self) -> u8 {
        overall_percent(self.step_index, self.step_progress)
    }

    /// Count the estimate down by one tick.
    pub fn count_down(&mut self, secs: f64) {
        self.remaining_secs = (self.remaining_secs - secs).max(0.0);
    }
}

/// Read-only view of the controller for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub phase: Phase,
    pub step: AnalysisStep,
    pub step_progress: f64,
    pub overall_percent: u8,
    pub remaining_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub retryable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_percent_follows_equal_weighting() {
        assert_eq!(overall_percent(0, 0.0), 0);
        assert_eq!(overall_percent(0, 50.0), 13); // 12.5 rounds up
        assert_eq!(overall_percent(1, 0.0), 25);
        assert_eq!(overall_percent(2, 40.0), 60);
        assert_eq!(overall_percent(3, 100.0), 100);
    }

    #[test]
    fn overall_percent_is_clamped() {
        assert_eq!(overall_percent(3, 250.0), 100);
        assert_eq!(overall_percent(0, -20.0), 0);
    }

    #[test]
    fn overall_percent_never_decreases() {
        let mut last = 0u8;
        for index in 0..AnalysisStep::COUNT {
            let mut progress = 0.0;
            while progress <= 100.0 {
                let current = overall_percent(index, progress);
                assert!(current >= last, "{} < {} at step {} / {}", current, last, index, progress);
                last = current;
                progress += 0.5;
            }
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn count_down_stops_at_zero() {
        let mut state = ProgressState::new(0.15);
        state.count_down(0.1);
        assert!((state.remaining_secs - 0.05).abs() < 1e-9);
        state.count_down(0.1);
        assert_eq!(state.remaining_secs, 0.0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = ProgressState::new(10.0);
        state.step_index = 2;
        state.step_progress = 40.0;
        state.failure = Some(Failure::Analysis);
        state.result = Some(AnalysisResult::fallback());

        state.reset(22.0);
        assert_eq!(state.step_index, 0);
        assert_eq!(state.step_progress, 0.0);
        assert_eq!(state.remaining_secs, 22.0);
        assert!(state.failure.is_none());
        assert!(state.result.is_none());
    }

    #[test]
    fn missing_file_is_not_retryable() {
        assert!(!Failure::MissingFile.is_retryable());
        assert!(Failure::Analysis.is_retryable());
        assert!(Failure::Manual("boom".into()).is_retryable());
        assert_eq!(Failure::Manual("boom".into()).message(), "boom");
    }
}
