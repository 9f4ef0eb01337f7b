//! Analysis progress controller.
//!
//! A reducer: every input is an [`Event`], every output is a list of
//! [`Effect`]s for the driver to carry out. The controller never reads a
//! clock and never touches the network, so the whole transition table can
//! be exercised synchronously.
//!
//! ```text
//! Idle ──Start──▶ Uploading ──ok──▶ Extracting ─▶ Analyzing ─▶ Generating ─▶ Success
//!   │                 │                  (tick)        (tick)        (tick)
//!   │ no file         │ failed
//!   ▼                 ▼
//! Error ◀─────────── Error ──Retry──▶ Uploading
//!
//! any non-terminal ──Cancel──▶ Cancelled
//! ```

use crate::models::AnalysisResult;

use super::events::{Effect, Event, Navigation};
use super::state::{Failure, Phase, ProgressSnapshot, ProgressState};
use super::step::AnalysisStep;
use super::timing::TimingModel;

/// Title used when no analysis is showing.
pub const BASE_TITLE: &str = "DeedCheck";

/// Drives one document through the four-step progress sequence.
#[derive(Debug, Clone)]
pub struct ProgressController {
    phase: Phase,
    state: ProgressState,
    timing: TimingModel,
    has_file: bool,
    /// Incremented for every analysis call or simulation run.
    attempt: u64,
}

impl ProgressController {
    /// Create a controller in the idle phase.
    ///
    /// `has_file` is the precondition for `Start`: without a document the
    /// controller goes straight to a non-retryable error.
    pub fn new(has_file: bool, timing: TimingModel) -> Self {
        Self {
            phase: Phase::Idle,
            state: ProgressState::new(timing.initial_remaining_secs()),
            timing,
            has_file,
            attempt: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn timing(&self) -> &TimingModel {
        &self.timing
    }

    /// Current attempt number (0 before the first start).
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Overall percentage across all steps.
    pub fn overall_percent(&self) -> u8 {
        self.state.overall_percent()
    }

    /// Whether the current error can be retried.
    pub fn can_retry(&self) -> bool {
        self.phase == Phase::Error
            && self
                .state
                .failure
                .as_ref()
                .map(Failure::is_retryable)
                .unwrap_or(false)
    }

    /// Whether no further event can change the outcome.
    ///
    /// True for success, cancellation and non-retryable errors.
    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal() || (self.phase == Phase::Error && !self.can_retry())
    }

    /// Read-only view for rendering.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            phase: self.phase,
            step: self.state.step(),
            step_progress: self.state.step_progress,
            overall_percent: self.state.overall_percent(),
            remaining_secs: self.state.remaining_secs,
            error: self.state.failure.as_ref().map(|f| f.message().to_string()),
            retryable: self.can_retry(),
        }
    }

    /// Apply one event and return the effects it produces.
    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Start => self.on_start(),
            Event::BeginSimulation => self.on_begin_simulation(),
            Event::UploadProgress { attempt, percent } => self.on_upload_progress(attempt, percent),
            Event::AnalysisSucceeded { attempt, result } => self.on_success(attempt, result),
            Event::AnalysisFailed { attempt, reason } => self.on_failure(attempt, &reason),
            Event::Tick { attempt } => self.on_tick(attempt),
            Event::Retry => self.on_retry(),
            Event::Cancel => self.on_cancel(),
            Event::Fail { message } => self.on_manual_fail(message),
        }
    }

    fn on_start(&mut self) -> Vec<Effect> {
        // Re-entrancy guard: a second mount-time start must not issue a
        // second request.
        if self.phase != Phase::Idle {
            tracing::debug!("Ignoring start in phase {}", self.phase);
            return Vec::new();
        }

        if !self.has_file {
            tracing::warn!("Analysis started without a document");
            return self.enter_error(Failure::MissingFile);
        }

        self.begin_upload()
    }

    fn on_begin_simulation(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Idle {
            tracing::debug!("Ignoring simulation start in phase {}", self.phase);
            return Vec::new();
        }

        self.attempt += 1;
        self.state.reset(self.timing.initial_remaining_secs());
        self.enter_step(AnalysisStep::Extract);
        tracing::info!("Running simulated analysis (attempt {})", self.attempt);

        vec![
            Effect::SetTitle(self.progress_title()),
            Effect::StartTicker {
                attempt: self.attempt,
            },
        ]
    }

    fn on_upload_progress(&mut self, attempt: u64, percent: f64) -> Vec<Effect> {
        if !self.is_current(attempt) || self.phase != Phase::Uploading {
            return Vec::new();
        }

        self.state.step_progress = percent.clamp(0.0, 100.0);
        vec![Effect::SetTitle(self.progress_title())]
    }

    fn on_success(&mut self, attempt: u64, result: AnalysisResult) -> Vec<Effect> {
        if !self.is_current(attempt) || self.phase != Phase::Uploading {
            tracing::debug!("Dropping analysis result for attempt {}", attempt);
            return Vec::new();
        }

        tracing::info!(
            "Analysis call resolved ({} report field(s)), simulating remaining steps",
            result.payload().len()
        );
        self.state.result = Some(result);
        self.enter_step(AnalysisStep::Extract);

        vec![
            Effect::SetTitle(self.progress_title()),
            Effect::StartTicker {
                attempt: self.attempt,
            },
        ]
    }

    fn on_failure(&mut self, attempt: u64, reason: &str) -> Vec<Effect> {
        if !self.is_current(attempt) || self.phase != Phase::Uploading {
            tracing::debug!("Dropping analysis failure for attempt {}", attempt);
            return Vec::new();
        }

        tracing::warn!("Analysis call failed: {}", reason);
        self.enter_error(Failure::Analysis)
    }

    fn on_tick(&mut self, attempt: u64) -> Vec<Effect> {
        if !self.is_current(attempt) || !self.phase.is_simulated() {
            return Vec::new();
        }

        let step = self.state.step();
        self.state.step_progress += self.timing.increment_per_tick(step);
        self.state.count_down(self.timing.tick_secs());

        if self.state.step_progress < 100.0 {
            return vec![Effect::SetTitle(self.progress_title())];
        }

        match step.next() {
            Some(next) => {
                tracing::debug!("Step '{}' complete, moving to '{}'", step, next);
                self.enter_step(next);
                vec![Effect::SetTitle(self.progress_title())]
            }
            None => self.complete(),
        }
    }

    fn on_retry(&mut self) -> Vec<Effect> {
        if !self.can_retry() {
            tracing::debug!("Ignoring retry in phase {}", self.phase);
            return Vec::new();
        }

        tracing::info!("Retrying analysis");
        self.begin_upload()
    }

    fn on_cancel(&mut self) -> Vec<Effect> {
        if self.phase.is_terminal() {
            return Vec::new();
        }

        tracing::info!("Analysis cancelled in phase {}", self.phase);
        self.phase = Phase::Cancelled;
        self.state.result = None;

        vec![
            Effect::StopTicker,
            Effect::AbortRequest,
            Effect::SetTitle(BASE_TITLE.to_string()),
            Effect::Navigate(Navigation::to_upload()),
        ]
    }

    fn on_manual_fail(&mut self, message: String) -> Vec<Effect> {
        if !self.phase.is_in_flight() {
            tracing::debug!("Ignoring manual failure in phase {}", self.phase);
            return Vec::new();
        }

        tracing::warn!("Analysis failed on request: {}", message);
        self.enter_error(Failure::Manual(message))
    }

    /// Reset to step 0 and issue a new analysis call.
    fn begin_upload(&mut self) -> Vec<Effect> {
        self.attempt += 1;
        self.state.reset(self.timing.initial_remaining_secs());
        self.phase = Phase::Uploading;
        tracing::info!(
            "Uploading document (attempt {}, estimate {:.1}s)",
            self.attempt,
            self.state.remaining_secs
        );

        vec![
            Effect::SetTitle(self.progress_title()),
            Effect::RequestAnalysis {
                attempt: self.attempt,
            },
        ]
    }

    fn enter_step(&mut self, step: AnalysisStep) {
        self.state.step_index = step.index();
        self.state.step_progress = 0.0;
        self.phase = Phase::for_step(step);
    }

    fn enter_error(&mut self, failure: Failure) -> Vec<Effect> {
        self.phase = Phase::Error;
        self.state.failure = Some(failure);
        self.state.result = None;

        vec![
            Effect::StopTicker,
            Effect::AbortRequest,
            Effect::SetTitle(format!("Analysis failed | {}", BASE_TITLE)),
        ]
    }

    fn complete(&mut self) -> Vec<Effect> {
        self.state.step_index = AnalysisStep::Generate.index();
        self.state.step_progress = 100.0;
        self.phase = Phase::Success;

        let result = self.state.result.take().unwrap_or_else(|| {
            tracing::info!("No analysis result buffered, using sample report");
            AnalysisResult::fallback()
        });
        tracing::info!("Analysis complete");

        vec![
            Effect::StopTicker,
            Effect::SetTitle(format!("Analysis complete | {}", BASE_TITLE)),
            Effect::Navigate(Navigation::to_result(result)),
        ]
    }

    fn is_current(&self, attempt: u64) -> bool {
        attempt == self.attempt
    }

    fn progress_title(&self) -> String {
        format!("{}% Analyzing | {}", self.state.overall_percent(), BASE_TITLE)
    }
}
