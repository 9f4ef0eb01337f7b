//! Inputs and outputs of the progress controller.

use serde::{Deserialize, Serialize};

use crate::models::AnalysisResult;

/// Path the host navigates to after a successful analysis.
pub const RESULT_PATH: &str = "/result";

/// Path the host navigates to when the user cancels (the upload page).
pub const CANCEL_PATH: &str = "/";

/// Something that happened, fed into [`ProgressController::update`].
///
/// Events raised by the network call or the timer carry the attempt number
/// they were issued for. The controller drops events from older attempts.
///
/// [`ProgressController::update`]: super::ProgressController::update
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Mount-time start. Issues the analysis call.
    Start,
    /// Run the simulated steps without a network call (demo path).
    BeginSimulation,
    /// Upload transport reported progress (0-100).
    UploadProgress { attempt: u64, percent: f64 },
    /// Analysis call resolved.
    AnalysisSucceeded { attempt: u64, result: AnalysisResult },
    /// Analysis call rejected.
    AnalysisFailed { attempt: u64, reason: String },
    /// Simulated timer fired.
    Tick { attempt: u64 },
    /// User asked to retry from the error panel.
    Retry,
    /// User abandoned the flow.
    Cancel,
    /// Host forced the error state.
    Fail { message: String },
}

/// Work the controller asks its driver to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Issue the analysis call for this attempt.
    RequestAnalysis { attempt: u64 },
    /// Drop any in-flight analysis call.
    AbortRequest,
    /// Start firing `Tick` events for this attempt.
    StartTicker { attempt: u64 },
    /// Stop firing `Tick` events.
    StopTicker,
    /// Update the page title.
    SetTitle(String),
    /// Leave the progress page.
    Navigate(Navigation),
}

/// Navigation request handed to the host router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    pub path: String,
    pub state: NavigationState,
}

impl Navigation {
    /// Go to the result page carrying the report.
    pub fn to_result(result: AnalysisResult) -> Self {
        Self {
            path: RESULT_PATH.to_string(),
            state: NavigationState::Result(Box::new(result)),
        }
    }

    /// Go back to the upload page.
    pub fn to_upload() -> Self {
        Self {
            path: CANCEL_PATH.to_string(),
            state: NavigationState::Empty,
        }
    }
}

/// State carried along with a navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum NavigationState {
    Empty,
    Result(Box<AnalysisResult>),
}
