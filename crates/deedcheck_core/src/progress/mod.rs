//! Analysis progress: the four-step sequence shown while a document is
//! being analyzed.
//!
//! # Architecture
//!
//! ```text
//! ProgressController (reducer)
//!     ├── Step: Upload    (real upload progress)
//!     ├── Step: Extract   (timer)
//!     ├── Step: Analyze   (timer)
//!     └── Step: Generate  (timer)
//! ```
//!
//! The controller is pure. [`crate::session`] feeds it network and timer
//! events and carries out the effects it returns.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use deedcheck_core::progress::{Effect, Event, Phase, ProgressController, TimingModel};
//!
//! let timing = TimingModel::new(1000.0, 0.1, Duration::from_millis(100));
//! let mut controller = ProgressController::new(true, timing);
//!
//! let effects = controller.update(Event::Start);
//! assert_eq!(controller.phase(), Phase::Uploading);
//! assert!(effects.contains(&Effect::RequestAnalysis { attempt: 1 }));
//! ```

mod controller;
mod events;
mod state;
mod step;
mod timing;

pub use controller::{ProgressController, BASE_TITLE};
pub use events::{Effect, Event, Navigation, NavigationState, CANCEL_PATH, RESULT_PATH};
pub use state::{
    overall_percent, Failure, Phase, ProgressSnapshot, ProgressState, ANALYSIS_FAILED_MESSAGE,
    MISSING_FILE_MESSAGE,
};
pub use step::AnalysisStep;
pub use timing::TimingModel;
