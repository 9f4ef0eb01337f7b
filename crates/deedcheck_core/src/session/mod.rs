//! Runs the progress controller on the tokio runtime.
//!
//! An [`AnalysisSession`] owns one controller. It turns `RequestAnalysis`
//! into a spawned call on an [`AnalysisClient`](crate::client::AnalysisClient),
//! `StartTicker` into an interval task, and forwards titles, navigation and
//! snapshots to a [`SessionHost`]. Hosts talk back through a
//! [`SessionHandle`].

mod host;
mod runner;

pub use host::{PageTitle, SessionHost};
pub use runner::{AnalysisSession, SessionHandle, SessionOutcome};
