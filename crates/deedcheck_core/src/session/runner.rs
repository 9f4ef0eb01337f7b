//! Session driver: runs a [`ProgressController`] against the network and
//! the tokio clock.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::client::{AnalysisClient, UploadProgressFn};
use crate::config::ProgressSettings;
use crate::models::{AnalysisResult, DocumentFile};
use crate::progress::{
    Effect, Event, NavigationState, Phase, ProgressController, ANALYSIS_FAILED_MESSAGE,
};

use super::host::{PageTitle, SessionHost};

/// Host request sent through a [`SessionHandle`].
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Start,
    Retry,
    Cancel,
    Fail(String),
    Dismiss,
}

/// Cloneable remote control for a running session.
///
/// Every method returns `false` once the session has ended.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    /// Ask for the mount-time start. Ignored unless the session is idle.
    pub fn start(&self) -> bool {
        self.send(Command::Start)
    }

    /// Retry after a retryable error.
    pub fn retry(&self) -> bool {
        self.send(Command::Retry)
    }

    /// Abandon the analysis and go back to the upload page.
    pub fn cancel(&self) -> bool {
        self.send(Command::Cancel)
    }

    /// Force the error state while work is in flight.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        self.send(Command::Fail(message.into()))
    }

    /// Give up on a retryable error and end the session as failed.
    pub fn dismiss(&self) -> bool {
        self.send(Command::Dismiss)
    }

    fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// The report, exactly as the service returned it (or the sample report
    /// on the demo path).
    Completed(AnalysisResult),
    /// The user cancelled.
    Cancelled,
    /// The session stopped in the error phase.
    Failed { message: String, retryable: bool },
}

/// One document, one controller, one run.
pub struct AnalysisSession<C: AnalysisClient> {
    client: Arc<C>,
    file: Option<DocumentFile>,
    model: String,
    controller: ProgressController,
    demo: bool,
    title: PageTitle,
    commands_tx: mpsc::UnboundedSender<Command>,
    commands_rx: mpsc::UnboundedReceiver<Command>,
}

impl<C: AnalysisClient> AnalysisSession<C> {
    /// Create a session for `file`. `None` means nothing was selected; the
    /// run then ends in the missing-file error.
    pub fn new(
        client: Arc<C>,
        file: Option<DocumentFile>,
        model: impl Into<String>,
        progress: &ProgressSettings,
    ) -> Self {
        let size_kb = file.as_ref().map(DocumentFile::size_kb).unwrap_or(0.0);
        let controller = ProgressController::new(file.is_some(), progress.timing_for(size_kb));
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        Self {
            client,
            file,
            model: model.into(),
            controller,
            demo: false,
            title: PageTitle::default(),
            commands_tx,
            commands_rx,
        }
    }

    /// Run the simulated steps only, without calling the service.
    pub fn demo(mut self, demo: bool) -> Self {
        self.demo = demo;
        self
    }

    /// Share an existing page title instead of a fresh one.
    pub fn with_title(mut self, title: PageTitle) -> Self {
        self.title = title;
        self
    }

    pub fn title(&self) -> PageTitle {
        self.title.clone()
    }

    pub fn controller(&self) -> &ProgressController {
        &self.controller
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            tx: self.commands_tx.clone(),
        }
    }

    /// Start the analysis and drive it to an outcome.
    ///
    /// A retryable error waits for a command from a [`SessionHandle`]. If
    /// every handle is gone by then, the session ends as failed.
    pub async fn run(self, host: &mut dyn SessionHost) -> SessionOutcome {
        let AnalysisSession {
            client,
            file,
            model,
            controller,
            demo,
            title,
            commands_tx,
            mut commands_rx,
        } = self;
        // Only external handles keep the command channel open
        drop(commands_tx);

        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let mut driver = Driver {
            controller,
            client,
            file,
            model,
            title,
            events_tx,
            request: None,
            ticker: None,
            result: None,
        };

        let first = if demo { Event::BeginSimulation } else { Event::Start };
        driver.apply(first, host);

        let mut commands_open = true;
        let mut dismissed = false;

        loop {
            if driver.controller.is_finished() {
                break;
            }
            if driver.controller.phase() == Phase::Error && (dismissed || !commands_open) {
                tracing::info!("Leaving session in error phase");
                break;
            }

            tokio::select! {
                Some(event) = events_rx.recv() => driver.apply(event, host),
                command = commands_rx.recv(), if commands_open => match command {
                    Some(command) => match command.into_event() {
                        Some(event) => driver.apply(event, host),
                        None => dismissed = driver.controller.phase() == Phase::Error,
                    },
                    None => {
                        tracing::debug!("All session handles dropped");
                        commands_open = false;
                    }
                },
                else => break,
            }
        }

        driver.abort_tasks();
        driver.outcome()
    }
}

impl Command {
    /// Controller event for this command. `Dismiss` only affects the loop.
    fn into_event(self) -> Option<Event> {
        match self {
            Command::Start => Some(Event::Start),
            Command::Retry => Some(Event::Retry),
            Command::Cancel => Some(Event::Cancel),
            Command::Fail(message) => Some(Event::Fail { message }),
            Command::Dismiss => None,
        }
    }
}

/// Live state of a running session.
struct Driver<C: AnalysisClient> {
    controller: ProgressController,
    client: Arc<C>,
    file: Option<DocumentFile>,
    model: String,
    title: PageTitle,
    events_tx: mpsc::UnboundedSender<Event>,
    request: Option<JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,
    /// Result handed over by the success navigation.
    result: Option<AnalysisResult>,
}

impl<C: AnalysisClient> Driver<C> {
    fn apply(&mut self, event: Event, host: &mut dyn SessionHost) {
        let effects = self.controller.update(event);
        if effects.is_empty() {
            return;
        }

        for effect in effects {
            self.perform(effect, host);
        }
        host.render(&self.controller.snapshot());
    }

    fn perform(&mut self, effect: Effect, host: &mut dyn SessionHost) {
        match effect {
            Effect::RequestAnalysis { attempt } => self.spawn_request(attempt),
            Effect::AbortRequest => {
                if let Some(task) = self.request.take() {
                    tracing::debug!("Aborting analysis request");
                    task.abort();
                }
            }
            Effect::StartTicker { attempt } => self.spawn_ticker(attempt),
            Effect::StopTicker => {
                if let Some(task) = self.ticker.take() {
                    task.abort();
                }
            }
            Effect::SetTitle(title) => {
                self.title.set(&title);
                host.set_title(&title);
            }
            Effect::Navigate(navigation) => {
                tracing::debug!("Navigating to {}", navigation.path);
                host.navigate_to(&navigation);
                if let NavigationState::Result(result) = navigation.state {
                    self.result = Some(*result);
                }
            }
        }
    }

    fn spawn_request(&mut self, attempt: u64) {
        if let Some(previous) = self.request.take() {
            previous.abort();
        }

        let tx = self.events_tx.clone();
        let Some(file) = self.file.clone() else {
            let _ = tx.send(Event::AnalysisFailed {
                attempt,
                reason: "no document".to_string(),
            });
            return;
        };

        let client = Arc::clone(&self.client);
        let model = self.model.clone();

        self.request = Some(tokio::spawn(async move {
            let progress_tx = tx.clone();
            let on_upload_progress: UploadProgressFn = Arc::new(move |percent| {
                let _ = progress_tx.send(Event::UploadProgress { attempt, percent });
            });

            let event = match client.analyze(&file, &model, on_upload_progress).await {
                Ok(result) => Event::AnalysisSucceeded { attempt, result },
                Err(err) => Event::AnalysisFailed {
                    attempt,
                    reason: err.to_string(),
                },
            };
            let _ = tx.send(event);
        }));
    }

    fn spawn_ticker(&mut self, attempt: u64) {
        if let Some(previous) = self.ticker.take() {
            previous.abort();
        }

        let tx = self.events_tx.clone();
        let period = self.controller.timing().tick_interval;

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Event::Tick { attempt }).is_err() {
                    break;
                }
            }
        }));
    }

    fn abort_tasks(&mut self) {
        for task in [self.request.take(), self.ticker.take()].into_iter().flatten() {
            task.abort();
        }
    }

    fn outcome(mut self) -> SessionOutcome {
        match self.controller.phase() {
            Phase::Success => {
                SessionOutcome::Completed(self.result.take().unwrap_or_else(AnalysisResult::fallback))
            }
            Phase::Cancelled => SessionOutcome::Cancelled,
            _ => {
                let snapshot = self.controller.snapshot();
                SessionOutcome::Failed {
                    message: snapshot
                        .error
                        .unwrap_or_else(|| ANALYSIS_FAILED_MESSAGE.to_string()),
                    retryable: snapshot.retryable,
                }
            }
        }
    }
}
