//! Terminal host: an indicatif bar for progress and a stdin prompt for
//! retries.

use std::io::{self, BufRead, Write};

use indicatif::{ProgressBar, ProgressStyle};

use deedcheck_core::progress::{Navigation, Phase, ProgressSnapshot};
use deedcheck_core::session::{SessionHandle, SessionHost};

const BAR_TEMPLATE: &str = "{prefix:>12.bold.cyan} [{bar:25}] {pos:>3}% {msg}";

/// Hosts a session in the terminal.
pub struct TerminalHost {
    handle: SessionHandle,
    bar: Option<ProgressBar>,
    title: String,
}

impl TerminalHost {
    pub fn new(handle: SessionHandle) -> Self {
        Self {
            handle,
            bar: None,
            title: String::new(),
        }
    }

    fn bar(&mut self) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let style = ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ");
            ProgressBar::new(100).with_style(style)
        })
    }

    fn clear_bar(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    /// Ask on stdin whether to retry, off the async runtime.
    fn prompt_retry(&self) {
        let handle = self.handle.clone();
        tokio::task::spawn_blocking(move || {
            let mut stderr = io::stderr();
            let _ = write!(stderr, "Retry? [y/N] ");
            let _ = stderr.flush();

            let mut line = String::new();
            let retry = io::stdin()
                .lock()
                .read_line(&mut line)
                .map(|_| is_yes(&line))
                .unwrap_or(false);

            if retry {
                handle.retry();
            } else {
                handle.dismiss();
            }
        });
    }
}

impl SessionHost for TerminalHost {
    fn navigate_to(&mut self, navigation: &Navigation) {
        tracing::debug!("Leaving progress view for {}", navigation.path);
        self.clear_bar();
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn render(&mut self, snapshot: &ProgressSnapshot) {
        if snapshot.phase.is_in_flight() {
            let title = self.title.clone();
            let bar = self.bar();
            bar.set_prefix(snapshot.step.title());
            bar.set_position(u64::from(snapshot.overall_percent));
            bar.set_message(format!("{} (~{:.0}s left)", title, snapshot.remaining_secs));
            return;
        }

        match snapshot.phase {
            Phase::Error => {
                self.clear_bar();
                if let Some(message) = &snapshot.error {
                    eprintln!("{}", message);
                }
                if snapshot.retryable {
                    self.prompt_retry();
                }
            }
            Phase::Success | Phase::Cancelled => self.clear_bar(),
            _ => {}
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_retries() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("n"));
        assert!(!is_yes("maybe"));
    }
}
