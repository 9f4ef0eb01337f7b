//! tracing setup.
//!
//! Console output always goes to stderr so stdout stays clean for reports
//! and `--json`. With `[logging] log_to_file` a daily file is added under
//! `[paths] logs_folder`.
//!
//! ```no_run
//! use deedcheck_core::logging::{init_tracing_with_file, LogLevel};
//!
//! // Dropping the guard flushes and closes the file writer
//! let _guard = init_tracing_with_file(LogLevel::Info, ".logs");
//! tracing::info!("Starting analysis");
//! ```

mod types;

pub use types::LogLevel;

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix; the appender adds the date.
const LOG_FILE_PREFIX: &str = "deedcheck.log";

/// `RUST_LOG` if set, otherwise the configured level for everything.
fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::from(default_level).into())
        .from_env_lossy()
}

/// Install the global subscriber: stderr only.
///
/// Call once, at startup.
pub fn init_tracing(default_level: LogLevel) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter(default_level))
        .init();
}

/// Install the global subscriber: stderr plus a daily file in `log_dir`.
///
/// Keep the returned guard alive for as long as logging should reach the
/// file.
pub fn init_tracing_with_file(default_level: LogLevel, log_dir: impl AsRef<Path>) -> WorkerGuard {
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir.as_ref(), LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(env_filter(default_level))
        .init();

    guard
}

/// Quiet subscriber for tests; safe to call from every test.
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_uses_configured_level() {
        // Only meaningful without RUST_LOG in the environment
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(
                env_filter(LogLevel::Debug).max_level_hint(),
                Some(tracing_subscriber::filter::LevelFilter::DEBUG)
            );
        }
    }

    #[test]
    fn test_tracing_tolerates_repeat_init() {
        init_test_tracing();
        init_test_tracing();
        tracing::warn!("test subscriber active");
    }
}
