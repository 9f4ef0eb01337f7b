//! DeedCheck command line front end.
//!
//! Usage:
//!   deedcheck analyze deed.pdf
//!   deedcheck analyze deed.pdf --demo --json
//!   deedcheck config init

mod cli;
mod report;
mod terminal;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;

use deedcheck_core::client::HttpAnalysisClient;
use deedcheck_core::config::{ConfigManager, LoadOutcome};
use deedcheck_core::logging::{init_tracing, init_tracing_with_file};
use deedcheck_core::models::DocumentFile;
use deedcheck_core::session::{AnalysisSession, SessionOutcome};

use cli::{AnalyzeArgs, Cli, Command, ConfigAction};
use terminal::TerminalHost;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            EXIT_FAILURE
        }
    };

    // A pending retry prompt blocks on stdin; don't wait for it
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Command::Analyze(args) => analyze(args).await,
        Command::Config {
            action: ConfigAction::Init { config, force },
        } => init_config(&config, force),
    }
}

async fn analyze(args: AnalyzeArgs) -> anyhow::Result<i32> {
    let mut config = ConfigManager::new(&args.config);
    let loaded = config
        .load_or_create()
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;

    let mut settings = config.settings().clone();
    if let Some(model) = args.model {
        settings.api.model = model;
    }
    if let Some(base_url) = args.base_url {
        settings.api.base_url = base_url;
    }

    let _log_guard = if settings.logging.log_to_file {
        config.ensure_dirs_exist()?;
        Some(init_tracing_with_file(settings.logging.level, config.logs_folder()))
    } else {
        init_tracing(settings.logging.level);
        None
    };
    log_config_load(config.path(), &loaded);

    let file = open_document(&args.file, &mut io::stderr().lock());

    let client = Arc::new(HttpAnalysisClient::from_settings(&settings.api)?);
    tracing::info!("Using analysis service at {}", client.endpoint());

    let session = AnalysisSession::new(client, file, settings.api.model.clone(), &settings.progress)
        .demo(args.demo);

    let cancel = session.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling");
            cancel.cancel();
        }
    });

    let mut host = TerminalHost::new(session.handle());
    let outcome = session.run(&mut host).await;

    match outcome {
        SessionOutcome::Completed(result) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                report::print_report(&result, &mut io::stdout().lock())?;
            }
            Ok(EXIT_SUCCESS)
        }
        SessionOutcome::Cancelled => {
            eprintln!("Analysis cancelled.");
            Ok(EXIT_CANCELLED)
        }
        SessionOutcome::Failed { message, .. } => {
            tracing::debug!("Session failed: {}", message);
            Ok(EXIT_FAILURE)
        }
    }
}

fn log_config_load(path: &Path, outcome: &LoadOutcome) {
    match outcome {
        LoadOutcome::Loaded => tracing::debug!("Loaded config {}", path.display()),
        LoadOutcome::Created => tracing::info!("Wrote default config to {}", path.display()),
        LoadOutcome::Normalized(problems) => {
            for problem in problems {
                tracing::debug!("Config {}: {}", path.display(), problem);
            }
            tracing::info!("Normalized config {}", path.display());
        }
    }
}

/// Opens the document, printing why it was rejected. A rejected document
/// is treated as no document, so the session reports it as missing.
fn open_document(path: &Path, err_out: &mut impl Write) -> Option<DocumentFile> {
    match DocumentFile::open(path) {
        Ok(file) => Some(file),
        Err(err) => {
            tracing::warn!("{}", err);
            // Best effort; the session still reports the missing file
            let _ = writeln!(err_out, "Error: {}", err);
            None
        }
    }
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<i32> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    ConfigManager::new(path)
        .save()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn open_capturing(path: &Path) -> (Option<DocumentFile>, String) {
        let mut err_out = Vec::new();
        let file = open_document(path, &mut err_out);
        (file, String::from_utf8(err_out).unwrap())
    }

    #[test]
    fn rejected_document_explains_why() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deed.docx");
        fs::write(&path, b"not a pdf").unwrap();

        let (file, printed) = open_capturing(&path);
        assert!(file.is_none());
        assert!(printed.starts_with("Error: Only PDF documents are supported"));
        assert!(printed.contains("deed.docx"));
    }

    #[test]
    fn missing_document_explains_why() {
        let dir = tempfile::tempdir().unwrap();
        let (file, printed) = open_capturing(&dir.path().join("gone.pdf"));
        assert!(file.is_none());
        assert!(printed.starts_with("Error: Document not found"));
    }

    #[test]
    fn valid_document_prints_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deed.pdf");
        fs::write(&path, b"%PDF-1.4\n").unwrap();

        let (file, printed) = open_capturing(&path);
        assert_eq!(file.map(|f| f.name), Some("deed.pdf".to_string()));
        assert!(printed.is_empty());
    }
}
