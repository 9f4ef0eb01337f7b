//! Command line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/deedcheck.toml";

#[derive(Parser, Debug)]
#[command(name = "deedcheck", version, about = "Check a property registration document for fraud-risk indicators")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload a document and show the analysis report
    Analyze(AnalyzeArgs),

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Registration document (PDF)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Config file to load (created with defaults if missing)
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_PATH, value_name = "PATH")]
    pub config: PathBuf,

    /// Analysis model, overrides `api.model`
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,

    /// Service URL, overrides `api.base_url`
    #[arg(long, value_name = "URL", env = "DEEDCHECK_BASE_URL")]
    pub base_url: Option<String>,

    /// Run the progress steps without contacting the service
    #[arg(long)]
    pub demo: bool,

    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a config file with default values
    Init {
        #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_PATH, value_name = "PATH")]
        config: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_defaults() {
        let cli = Cli::try_parse_from(["deedcheck", "analyze", "deed.pdf"]).unwrap();
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.file, PathBuf::from("deed.pdf"));
                assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_PATH));
                assert!(args.model.is_none());
                assert!(!args.demo);
                assert!(!args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn analyze_overrides() {
        let cli = Cli::try_parse_from([
            "deedcheck",
            "analyze",
            "deed.pdf",
            "--model",
            "premium",
            "--base-url",
            "https://verify.example.com",
            "--demo",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.model.as_deref(), Some("premium"));
                assert_eq!(args.base_url.as_deref(), Some("https://verify.example.com"));
                assert!(args.demo);
                assert!(args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn config_init_parses() {
        let cli = Cli::try_parse_from(["deedcheck", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Init { force: true, .. }
            }
        ));
    }
}
