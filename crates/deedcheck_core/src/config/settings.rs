//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::progress::TimingModel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Analysis service connection.
    #[serde(default)]
    pub api: ApiSettings,

    /// Simulated progress timing.
    #[serde(default)]
    pub progress: ProgressSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,
}

/// Analysis service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the analysis service (without the `/api/analyze` suffix).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every analysis request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Whole-request timeout, upload included.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_model() -> String {
    "standard".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Simulated progress timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSettings {
    /// Interval between simulated ticks in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// How much longer each simulated step takes per MB of input (0.1 = 10%).
    #[serde(default = "default_size_scale_per_mb")]
    pub size_scale_per_mb: f64,
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_size_scale_per_mb() -> f64 {
    0.1
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            size_scale_per_mb: default_size_scale_per_mb(),
        }
    }
}

impl ProgressSettings {
    /// Tick interval, never shorter than one millisecond.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Build the timing model for a file of the given size.
    pub fn timing_for(&self, file_size_kb: f64) -> TimingModel {
        TimingModel::new(file_size_kb, self.size_scale_per_mb, self.tick_interval())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level when `RUST_LOG` is not set.
    #[serde(default)]
    pub level: LogLevel,

    /// Also write a daily log file to `paths.logs_folder`.
    #[serde(default)]
    pub log_to_file: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            log_to_file: false,
        }
    }
}

/// Path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            logs_folder: default_logs_folder(),
        }
    }
}

/// Configuration sections for atomic updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Api,
    Progress,
    Logging,
    Paths,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 4] = [
        ConfigSection::Api,
        ConfigSection::Progress,
        ConfigSection::Logging,
        ConfigSection::Paths,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Api => "api",
            ConfigSection::Progress => "progress",
            ConfigSection::Logging => "logging",
            ConfigSection::Paths => "paths",
        }
    }

    /// Comment written above the section in a generated file.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Api => "# Analysis service connection",
            ConfigSection::Progress => "# Simulated progress timing",
            ConfigSection::Logging => "# Logging configuration",
            ConfigSection::Paths => "# Output and working directories",
        }
    }
}
