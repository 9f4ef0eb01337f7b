//! Configuration management for DeedCheck.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use deedcheck_core::config::{ConfigManager, ConfigSection};
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new(".config/deedcheck.toml");
//! config.load_or_create().unwrap();
//!
//! // Read settings
//! println!("Service: {}", config.settings().api.base_url);
//!
//! // Modify a setting
//! config.settings_mut().progress.tick_interval_ms = 50;
//!
//! // Save just the progress section atomically
//! config.update_section(ConfigSection::Progress).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult, LoadOutcome};
pub use settings::{
    ApiSettings, ConfigSection, LoggingSettings, PathSettings, ProgressSettings, Settings,
};
