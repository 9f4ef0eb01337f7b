use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

/// `[logging] level` in the config file. `RUST_LOG` wins when set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// No output at all.
    Off,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_variants_are_more_verbose() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Error < LogLevel::Off);
        assert!(LevelFilter::from(LogLevel::Debug) > LevelFilter::from(LogLevel::Warn));
    }

    #[test]
    fn parses_from_config_value() {
        #[derive(Deserialize)]
        struct Section {
            level: LogLevel,
        }
        let parsed: Section = toml::from_str("level = \"warn\"").unwrap();
        assert_eq!(parsed.level, LogLevel::Warn);
        assert_eq!(LevelFilter::from(parsed.level), LevelFilter::WARN);

        let off: Section = toml::from_str("level = \"off\"").unwrap();
        assert_eq!(LevelFilter::from(off.level), LevelFilter::OFF);
    }
}
