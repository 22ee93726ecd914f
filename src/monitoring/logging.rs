//! Structured logging.
//!
//! Diagnostics go through `tracing`. This module installs the subscriber
//! and maps c-icap style numeric debug levels onto tracing levels.

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Errors only (debug level 1)
    Error = 1,
    /// Warnings (debug level 3)
    Warn = 3,
    /// Operator messages (debug level 5)
    Message = 5,
    /// Informational (debug level 7)
    Info = 7,
    /// Everything (debug level 9)
    Debug = 9,
}

impl LogLevel {
    /// Map a numeric debug level. Values between steps round down; 0 is
    /// treated as errors only.
    pub fn from_ci_level(level: u8) -> Self {
        match level {
            0..=2 => LogLevel::Error,
            3..=4 => LogLevel::Warn,
            5..=6 => LogLevel::Message,
            7..=8 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    pub fn ci_level(&self) -> u8 {
        *self as u8
    }

    /// Corresponding tracing level.
    pub fn as_tracing(&self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Message | LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Message | LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
        }
    }
}

/// Logger configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Minimum log level
    pub level: LogLevel,
    /// Include module targets in output
    pub targets: bool,
    /// Use ANSI colors
    pub ansi: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            targets: true,
            ansi: false,
        }
    }
}

impl LoggerConfig {
    /// Filter directive; `RUST_LOG` wins when set.
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.to_string()))
    }
}

/// Install the global subscriber.
///
/// Returns false if one was already installed.
pub fn init_logging(config: &LoggerConfig) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_target(config.targets)
        .with_ansi(config.ansi)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ci_level() {
        assert_eq!(LogLevel::from_ci_level(0), LogLevel::Error);
        assert_eq!(LogLevel::from_ci_level(1), LogLevel::Error);
        assert_eq!(LogLevel::from_ci_level(3), LogLevel::Warn);
        assert_eq!(LogLevel::from_ci_level(6), LogLevel::Message);
        assert_eq!(LogLevel::from_ci_level(7), LogLevel::Info);
        assert_eq!(LogLevel::from_ci_level(200), LogLevel::Debug);
        assert_eq!(LogLevel::Info.ci_level(), 7);
    }

    #[test]
    fn test_tracing_mapping() {
        assert_eq!(LogLevel::Error.as_tracing(), Level::ERROR);
        assert_eq!(LogLevel::Message.as_tracing(), Level::INFO);
        assert_eq!(LogLevel::Debug.as_tracing(), Level::DEBUG);
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Message);
        assert!(LogLevel::Message < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
    }

    #[test]
    fn test_init_logging_twice() {
        let config = LoggerConfig::default();
        init_logging(&config);
        assert!(!init_logging(&config));
    }
}
