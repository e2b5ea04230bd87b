//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Default filter when neither settings nor `RUST_LOG` provide one.
const DEFAULT_FILTER: &str = "metagov=info";

/// Filter used when verbose output is requested.
const VERBOSE_FILTER: &str = "metagov=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, defaulting to [`LogFormat::Pretty`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Event filter.
    pub filter: EnvFilter,
    /// Optional log file.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds the logging configuration.
    ///
    /// Filter precedence: `RUST_LOG`, then the settings filter, then the
    /// verbose or default filter.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        let fallback = settings
            .and_then(|s| s.filter.clone())
            .unwrap_or_else(|| {
                if verbose {
                    VERBOSE_FILTER.to_string()
                } else {
                    DEFAULT_FILTER.to_string()
                }
            });

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&fallback))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        Self {
            format: settings.map(|s| s.format).unwrap_or_default(),
            filter,
            file: settings.and_then(|s| s.file.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("bogus"), LogFormat::Pretty);
    }

    #[test]
    fn test_from_settings_copies_format_and_file() {
        let settings = LoggingSettings {
            format: LogFormat::Json,
            filter: Some("metagov=trace".to_string()),
            file: Some(PathBuf::from("/tmp/metagov.log")),
        };
        let config = LoggingConfig::from_settings(Some(&settings), false);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/metagov.log")));

        let config = LoggingConfig::from_settings(None, true);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
    }
}
