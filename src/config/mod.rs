//! Configuration management.
//!
//! The engine host reads an optional TOML file, then applies `METAGOV_*`
//! environment overrides.
//!
//! ```toml
//! server_name = "engine-host-1"
//! user_id = "enginehost"
//! start_poll_interval_ms = 250
//!
//! [service_pool]
//! max_concurrent = 4
//! fail_fast = true
//!
//! [repository_bulkhead]
//! max_concurrent = 16
//!
//! [logging]
//! format = "json"
//! filter = "metagov=debug"
//! ```

use crate::bulkhead::BulkheadConfig;
use crate::observability::LogFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Permits for concurrently running governance services.
pub type ServicePoolConfig = BulkheadConfig;

/// Default interval between start-time checks.
const DEFAULT_START_POLL_INTERVAL_MS: u64 = 100;

/// Logging settings as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Output format.
    pub format: LogFormat,
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: Option<String>,
    /// Optional log file; logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

/// Main configuration for an engine host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineHostConfig {
    /// Name of this server, copied into element headers.
    pub server_name: String,
    /// User id the host acts as when recording completions.
    pub user_id: String,
    /// Bounds on concurrently running services.
    pub service_pool: ServicePoolConfig,
    /// Bounds on concurrent repository calls.
    pub repository_bulkhead: BulkheadConfig,
    /// How often a waiting runner re-checks its start time.
    pub start_poll_interval_ms: u64,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Server name.
    pub server_name: Option<String>,
    /// Host user id.
    pub user_id: Option<String>,
    /// Start-time poll interval.
    pub start_poll_interval_ms: Option<u64>,
    /// Service pool section.
    pub service_pool: Option<BulkheadConfig>,
    /// Repository bulkhead section.
    pub repository_bulkhead: Option<BulkheadConfig>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Filter directive.
    pub filter: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

impl Default for EngineHostConfig {
    fn default() -> Self {
        Self {
            server_name: "metagov".to_string(),
            user_id: "enginehost".to_string(),
            service_pool: ServicePoolConfig::new().with_max_concurrent(4),
            repository_bulkhead: BulkheadConfig::new(),
            start_poll_interval_ms: DEFAULT_START_POLL_INTERVAL_MS,
            logging: LoggingSettings::default(),
        }
    }
}

impl EngineHostConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::server("read_config_file", e))?;

        let file: ConfigFile =
            toml::from_str(&contents).map_err(|e| crate::Error::server("parse_config_file", e))?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks `<platform config dir>/metagov/config.toml`, then
    /// `~/.config/metagov/config.toml`. Returns the default configuration if
    /// neither exists or parses.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("metagov").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("metagov")
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                },
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `EngineHostConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(server_name) = file.server_name {
            config.server_name = server_name;
        }
        if let Some(user_id) = file.user_id {
            config.user_id = user_id;
        }
        if let Some(interval) = file.start_poll_interval_ms {
            config.start_poll_interval_ms = interval.max(1);
        }
        if let Some(pool) = file.service_pool {
            config.service_pool = pool;
        }
        if let Some(bulkhead) = file.repository_bulkhead {
            config.repository_bulkhead = bulkhead;
        }
        if let Some(logging) = file.logging {
            if let Some(format) = logging.format {
                config.logging.format = LogFormat::parse(&format);
            }
            config.logging.filter = logging.filter;
            config.logging.file = logging.file.map(PathBuf::from);
        }

        config
    }

    /// Applies `METAGOV_*` environment variable overrides.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `METAGOV_SERVER_NAME` | Server name |
    /// | `METAGOV_USER_ID` | Host user id |
    /// | `METAGOV_START_POLL_INTERVAL_MS` | Start-time poll interval |
    /// | `METAGOV_LOG_FORMAT` | `pretty` or `json` |
    /// | `METAGOV_LOG_FILTER` | Filter directive |
    /// | `METAGOV_LOG_FILE` | Log file path |
    /// | `METAGOV_POOL_*` | Service pool (see [`BulkheadConfig::with_env_overrides`]) |
    /// | `METAGOV_REPOSITORY_*` | Repository bulkhead |
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.service_pool = self.service_pool.with_env_overrides("METAGOV_POOL");
        self.repository_bulkhead = self
            .repository_bulkhead
            .with_env_overrides("METAGOV_REPOSITORY");
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("METAGOV_SERVER_NAME") {
            self.server_name = v;
        }
        if let Some(v) = lookup("METAGOV_USER_ID") {
            self.user_id = v;
        }
        if let Some(parsed) =
            lookup("METAGOV_START_POLL_INTERVAL_MS").and_then(|v| v.parse::<u64>().ok())
        {
            self.start_poll_interval_ms = parsed.max(1);
        }
        if let Some(v) = lookup("METAGOV_LOG_FORMAT") {
            self.logging.format = LogFormat::parse(&v);
        }
        if let Some(v) = lookup("METAGOV_LOG_FILTER") {
            self.logging.filter = Some(v);
        }
        if let Some(v) = lookup("METAGOV_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(v));
        }
        self
    }

    /// Sets the server name.
    #[must_use]
    pub fn with_server_name(mut self, server_name: impl Into<String>) -> Self {
        self.server_name = server_name.into();
        self
    }

    /// Sets the service pool configuration.
    #[must_use]
    pub const fn with_service_pool(mut self, pool: ServicePoolConfig) -> Self {
        self.service_pool = pool;
        self
    }

    /// Sets the start-time poll interval.
    #[must_use]
    pub const fn with_start_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.start_poll_interval_ms = interval_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineHostConfig::default();
        assert_eq!(config.server_name, "metagov");
        assert_eq!(config.service_pool.max_concurrent, 4);
        assert_eq!(config.start_poll_interval_ms, DEFAULT_START_POLL_INTERVAL_MS);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server_name = "host-a"
start_poll_interval_ms = 0

[service_pool]
max_concurrent = 2
fail_fast = true

[logging]
format = "json"
filter = "metagov=debug"
"#
        )
        .unwrap();

        let config = EngineHostConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.server_name, "host-a");
        assert_eq!(config.user_id, "enginehost");
        assert_eq!(config.start_poll_interval_ms, 1);
        assert_eq!(config.service_pool.max_concurrent, 2);
        assert!(config.service_pool.fail_fast);
        assert_eq!(config.service_pool.acquire_timeout_ms, 5000);
        assert_eq!(config.repository_bulkhead, BulkheadConfig::default());
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.filter.as_deref(), Some("metagov=debug"));
    }

    #[test]
    fn test_invalid_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_name = [").unwrap();
        let err = EngineHostConfig::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("parse_config_file"));

        let missing = EngineHostConfig::load_from_file(Path::new("/nonexistent/metagov.toml"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("METAGOV_SERVER_NAME", "from-env"),
            ("METAGOV_START_POLL_INTERVAL_MS", "25"),
            ("METAGOV_LOG_FORMAT", "JSON"),
            ("METAGOV_LOG_FILE", "/tmp/metagov.log"),
        ]
        .into_iter()
        .collect();

        let config = EngineHostConfig::default()
            .apply_overrides(|name| env.get(name).map(|v| (*v).to_string()));
        assert_eq!(config.server_name, "from-env");
        assert_eq!(config.start_poll_interval_ms, 25);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/metagov.log")));
    }
}
