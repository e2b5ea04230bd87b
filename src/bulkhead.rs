//! Bulkhead pattern: a bounded pool of permits.
//!
//! Used to cap concurrent repository calls and concurrently running
//! governance services. Uses a semaphore so that exceeding the limit either
//! waits (with a timeout) or fails fast.
//!
//! # Usage
//!
//! ```rust,ignore
//! use metagov::bulkhead::{Bulkhead, BulkheadConfig};
//!
//! let bulkhead = Bulkhead::new(BulkheadConfig::default(), "repository");
//! let value = bulkhead.execute("get_entity", || repository.get_entity(&guid))?;
//! ```

use crate::{Error, Result};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Safety cap used when the configured acquire timeout is zero.
const MAX_ACQUIRE_WAIT_MS: u64 = 60_000;

/// Configuration for a bulkhead.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BulkheadConfig {
    /// Maximum concurrent holders of a permit.
    ///
    /// Default: 10.
    pub max_concurrent: usize,

    /// Timeout for acquiring a permit in milliseconds (0 = safety cap).
    ///
    /// Default: 5000ms.
    pub acquire_timeout_ms: u64,

    /// Whether to fail immediately when no permit is free.
    ///
    /// Default: false (wait for permit).
    pub fail_fast: bool,
}

impl Default for BulkheadConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BulkheadConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_concurrent: 10,
            acquire_timeout_ms: 5000,
            fail_fast: false,
        }
    }

    /// Applies environment variable overrides using `prefix`.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `{prefix}_MAX_CONCURRENT` | Max concurrent permits |
    /// | `{prefix}_ACQUIRE_TIMEOUT_MS` | Permit timeout |
    /// | `{prefix}_FAIL_FAST` | Fail when full |
    #[must_use]
    pub fn with_env_overrides(mut self, prefix: &str) -> Self {
        if let Ok(v) = std::env::var(format!("{prefix}_MAX_CONCURRENT"))
            && let Ok(parsed) = v.parse::<usize>()
        {
            self.max_concurrent = parsed.max(1);
        }
        if let Ok(v) = std::env::var(format!("{prefix}_ACQUIRE_TIMEOUT_MS"))
            && let Ok(parsed) = v.parse::<u64>()
        {
            self.acquire_timeout_ms = parsed;
        }
        if let Ok(v) = std::env::var(format!("{prefix}_FAIL_FAST")) {
            self.fail_fast = v.to_lowercase() == "true" || v == "1";
        }
        self
    }

    /// Sets the maximum concurrent permits.
    #[must_use]
    pub const fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }

    /// Sets the acquire timeout in milliseconds.
    #[must_use]
    pub const fn with_acquire_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.acquire_timeout_ms = timeout_ms;
        self
    }

    /// Sets whether to fail fast when full.
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// A named pool of permits.
#[derive(Debug, Clone)]
pub struct Bulkhead {
    config: BulkheadConfig,
    semaphore: Arc<Semaphore>,
    name: &'static str,
}

impl Bulkhead {
    /// Creates a bulkhead.
    #[must_use]
    pub fn new(config: BulkheadConfig, name: &'static str) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        Self {
            config,
            semaphore,
            name,
        }
    }

    /// Returns the number of free permits.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &BulkheadConfig {
        &self.config
    }

    /// Acquires a permit, respecting the timeout and fail-fast settings.
    ///
    /// The permit is released when dropped, so it can be moved into a worker
    /// thread and held for the whole of the work.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServerError`] when the bulkhead is full (fail-fast) or
    /// the timeout elapses.
    pub fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        let available = self.semaphore.available_permits();

        #[allow(clippy::cast_precision_loss)]
        let available_gauge = available as f64;
        metrics::gauge!("bulkhead_available_permits", "bulkhead" => self.name)
            .set(available_gauge);

        if self.config.fail_fast {
            return self.acquire_fail_fast(available);
        }

        let timeout_ms = if self.config.acquire_timeout_ms == 0 {
            MAX_ACQUIRE_WAIT_MS
        } else {
            self.config.acquire_timeout_ms
        };

        self.acquire_with_timeout(timeout_ms)
    }

    fn acquire_fail_fast(&self, available: usize) -> Result<OwnedSemaphorePermit> {
        Arc::clone(&self.semaphore).try_acquire_owned().map_or_else(
            |_| {
                metrics::counter!(
                    "bulkhead_rejections_total",
                    "bulkhead" => self.name,
                    "reason" => "full"
                )
                .increment(1);
                Err(Error::ServerError {
                    operation: format!("{}_bulkhead_acquire", self.name),
                    cause: format!(
                        "bulkhead full: {} concurrent operations (max: {})",
                        self.config.max_concurrent.saturating_sub(available),
                        self.config.max_concurrent
                    ),
                })
            },
            |permit| {
                metrics::counter!("bulkhead_permits_acquired_total", "bulkhead" => self.name)
                    .increment(1);
                Ok(permit)
            },
        )
    }

    fn acquire_with_timeout(&self, timeout_ms: u64) -> Result<OwnedSemaphorePermit> {
        let timeout = Duration::from_millis(timeout_ms);
        let start = Instant::now();

        loop {
            if let Ok(permit) = Arc::clone(&self.semaphore).try_acquire_owned() {
                metrics::counter!("bulkhead_permits_acquired_total", "bulkhead" => self.name)
                    .increment(1);
                return Ok(permit);
            }

            if start.elapsed() >= timeout {
                metrics::counter!(
                    "bulkhead_rejections_total",
                    "bulkhead" => self.name,
                    "reason" => "timeout"
                )
                .increment(1);
                return Err(Error::ServerError {
                    operation: format!("{}_bulkhead_acquire", self.name),
                    cause: format!("bulkhead acquire timed out after {timeout_ms}ms"),
                });
            }

            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Runs `call` while holding a permit.
    ///
    /// # Errors
    ///
    /// Returns the acquisition error or the error from `call`.
    pub fn execute<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let _permit = self.acquire()?;

        tracing::trace!(bulkhead = self.name, operation, "Acquired bulkhead permit");

        let result = call();

        tracing::trace!(
            bulkhead = self.name,
            operation,
            success = result.is_ok(),
            "Released bulkhead permit"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = BulkheadConfig::new()
            .with_max_concurrent(3)
            .with_acquire_timeout_ms(10)
            .with_fail_fast(true);
        assert_eq!(config.max_concurrent, 3);
        assert_eq!(config.acquire_timeout_ms, 10);
        assert!(config.fail_fast);
    }

    #[test]
    fn test_permit_released_on_drop() {
        let bulkhead = Bulkhead::new(BulkheadConfig::new().with_max_concurrent(1), "test");
        let permit = bulkhead.acquire().unwrap();
        assert_eq!(bulkhead.available_permits(), 0);
        drop(permit);
        assert_eq!(bulkhead.available_permits(), 1);
    }

    #[test]
    fn test_fail_fast_when_full() {
        let bulkhead = Bulkhead::new(
            BulkheadConfig::new().with_max_concurrent(1).with_fail_fast(true),
            "test",
        );
        let _held = bulkhead.acquire().unwrap();
        let result = bulkhead.acquire();
        assert!(matches!(result, Err(Error::ServerError { .. })));
    }

    #[test]
    fn test_timeout_when_full() {
        let bulkhead = Bulkhead::new(
            BulkheadConfig::new()
                .with_max_concurrent(1)
                .with_acquire_timeout_ms(20),
            "test",
        );
        let _held = bulkhead.acquire().unwrap();
        let err = bulkhead.acquire().unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_execute_returns_value() {
        let bulkhead = Bulkhead::new(BulkheadConfig::default(), "test");
        let value = bulkhead.execute("op", || Ok(42)).unwrap();
        assert_eq!(value, 42);
        assert_eq!(bulkhead.available_permits(), 10);
    }

    #[test]
    fn test_zero_max_concurrent_still_allows_one() {
        let bulkhead = Bulkhead::new(BulkheadConfig::new().with_max_concurrent(0), "test");
        assert_eq!(bulkhead.available_permits(), 1);
    }
}
