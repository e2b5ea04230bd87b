//! Bounded pool of service runner permits.

use crate::bulkhead::Bulkhead;
use crate::config::ServicePoolConfig;
use crate::{Error, Result};
use tokio::sync::OwnedSemaphorePermit;

/// Caps the number of services running at once.
///
/// Each runner thread holds a permit for the whole of its run, so no more
/// than `max_concurrent` runner threads exist at any time.
#[derive(Debug, Clone)]
pub struct ServicePool {
    bulkhead: Bulkhead,
}

impl ServicePool {
    /// Creates a pool.
    #[must_use]
    pub fn new(config: ServicePoolConfig) -> Self {
        Self {
            bulkhead: Bulkhead::new(config, "service_pool"),
        }
    }

    /// Takes a permit for one run of `service`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceExecution`] when the pool is full (fail-fast)
    /// or no permit frees up in time.
    pub fn acquire(&self, service: &str) -> Result<OwnedSemaphorePermit> {
        self.bulkhead.acquire().map_err(|e| Error::ServiceExecution {
            service: service.to_string(),
            cause: e.to_string(),
        })
    }

    /// Free permits.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.bulkhead.available_permits()
    }

    /// Configured maximum.
    #[must_use]
    pub const fn max_concurrent(&self) -> usize {
        self.bulkhead.config().max_concurrent
    }
}
