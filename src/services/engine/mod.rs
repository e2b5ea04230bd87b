//! Governance service execution.
//!
//! A [`GovernanceEngineHandler`] serves the request types registered with
//! one engine. For each request it creates a service from the registered
//! [`ServiceProvider`], wraps it in a [`ServiceRunner`] with a fresh
//! [`ServiceContext`], and starts the runner on its own thread once the
//! [`ServicePool`] grants a permit.
//!
//! ```text
//! run_service(request)
//!   -> ServiceCache (request type -> provider, defaults)
//!   -> ServicePool permit
//!   -> ServiceRunner thread: wait for start time -> start -> record -> disconnect
//!   -> CompletionRecorder
//! ```

mod audit;
mod cache;
mod census;
mod context;
mod handler;
mod pool;
mod recorder;
mod runner;
mod service;

pub use audit::{AuditCode, AuditSeverity};
pub use cache::{CachedService, ServiceCache};
pub use census::{
    INCLUDE_RELATIONSHIPS, PROPERTY_CENSUS, PROPERTY_COUNT, PropertyCensusProvider,
    PropertyCensusSurvey,
};
pub use context::{CancellationFlag, CompletionOverrides, ServiceContext, ServiceRequest};
pub use handler::{ActiveTask, GovernanceEngineHandler};
pub use pool::ServicePool;
pub use recorder::{CompletionRecorder, MemoryCompletionRecorder, RepositoryCompletionRecorder};
pub use runner::{REPORT_TARGET_NAME, RunHandle, RunProgress, RunnerState, ServiceRunner};
pub use service::{
    GovernanceService, ProviderRegistry, ServiceError, ServiceKind, ServiceProvider,
    ServiceResult,
};
