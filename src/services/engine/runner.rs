//! Runs one service on a dedicated thread and records the outcome.
//!
//! # States
//!
//! ```text
//! Pending -> Waiting -> Running -> Completed | Failed | Cancelled
//!               \_______________________________________/
//!                      (cancelled before the start time)
//! ```
//!
//! # Outcome rules
//!
//! | Service result | Status | Guard | Message |
//! |----------------|--------|-------|---------|
//! | `Ok`, nothing set | `Actioned` | `<kind>-completed` | default summary |
//! | `Ok`, status set | as set | as set, else derived from status | as set, else default |
//! | `Err(Cancelled)` | `Cancelled` | `<kind>-cancelled` | cancellation summary |
//! | other `Err` or panic | `Failed` | `<kind>-failed` | names the error kind |
//!
//! Every record carries a `surveyReport` action target pointing at the
//! report created with the context. Recording happens before disconnect;
//! failures of either are logged and never replace the outcome.

use super::audit::AuditCode;
use super::context::{CancellationFlag, CompletionOverrides, ServiceContext};
use super::recorder::CompletionRecorder;
use super::service::{GovernanceService, ServiceError, ServiceKind};
use crate::models::{CompletionRecord, CompletionStatus, Guid, NewActionTarget};
use crate::{Error, Result};
use chrono::Utc;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::OwnedSemaphorePermit;

/// Name of the action target that references the run's report.
pub const REPORT_TARGET_NAME: &str = "surveyReport";

/// Default interval between checks while waiting for the start time.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lifecycle of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunnerState {
    /// Constructed, not started.
    Pending,
    /// Waiting for the start time.
    Waiting,
    /// The service is executing.
    Running,
    /// Finished with a non-failure status.
    Completed,
    /// The service failed.
    Failed,
    /// Cancelled before or during the run.
    Cancelled,
}

impl RunnerState {
    /// Returns the state as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Waiting => "waiting",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` once the run is over.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    const fn for_status(status: CompletionStatus) -> Self {
        match status {
            CompletionStatus::Failed => Self::Failed,
            CompletionStatus::Cancelled => Self::Cancelled,
            CompletionStatus::Actioned | CompletionStatus::Invalid | CompletionStatus::Ignored => {
                Self::Completed
            },
        }
    }
}

#[derive(Debug)]
struct Progress {
    state: RunnerState,
    record: Option<CompletionRecord>,
}

#[derive(Debug)]
struct SharedProgress {
    progress: Mutex<Progress>,
    finished: Condvar,
}

/// Read-only view of a run's progress, shareable across threads.
#[derive(Debug, Clone)]
pub struct RunProgress(Arc<SharedProgress>);

impl RunProgress {
    fn new() -> Self {
        Self(Arc::new(SharedProgress {
            progress: Mutex::new(Progress {
                state: RunnerState::Pending,
                record: None,
            }),
            finished: Condvar::new(),
        }))
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RunnerState {
        self.0
            .progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    /// The completion record, once the run is over.
    #[must_use]
    pub fn record(&self) -> Option<CompletionRecord> {
        self.0
            .progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record
            .clone()
    }

    /// Waits up to `timeout` for the run to finish.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> Option<CompletionRecord> {
        let guard = self
            .0
            .progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = self
            .0
            .finished
            .wait_timeout_while(guard, timeout, |p| p.record.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        guard.record.clone()
    }

    fn set_state(&self, state: RunnerState) {
        self.0
            .progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state = state;
    }

    fn finish(&self, record: CompletionRecord) {
        let mut progress = self
            .0
            .progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        progress.state = RunnerState::for_status(record.status);
        progress.record = Some(record);
        self.0.finished.notify_all();
    }
}

/// Handle to a runner started on its own thread.
#[derive(Debug)]
pub struct RunHandle {
    engine_action_guid: Guid,
    service_name: String,
    progress: RunProgress,
    cancellation: CancellationFlag,
    thread: JoinHandle<CompletionRecord>,
}

impl RunHandle {
    /// Engine action the run belongs to.
    #[must_use]
    pub const fn engine_action_guid(&self) -> &Guid {
        &self.engine_action_guid
    }

    /// Name of the running service.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RunnerState {
        self.progress.state()
    }

    /// Returns `true` once the run is over.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Progress view that outlives the handle.
    #[must_use]
    pub fn progress(&self) -> RunProgress {
        self.progress.clone()
    }

    /// The cancellation flag of the run.
    #[must_use]
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// Asks the service to stop. Cooperative only.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Waits for the run to finish and returns its record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceExecution`] if the runner thread itself
    /// panicked outside the service.
    pub fn join(self) -> Result<CompletionRecord> {
        let service = self.service_name;
        self.thread.join().map_err(|payload| Error::ServiceExecution {
            service,
            cause: panic_message(payload.as_ref()),
        })
    }
}

/// Runs one service for one request.
pub struct ServiceRunner {
    service: Box<dyn GovernanceService>,
    kind: ServiceKind,
    service_name: String,
    context: ServiceContext,
    recorder: Arc<dyn CompletionRecorder>,
    poll_interval: Duration,
    progress: RunProgress,
}

impl std::fmt::Debug for ServiceRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRunner")
            .field("service_name", &self.service_name)
            .field("kind", &self.kind)
            .field("context", &self.context)
            .field("state", &self.progress.state())
            .finish_non_exhaustive()
    }
}

impl ServiceRunner {
    /// Creates a runner.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConnector`] if the service does not
    /// implement the `expected` contract.
    pub fn new(
        service: Box<dyn GovernanceService>,
        expected: ServiceKind,
        context: ServiceContext,
        recorder: Arc<dyn CompletionRecorder>,
    ) -> Result<Self> {
        let service_name = service.service_name().to_string();
        let actual = service.kind();
        if actual != expected {
            return Err(Error::InvalidConnector {
                service: service_name,
                expected: expected.as_str().to_string(),
                actual: actual.as_str().to_string(),
            });
        }

        Ok(Self {
            service,
            kind: expected,
            service_name,
            context,
            recorder,
            poll_interval: DEFAULT_POLL_INTERVAL,
            progress: RunProgress::new(),
        })
    }

    /// Sets how often the start time and cancellation are checked.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RunnerState {
        self.progress.state()
    }

    /// Progress view that outlives the runner.
    #[must_use]
    pub fn progress(&self) -> RunProgress {
        self.progress.clone()
    }

    /// The cancellation flag of the run.
    #[must_use]
    pub fn cancellation(&self) -> CancellationFlag {
        self.context.cancellation()
    }

    /// Starts the run on a new named thread and returns immediately.
    ///
    /// `permit` is held by the thread until the run is over.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceExecution`] if the thread cannot be spawned.
    pub fn start(self, permit: Option<OwnedSemaphorePermit>) -> Result<RunHandle> {
        let engine_action_guid = self.context.engine_action_guid().clone();
        let service_name = self.service_name.clone();
        let progress = self.progress.clone();
        let cancellation = self.context.cancellation();

        let thread = std::thread::Builder::new()
            .name(format!("metagov-{service_name}"))
            .spawn(move || {
                let _permit = permit;
                self.run()
            })
            .map_err(|e| Error::ServiceExecution {
                service: service_name.clone(),
                cause: e.to_string(),
            })?;

        Ok(RunHandle {
            engine_action_guid,
            service_name,
            progress,
            cancellation,
            thread,
        })
    }

    /// Runs the service on the calling thread and returns its record.
    ///
    /// Blocks until the start time, then until the service returns.
    pub fn run(mut self) -> CompletionRecord {
        let engine_action = self.context.engine_action_guid().clone();
        let span = tracing::info_span!(
            "service_run",
            service = %self.service_name,
            engine_action = %engine_action
        );
        let _enter = span.enter();

        self.progress.set_state(RunnerState::Waiting);
        let outcome = if self.wait_for_start() {
            self.execute(&engine_action)
        } else {
            Outcome::CancelledBeforeStart
        };

        let Self {
            mut service,
            kind,
            service_name,
            context,
            recorder,
            progress,
            ..
        } = self;

        let user_id = context.user_id().to_string();
        let request_type = context.request_type().to_string();
        let (mut report, overrides) = context.into_outcome();
        report.completion_time = Some(Utc::now());

        let resolution = resolve(
            kind,
            &service_name,
            &request_type,
            &engine_action,
            report.annotations.len(),
            outcome,
            &overrides,
        );
        let CompletionOverrides {
            request_parameters,
            mut action_targets,
            ..
        } = overrides;
        action_targets.push(NewActionTarget::new(REPORT_TARGET_NAME, report.guid.clone()));

        let record = CompletionRecord {
            engine_action_guid: engine_action.clone(),
            status: resolution.status,
            guards: resolution.guards,
            message: resolution.message,
            request_parameters,
            action_targets,
            completion_time: Utc::now(),
        };

        recorder.log_audit(&resolution.audit);
        metrics::counter!(
            "service_runs_completed_total",
            "kind" => kind.as_str(),
            "status" => record.status.as_str()
        )
        .increment(1);

        if let Err(e) = recorder.record_completion(&user_id, &record, &report) {
            recorder.log_audit(&AuditCode::RecordingFailed {
                engine_action: engine_action.clone(),
                cause: e.to_string(),
            });
        }

        let disconnected = panic::catch_unwind(AssertUnwindSafe(|| service.disconnect()));
        let disconnect_failure = match disconnected {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(payload) => Some(panic_message(payload.as_ref())),
        };
        if let Some(cause) = disconnect_failure {
            recorder.log_audit(&AuditCode::DisconnectFailed {
                service: service_name,
                cause,
            });
        }

        progress.finish(record.clone());
        record
    }

    /// Blocks until the start time. Returns `false` if cancelled first.
    fn wait_for_start(&self) -> bool {
        let Some(start_time) = self.context.start_time() else {
            return !self.context.is_cancelled();
        };

        loop {
            if self.context.is_cancelled() {
                return false;
            }
            let now = Utc::now();
            if start_time <= now {
                return true;
            }
            let remaining = (start_time - now).to_std().unwrap_or_default();
            std::thread::sleep(remaining.min(self.poll_interval));
        }
    }

    fn execute(&mut self, engine_action: &Guid) -> Outcome {
        self.progress.set_state(RunnerState::Running);
        self.context.report_mut().start_time = Some(Utc::now());
        self.recorder.log_audit(&AuditCode::ServiceStarting {
            service: self.service_name.clone(),
            request_type: self.context.request_type().to_string(),
            engine_action: engine_action.clone(),
        });
        metrics::counter!("service_runs_started_total", "kind" => self.kind.as_str()).increment(1);

        let service = &mut self.service;
        let context = &mut self.context;
        match panic::catch_unwind(AssertUnwindSafe(|| service.start(context))) {
            Ok(Ok(())) => Outcome::Returned,
            Ok(Err(ServiceError::Cancelled)) => Outcome::Cancelled,
            Ok(Err(e)) => Outcome::Errored {
                kind: e.kind(),
                message: e.to_string(),
            },
            Err(payload) => Outcome::Errored {
                kind: "Panic",
                message: panic_message(payload.as_ref()),
            },
        }
    }
}

enum Outcome {
    Returned,
    Cancelled,
    CancelledBeforeStart,
    Errored { kind: &'static str, message: String },
}

struct Resolution {
    status: CompletionStatus,
    guards: Vec<String>,
    message: String,
    audit: AuditCode,
}

const fn guard_for(kind: ServiceKind, status: CompletionStatus) -> &'static str {
    match status {
        CompletionStatus::Actioned | CompletionStatus::Ignored => kind.completed_guard(),
        CompletionStatus::Invalid => kind.invalid_guard(),
        CompletionStatus::Failed => kind.failed_guard(),
        CompletionStatus::Cancelled => kind.cancelled_guard(),
    }
}

fn resolve(
    kind: ServiceKind,
    service_name: &str,
    request_type: &str,
    engine_action: &Guid,
    annotation_count: usize,
    outcome: Outcome,
    overrides: &CompletionOverrides,
) -> Resolution {
    match outcome {
        Outcome::Returned => {
            let status = overrides.status.unwrap_or_default();
            let guards = if overrides.guards.is_empty() {
                vec![guard_for(kind, status).to_string()]
            } else {
                overrides.guards.clone()
            };
            let message = overrides.message.clone().unwrap_or_else(|| {
                format!(
                    "Service {service_name} completed request type {request_type} for engine action {engine_action} with status {status} and {annotation_count} annotations"
                )
            });
            Resolution {
                status,
                guards,
                message,
                audit: AuditCode::ServiceCompleted {
                    service: service_name.to_string(),
                    engine_action: engine_action.clone(),
                    status: status.to_string(),
                },
            }
        },
        Outcome::Cancelled | Outcome::CancelledBeforeStart => {
            let stage = if matches!(outcome, Outcome::CancelledBeforeStart) {
                "before it started"
            } else {
                "while running"
            };
            Resolution {
                status: CompletionStatus::Cancelled,
                guards: vec![kind.cancelled_guard().to_string()],
                message: format!(
                    "Service {service_name} was cancelled {stage} for engine action {engine_action}"
                ),
                audit: AuditCode::ServiceCancelled {
                    service: service_name.to_string(),
                    engine_action: engine_action.clone(),
                },
            }
        },
        Outcome::Errored {
            kind: error_kind,
            message,
        } => Resolution {
            status: CompletionStatus::Failed,
            guards: vec![kind.failed_guard().to_string()],
            message: format!(
                "Service {service_name} failed request type {request_type} with {error_kind}: {message}"
            ),
            audit: AuditCode::ServiceFailed {
                service: service_name.to_string(),
                engine_action: engine_action.clone(),
                kind: error_kind.to_string(),
                message,
            },
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
