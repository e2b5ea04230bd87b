//! Requests and the context a running service sees.

use crate::models::{CompletionStatus, Guid, NewActionTarget, SurveyReport};
use crate::storage::MetadataRepository;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A request to run the service registered for a request type.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    /// Engine action the run belongs to.
    pub engine_action_guid: Guid,
    /// Request type the engine resolves to a service.
    pub request_type: String,
    /// Parameters, applied over the registration defaults.
    pub request_parameters: BTreeMap<String, String>,
    /// Elements the service should work on.
    pub action_targets: Vec<NewActionTarget>,
    /// Asset to survey.
    pub asset_guid: Option<Guid>,
    /// Earliest time the service may start; `None` starts immediately.
    pub start_time: Option<DateTime<Utc>>,
}

impl ServiceRequest {
    /// Creates a request with a fresh engine action GUID.
    #[must_use]
    pub fn new(request_type: impl Into<String>) -> Self {
        Self {
            engine_action_guid: Guid::generate(),
            request_type: request_type.into(),
            request_parameters: BTreeMap::new(),
            action_targets: Vec::new(),
            asset_guid: None,
            start_time: None,
        }
    }

    /// Uses an existing engine action.
    #[must_use]
    pub fn with_engine_action(mut self, guid: Guid) -> Self {
        self.engine_action_guid = guid;
        self
    }

    /// Adds a request parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_parameters.insert(name.into(), value.into());
        self
    }

    /// Adds an action target.
    #[must_use]
    pub fn with_action_target(mut self, target: NewActionTarget) -> Self {
        self.action_targets.push(target);
        self
    }

    /// Sets the asset to survey.
    #[must_use]
    pub fn with_asset(mut self, guid: Guid) -> Self {
        self.asset_guid = Some(guid);
        self
    }

    /// Delays the start.
    #[must_use]
    pub const fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }
}

/// Shared flag used to ask a running service to stop.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome details a service sets explicitly.
///
/// Anything left unset is filled in by the runner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOverrides {
    /// Explicit status.
    pub status: Option<CompletionStatus>,
    /// Explicit guards.
    pub guards: Vec<String>,
    /// Explicit message.
    pub message: Option<String>,
    /// Parameters for follow-on requests.
    pub request_parameters: BTreeMap<String, String>,
    /// Targets for follow-on requests.
    pub action_targets: Vec<NewActionTarget>,
}

/// Everything a service can see and set during one run.
pub struct ServiceContext {
    engine_name: String,
    user_id: String,
    service_request_type: String,
    request: ServiceRequest,
    repository: Arc<dyn MetadataRepository>,
    cancellation: CancellationFlag,
    report: SurveyReport,
    completion: CompletionOverrides,
}

impl ServiceContext {
    /// Creates the context for one run.
    ///
    /// `service_request_type` is the request type as the service knows it;
    /// the report GUID is fixed here so that it can be referenced whatever
    /// the outcome.
    #[must_use]
    pub fn new(
        engine_name: impl Into<String>,
        user_id: impl Into<String>,
        service_name: &str,
        service_request_type: impl Into<String>,
        request: ServiceRequest,
        repository: Arc<dyn MetadataRepository>,
    ) -> Self {
        let user_id = user_id.into();
        let report = SurveyReport::new(service_name, &user_id, request.asset_guid.clone());
        Self {
            engine_name: engine_name.into(),
            user_id,
            service_request_type: service_request_type.into(),
            request,
            repository,
            cancellation: CancellationFlag::new(),
            report,
            completion: CompletionOverrides::default(),
        }
    }

    /// Engine running the service.
    #[must_use]
    pub fn engine_name(&self) -> &str {
        &self.engine_name
    }

    /// User the service runs as.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Engine action this run belongs to.
    #[must_use]
    pub const fn engine_action_guid(&self) -> &Guid {
        &self.request.engine_action_guid
    }

    /// Request type as the service knows it.
    #[must_use]
    pub fn request_type(&self) -> &str {
        &self.service_request_type
    }

    /// Merged request parameters.
    #[must_use]
    pub const fn request_parameters(&self) -> &BTreeMap<String, String> {
        &self.request.request_parameters
    }

    /// One request parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.request.request_parameters.get(name).map(String::as_str)
    }

    /// Elements the service should work on.
    #[must_use]
    pub fn action_targets(&self) -> &[NewActionTarget] {
        &self.request.action_targets
    }

    /// Asset to survey.
    #[must_use]
    pub const fn asset_guid(&self) -> Option<&Guid> {
        self.request.asset_guid.as_ref()
    }

    /// Requested start time.
    #[must_use]
    pub const fn start_time(&self) -> Option<DateTime<Utc>> {
        self.request.start_time
    }

    /// Metadata access.
    #[must_use]
    pub fn repository(&self) -> &dyn MetadataRepository {
        self.repository.as_ref()
    }

    /// Returns `true` once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// The cancellation flag shared with the engine.
    #[must_use]
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// The report for this run.
    #[must_use]
    pub const fn report(&self) -> &SurveyReport {
        &self.report
    }

    /// The report for this run, for adding annotations.
    pub const fn report_mut(&mut self) -> &mut SurveyReport {
        &mut self.report
    }

    /// Sets the outcome explicitly.
    pub fn record_completion_status(
        &mut self,
        status: CompletionStatus,
        guards: Vec<String>,
        message: Option<String>,
    ) {
        self.completion.status = Some(status);
        self.completion.guards = guards;
        self.completion.message = message;
    }

    /// Adds a parameter for follow-on requests.
    pub fn add_output_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.completion
            .request_parameters
            .insert(name.into(), value.into());
    }

    /// Adds a target for follow-on requests.
    pub fn add_output_target(&mut self, target: NewActionTarget) {
        self.completion.action_targets.push(target);
    }

    /// Outcome details set so far.
    #[must_use]
    pub const fn completion(&self) -> &CompletionOverrides {
        &self.completion
    }

    /// Splits the context into its report and outcome details.
    pub(crate) fn into_outcome(self) -> (SurveyReport, CompletionOverrides) {
        (self.report, self.completion)
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("engine_name", &self.engine_name)
            .field("user_id", &self.user_id)
            .field("service_request_type", &self.service_request_type)
            .field("request", &self.request)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
