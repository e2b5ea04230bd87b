//! Engine handler: resolves request types and launches service runners.

use super::audit::AuditCode;
use super::cache::{CachedService, ServiceCache};
use super::context::{CancellationFlag, ServiceContext, ServiceRequest};
use super::pool::ServicePool;
use super::recorder::CompletionRecorder;
use super::runner::{RunHandle, RunProgress, RunnerState, ServiceRunner};
use super::service::{ProviderRegistry, ServiceKind};
use crate::config::EngineHostConfig;
use crate::models::Guid;
use crate::services::configuration::GovernanceConfigurationHandler;
use crate::{Error, Result, validate_name};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::instrument;

/// A run the handler started that has not finished yet.
#[derive(Debug, Clone)]
pub struct ActiveTask {
    /// Engine action of the run.
    pub engine_action_guid: Guid,
    /// Request type the run was started for.
    pub request_type: String,
    /// Service executing the request.
    pub service_name: String,
    progress: RunProgress,
    cancellation: CancellationFlag,
}

impl ActiveTask {
    /// Current state.
    #[must_use]
    pub fn state(&self) -> RunnerState {
        self.progress.state()
    }
}

/// Runs the services registered with one governance engine.
///
/// Registrations are read once at construction and again on
/// [`refresh_config`](Self::refresh_config). Each request runs on its own
/// runner thread, bounded by the service pool.
pub struct GovernanceEngineHandler {
    engine_name: String,
    engine_guid: Guid,
    kind: ServiceKind,
    host_user_id: String,
    poll_interval: Duration,
    configuration: Arc<GovernanceConfigurationHandler>,
    providers: Arc<ProviderRegistry>,
    recorder: Arc<dyn CompletionRecorder>,
    cache: ServiceCache,
    pool: ServicePool,
    active: Mutex<HashMap<Guid, ActiveTask>>,
}

impl std::fmt::Debug for GovernanceEngineHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernanceEngineHandler")
            .field("engine_name", &self.engine_name)
            .field("engine_guid", &self.engine_guid)
            .field("kind", &self.kind)
            .field("request_types", &self.cache.request_types())
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl GovernanceEngineHandler {
    /// Creates a handler for the engine named `engine_name` and loads its
    /// registrations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if no engine has that name, and
    /// configuration errors unchanged.
    pub fn new(
        config: &EngineHostConfig,
        engine_name: &str,
        configuration: Arc<GovernanceConfigurationHandler>,
        providers: Arc<ProviderRegistry>,
        recorder: Arc<dyn CompletionRecorder>,
    ) -> Result<Self> {
        const METHOD: &str = "GovernanceEngineHandler::new";

        let engine = configuration
            .get_governance_engine_by_name(&config.user_id, engine_name)?
            .ok_or_else(|| Error::invalid_parameter("governanceEngineName", METHOD))?;
        let engine_type = engine
            .properties
            .as_ref()
            .and_then(|p| p.type_name.clone())
            .unwrap_or_else(|| engine.element_header.element_type.type_name.clone());

        let handler = Self {
            engine_name: engine_name.to_string(),
            engine_guid: engine.element_header.guid,
            kind: ServiceKind::for_engine_type(&engine_type),
            host_user_id: config.user_id.clone(),
            poll_interval: Duration::from_millis(config.start_poll_interval_ms),
            configuration,
            providers,
            recorder,
            cache: ServiceCache::new(),
            pool: ServicePool::new(config.service_pool.clone()),
            active: Mutex::new(HashMap::new()),
        };
        handler.load_registrations()?;
        Ok(handler)
    }

    /// Name of the engine.
    #[must_use]
    pub fn engine_name(&self) -> &str {
        &self.engine_name
    }

    /// GUID of the engine definition.
    #[must_use]
    pub const fn engine_guid(&self) -> &Guid {
        &self.engine_guid
    }

    /// The kind of service this engine runs.
    #[must_use]
    pub const fn kind(&self) -> ServiceKind {
        self.kind
    }

    /// Request types the engine currently serves, sorted.
    #[must_use]
    pub fn registered_request_types(&self) -> Vec<String> {
        self.cache.request_types()
    }

    /// Free runner permits.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.pool.available_permits()
    }

    /// Reloads the engine's registrations.
    ///
    /// Returns the number of request types served afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] if denied, and configuration errors
    /// unchanged. The previous cache is kept on error.
    #[instrument(skip(self), fields(operation = "refresh_config", engine = %self.engine_name))]
    pub fn refresh_config(&self, user_id: &str) -> Result<usize> {
        self.configuration
            .verifier()
            .validate_user_operation(user_id, "refreshConfig")?;
        self.load_registrations()
    }

    /// Starts the service registered for `request.request_type`.
    ///
    /// Registration defaults are merged under the request parameters. The
    /// call returns once the runner thread has been spawned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a blank or unregistered
    /// request type, [`Error::Unauthorized`] if denied,
    /// [`Error::InvalidConnector`] if the service is of the wrong kind, and
    /// [`Error::ServiceExecution`] when the pool is full.
    #[instrument(
        skip(self, request),
        fields(operation = "run_service", engine = %self.engine_name, request_type = %request.request_type)
    )]
    pub fn run_service(&self, user_id: &str, request: ServiceRequest) -> Result<RunHandle> {
        const METHOD: &str = "runService";

        validate_name(&request.request_type, "requestType", METHOD)?;
        self.configuration
            .verifier()
            .validate_user_operation(user_id, METHOD)?;

        let cached = self
            .cache
            .get(&request.request_type)
            .ok_or_else(|| Error::invalid_parameter("requestType", METHOD))?;

        // Held before the service exists so a full pool never creates one.
        let permit = self.pool.acquire(&cached.service_name)?;

        let request_type = request.request_type.clone();
        let request = ServiceRequest {
            request_parameters: cached.merge_parameters(&request.request_parameters),
            ..request
        };
        let context = ServiceContext::new(
            &self.engine_name,
            &self.host_user_id,
            &cached.service_name,
            &cached.service_request_type,
            request,
            Arc::clone(self.configuration.repository()),
        );
        let runner = ServiceRunner::new(
            cached.provider.create(),
            self.kind,
            context,
            Arc::clone(&self.recorder),
        )?
        .with_poll_interval(self.poll_interval);

        let handle = runner.start(Some(permit))?;

        self.prune_finished();
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                handle.engine_action_guid().clone(),
                ActiveTask {
                    engine_action_guid: handle.engine_action_guid().clone(),
                    request_type,
                    service_name: cached.service_name.clone(),
                    progress: handle.progress(),
                    cancellation: handle.cancellation(),
                },
            );
        #[allow(clippy::cast_precision_loss)]
        let available_gauge = self.pool.available_permits() as f64;
        metrics::gauge!("service_pool_available_permits").set(available_gauge);
        tracing::info!(
            service = %cached.service_name,
            engine_action = %handle.engine_action_guid(),
            "Service runner started"
        );
        Ok(handle)
    }

    /// Asks the run for `engine_action_guid` to stop.
    ///
    /// Returns `false` when no such run is active. Cancellation is
    /// cooperative; the run ends when the service notices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a blank GUID and
    /// [`Error::Unauthorized`] if denied.
    pub fn cancel_service(&self, user_id: &str, engine_action_guid: &Guid) -> Result<bool> {
        const METHOD: &str = "cancelService";

        if engine_action_guid.is_blank() {
            return Err(Error::invalid_parameter("engineActionGUID", METHOD));
        }
        self.configuration
            .verifier()
            .validate_user_operation(user_id, METHOD)?;

        self.prune_finished();
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(task) = active.get(engine_action_guid) else {
            return Ok(false);
        };
        task.cancellation.cancel();
        tracing::info!(
            engine_action = %engine_action_guid,
            service = %task.service_name,
            "Cancellation requested"
        );
        Ok(true)
    }

    /// Runs that have not finished, ordered by engine action.
    #[must_use]
    pub fn active_tasks(&self) -> Vec<ActiveTask> {
        self.prune_finished();
        let mut tasks: Vec<ActiveTask> = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.engine_action_guid.cmp(&b.engine_action_guid));
        tasks
    }

    fn prune_finished(&self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, task| !task.state().is_terminal());
    }

    fn load_registrations(&self) -> Result<usize> {
        let registrations = self
            .configuration
            .get_registered_services(&self.host_user_id, &self.engine_guid)?;

        let mut services = HashMap::new();
        for registration in registrations {
            let Some(properties) = registration.properties else {
                continue;
            };
            let definition = registration.service_properties.unwrap_or_default();
            let Some(provider_name) = definition.connector_provider_name.as_deref() else {
                tracing::warn!(
                    service = %registration.service.guid,
                    request_type = %properties.request_type,
                    "Registered service has no connector provider"
                );
                continue;
            };
            let Some(provider) = self.providers.get(provider_name) else {
                tracing::warn!(
                    provider = provider_name,
                    request_type = %properties.request_type,
                    "Unknown connector provider, request type not served"
                );
                continue;
            };

            let service_request_type = properties
                .service_request_type
                .clone()
                .unwrap_or_else(|| properties.request_type.clone());
            services.insert(
                properties.request_type.clone(),
                CachedService {
                    service_guid: registration.service.guid,
                    service_name: definition
                        .qualified_name
                        .unwrap_or_else(|| provider_name.to_string()),
                    provider,
                    service_request_type,
                    request_parameters: properties.request_parameters,
                },
            );
        }

        let count = services.len();
        self.cache.replace_all(services);
        self.recorder.log_audit(&AuditCode::EngineRefreshed {
            engine: self.engine_name.clone(),
            request_types: count,
        });
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServicePoolConfig;
    use crate::models::{
        CompletionStatus, EntityDetail, GovernanceEngineProperties, GovernanceServiceProperties,
        InstanceProperties,
    };
    use crate::security::{AllowAllVerifier, Role, RoleBasedVerifier};
    use crate::services::engine::census::{PROPERTY_CENSUS, PropertyCensusProvider};
    use crate::services::engine::service::{GovernanceService, ServiceProvider};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::services::engine::recorder::MemoryCompletionRecorder;
    use crate::storage::{InMemoryRepository, MetadataRepository};
    use std::collections::BTreeMap;

    struct Fixture {
        configuration: Arc<GovernanceConfigurationHandler>,
        repository: Arc<InMemoryRepository>,
        recorder: Arc<MemoryCompletionRecorder>,
        engine: Guid,
        service: Guid,
    }

    fn fixture(verifier: Arc<dyn crate::security::AuthorizationVerifier>) -> Fixture {
        let repository = Arc::new(InMemoryRepository::new());
        let configuration = Arc::new(GovernanceConfigurationHandler::new(
            "server1",
            repository.clone(),
            verifier,
        ));
        let engine = configuration
            .create_governance_engine(
                "steward",
                "SurveyActionEngine",
                &GovernanceEngineProperties {
                    qualified_name: Some("engine1".to_string()),
                    ..GovernanceEngineProperties::default()
                },
            )
            .unwrap();
        let service = configuration
            .create_governance_service(
                "steward",
                "SurveyActionService",
                &GovernanceServiceProperties {
                    qualified_name: Some("census-service".to_string()),
                    connector_provider_name: Some(PROPERTY_CENSUS.to_string()),
                    ..GovernanceServiceProperties::default()
                },
            )
            .unwrap();
        configuration
            .register_service_with_engine(
                "steward",
                &engine,
                &service,
                "census",
                None,
                &BTreeMap::from([("includeRelationships".to_string(), "false".to_string())]),
            )
            .unwrap();
        Fixture {
            configuration,
            repository,
            recorder: Arc::new(MemoryCompletionRecorder::new()),
            engine,
            service,
        }
    }

    fn handler(fixture: &Fixture, max_concurrent: usize) -> GovernanceEngineHandler {
        let config = EngineHostConfig::new()
            .with_service_pool(
                ServicePoolConfig::new()
                    .with_max_concurrent(max_concurrent)
                    .with_fail_fast(true),
            )
            .with_start_poll_interval_ms(5);
        GovernanceEngineHandler::new(
            &config,
            "engine1",
            fixture.configuration.clone(),
            Arc::new(ProviderRegistry::with_builtin()),
            fixture.recorder.clone(),
        )
        .unwrap()
    }

    fn asset(repository: &InMemoryRepository) -> Guid {
        let asset = EntityDetail::new(
            "Asset",
            InstanceProperties::new().with_string("qualifiedName", "asset-1"),
        );
        repository.store_entity("test", &asset).unwrap();
        asset.guid
    }

    #[test]
    fn test_loads_registrations() {
        let fixture = fixture(Arc::new(AllowAllVerifier));
        let handler = handler(&fixture, 2);
        assert_eq!(handler.engine_guid(), &fixture.engine);
        assert_eq!(handler.kind(), ServiceKind::Survey);
        assert_eq!(handler.registered_request_types(), vec!["census".to_string()]);
        assert!(fixture.recorder.audit_ids().contains(&"METAGOV-ENGINE-0007"));
    }

    #[test]
    fn test_unknown_engine() {
        let fixture = fixture(Arc::new(AllowAllVerifier));
        let result = GovernanceEngineHandler::new(
            &EngineHostConfig::new(),
            "missing",
            fixture.configuration.clone(),
            Arc::new(ProviderRegistry::with_builtin()),
            fixture.recorder.clone(),
        );
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));
    }

    #[test]
    fn test_unknown_provider_is_skipped() {
        let fixture = fixture(Arc::new(AllowAllVerifier));
        let result = GovernanceEngineHandler::new(
            &EngineHostConfig::new(),
            "engine1",
            fixture.configuration.clone(),
            Arc::new(ProviderRegistry::new()),
            fixture.recorder.clone(),
        )
        .unwrap();
        assert!(result.registered_request_types().is_empty());
    }

    #[test]
    fn test_run_service_merges_defaults() {
        let fixture = fixture(Arc::new(AllowAllVerifier));
        let handler = handler(&fixture, 2);
        let asset = asset(&fixture.repository);

        let handle = handler
            .run_service(
                "enginehost",
                ServiceRequest::new("census")
                    .with_asset(asset)
                    .with_parameter("extra", "1"),
            )
            .unwrap();
        let record = handle.join().unwrap();

        assert_eq!(record.status, CompletionStatus::Actioned);
        assert_eq!(record.request_parameters["propertyCount"], "1");
        let report = &fixture.recorder.reports()[0];
        assert_eq!(report.annotations.len(), 1);
        assert!(
            report.annotations[0]
                .json_properties
                .get("relationshipsByType")
                .is_none()
        );
        assert!(handler.active_tasks().is_empty());
        assert_eq!(handler.available_permits(), 2);
    }

    #[test]
    fn test_unregistered_request_type() {
        let fixture = fixture(Arc::new(AllowAllVerifier));
        let handler = handler(&fixture, 2);
        let err = handler
            .run_service("enginehost", ServiceRequest::new("profile"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref parameter, .. } if parameter == "requestType"));
    }

    #[test]
    fn test_cancel_and_pool_limit() {
        let fixture = fixture(Arc::new(AllowAllVerifier));
        let handler = handler(&fixture, 1);
        let later = chrono::Utc::now() + chrono::Duration::hours(1);

        let handle = handler
            .run_service(
                "enginehost",
                ServiceRequest::new("census").with_start_time(later),
            )
            .unwrap();
        let guid = handle.engine_action_guid().clone();
        assert_eq!(handler.active_tasks().len(), 1);

        let full = handler.run_service("enginehost", ServiceRequest::new("census"));
        assert!(matches!(full, Err(Error::ServiceExecution { .. })));

        assert!(handler.cancel_service("enginehost", &guid).unwrap());
        let record = handle.join().unwrap();
        assert_eq!(record.status, CompletionStatus::Cancelled);
        assert!(handler.active_tasks().is_empty());
        assert!(!handler.cancel_service("enginehost", &guid).unwrap());
    }

    struct CountingProvider {
        created: AtomicUsize,
    }

    impl ServiceProvider for CountingProvider {
        fn provider_name(&self) -> &str {
            PROPERTY_CENSUS
        }

        fn create(&self) -> Box<dyn GovernanceService> {
            self.created.fetch_add(1, Ordering::SeqCst);
            PropertyCensusProvider.create()
        }
    }

    #[test]
    fn test_full_pool_creates_no_service() {
        let fixture = fixture(Arc::new(AllowAllVerifier));
        let provider = Arc::new(CountingProvider {
            created: AtomicUsize::new(0),
        });
        let providers = ProviderRegistry::new();
        providers.register(provider.clone());
        let config = EngineHostConfig::new()
            .with_service_pool(
                ServicePoolConfig::new()
                    .with_max_concurrent(1)
                    .with_fail_fast(true),
            )
            .with_start_poll_interval_ms(5);
        let handler = GovernanceEngineHandler::new(
            &config,
            "engine1",
            fixture.configuration.clone(),
            Arc::new(providers),
            fixture.recorder.clone(),
        )
        .unwrap();

        let later = chrono::Utc::now() + chrono::Duration::hours(1);
        let handle = handler
            .run_service(
                "enginehost",
                ServiceRequest::new("census").with_start_time(later),
            )
            .unwrap();
        let full = handler.run_service("enginehost", ServiceRequest::new("census"));
        assert!(matches!(full, Err(Error::ServiceExecution { .. })));
        assert_eq!(provider.created.load(Ordering::SeqCst), 1);

        handle.cancel();
        assert_eq!(handle.join().unwrap().status, CompletionStatus::Cancelled);
    }

    #[test]
    fn test_refresh_picks_up_new_registration() {
        let fixture = fixture(Arc::new(AllowAllVerifier));
        let handler = handler(&fixture, 2);
        fixture
            .configuration
            .register_service_with_engine(
                "steward",
                &fixture.engine,
                &fixture.service,
                "census-deep",
                Some("census"),
                &BTreeMap::from([("includeRelationships".to_string(), "true".to_string())]),
            )
            .unwrap();
        assert_eq!(handler.refresh_config("enginehost").unwrap(), 2);
        assert_eq!(
            handler.registered_request_types(),
            vec!["census".to_string(), "census-deep".to_string()]
        );
    }

    #[test]
    fn test_read_only_user_cannot_run() {
        let verifier = Arc::new(
            RoleBasedVerifier::new()
                .with_user("steward", Role::Steward)
                .with_user("enginehost", Role::EngineHost)
                .with_user("viewer", Role::ReadOnly),
        );
        let fixture = fixture(verifier);
        let handler = handler(&fixture, 2);
        assert!(matches!(
            handler.run_service("viewer", ServiceRequest::new("census")),
            Err(Error::Unauthorized { .. })
        ));
        assert!(matches!(
            handler.cancel_service("viewer", &Guid::new("a1")),
            Err(Error::Unauthorized { .. })
        ));
        assert!(handler.refresh_config("viewer").is_ok());
    }
}
