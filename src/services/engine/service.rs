//! Service contract and provider registry.

use super::context::ServiceContext;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error as ThisError;

/// The contract a service implements, checked against the engine's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Surveys an asset and produces a report with annotations.
    Survey,
    /// Performs a governance action on its targets.
    GovernanceAction,
}

impl ServiceKind {
    /// Returns the kind as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Survey => "survey",
            Self::GovernanceAction => "governance-action",
        }
    }

    /// The kind of service an engine of `engine_type` runs.
    ///
    /// Survey engines run surveys; every other engine runs governance
    /// actions.
    #[must_use]
    pub fn for_engine_type(engine_type: &str) -> Self {
        if crate::models::type_registry().is_type_of(engine_type, "SurveyActionEngine") {
            Self::Survey
        } else {
            Self::GovernanceAction
        }
    }

    /// Guard produced when a run completes normally.
    #[must_use]
    pub const fn completed_guard(&self) -> &'static str {
        match self {
            Self::Survey => "survey-completed",
            Self::GovernanceAction => "governance-action-completed",
        }
    }

    /// Guard produced when a run fails.
    #[must_use]
    pub const fn failed_guard(&self) -> &'static str {
        match self {
            Self::Survey => "survey-failed",
            Self::GovernanceAction => "governance-action-failed",
        }
    }

    /// Guard produced when a run is cancelled.
    #[must_use]
    pub const fn cancelled_guard(&self) -> &'static str {
        match self {
            Self::Survey => "survey-cancelled",
            Self::GovernanceAction => "governance-action-cancelled",
        }
    }

    /// Guard produced when the request is invalid for the service.
    #[must_use]
    pub const fn invalid_guard(&self) -> &'static str {
        match self {
            Self::Survey => "survey-invalid",
            Self::GovernanceAction => "governance-action-invalid",
        }
    }
}

/// Errors a running service reports.
///
/// [`ServiceError::kind`] names the variant and is embedded in failure
/// messages so that the recorded outcome identifies the kind of failure.
#[derive(Debug, ThisError)]
pub enum ServiceError {
    /// The request cannot be served (missing asset, bad parameter).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The asset to work on does not exist.
    #[error("asset {0} not found")]
    AssetNotFound(String),

    /// Reading or writing metadata failed.
    #[error("repository access failed: {0}")]
    Repository(#[from] crate::Error),

    /// The service observed a cancellation request and stopped.
    #[error("service was cancelled")]
    Cancelled,

    /// Any other failure.
    #[error("{0}")]
    Failed(String),
}

impl ServiceError {
    /// Name of the variant.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "InvalidRequest",
            Self::AssetNotFound(_) => "AssetNotFound",
            Self::Repository(_) => "Repository",
            Self::Cancelled => "Cancelled",
            Self::Failed(_) => "Failed",
        }
    }
}

/// Result type for service code.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// A survey or governance action service.
///
/// `start` runs the whole of the service's work on the runner's thread.
/// Cancellation is cooperative: services poll
/// [`ServiceContext::is_cancelled`] and return [`ServiceError::Cancelled`].
pub trait GovernanceService: Send {
    /// Name used in audit messages.
    fn service_name(&self) -> &str;

    /// The contract this service implements.
    fn kind(&self) -> ServiceKind;

    /// Does the work.
    ///
    /// # Errors
    ///
    /// Any error becomes a failed (or cancelled) completion record.
    fn start(&mut self, context: &mut ServiceContext) -> ServiceResult<()>;

    /// Releases resources. Called after completion has been recorded.
    ///
    /// # Errors
    ///
    /// Errors are logged and otherwise ignored.
    fn disconnect(&mut self) -> ServiceResult<()> {
        Ok(())
    }
}

/// Creates service instances.
pub trait ServiceProvider: Send + Sync {
    /// Name that `connectorProviderName` refers to.
    fn provider_name(&self) -> &str;

    /// Creates a fresh instance for one run.
    fn create(&self) -> Box<dyn GovernanceService>;
}

/// Providers known to an engine host, keyed by provider name.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn ServiceProvider>>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the services shipped with the crate.
    #[must_use]
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(super::census::PropertyCensusProvider));
        registry
    }

    /// Adds (or replaces) a provider.
    pub fn register(&self, provider: Arc<dyn ServiceProvider>) {
        let name = provider.provider_name().to_string();
        self.providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, provider);
    }

    /// Looks up a provider by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ServiceProvider>> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Registered provider names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ServiceKind::Survey, "survey-completed", "survey-failed"; "survey")]
    #[test_case(
        ServiceKind::GovernanceAction,
        "governance-action-completed",
        "governance-action-failed";
        "governance action"
    )]
    fn test_guards(kind: ServiceKind, completed: &str, failed: &str) {
        assert_eq!(kind.completed_guard(), completed);
        assert_eq!(kind.failed_guard(), failed);
    }

    #[test_case("SurveyActionEngine", ServiceKind::Survey; "survey engine")]
    #[test_case("GovernanceActionEngine", ServiceKind::GovernanceAction; "action engine")]
    #[test_case("GovernanceEngine", ServiceKind::GovernanceAction; "base engine")]
    fn test_kind_for_engine_type(engine_type: &str, expected: ServiceKind) {
        assert_eq!(ServiceKind::for_engine_type(engine_type), expected);
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(ServiceError::Cancelled.kind(), "Cancelled");
        assert_eq!(
            ServiceError::AssetNotFound("g1".to_string()).kind(),
            "AssetNotFound"
        );
        let err: ServiceError = crate::Error::server("get_entity", "down").into();
        assert_eq!(err.kind(), "Repository");
    }

    #[test]
    fn test_builtin_registry() {
        let registry = ProviderRegistry::with_builtin();
        assert_eq!(registry.names(), vec!["property-census".to_string()]);
        let service = registry.get("property-census").unwrap().create();
        assert_eq!(service.kind(), ServiceKind::Survey);
        assert!(registry.get("unknown").is_none());
    }
}
