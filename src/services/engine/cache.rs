//! Request type to service resolution for one engine.

use super::service::ServiceProvider;
use crate::models::Guid;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

/// A registered service ready to be instantiated.
#[derive(Clone)]
pub struct CachedService {
    /// GUID of the service definition.
    pub service_guid: Guid,
    /// Service name used in audit messages.
    pub service_name: String,
    /// Creates instances of the service.
    pub provider: Arc<dyn ServiceProvider>,
    /// Request type passed to the service.
    pub service_request_type: String,
    /// Default parameters from the registration.
    pub request_parameters: BTreeMap<String, String>,
}

impl std::fmt::Debug for CachedService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedService")
            .field("service_guid", &self.service_guid)
            .field("service_name", &self.service_name)
            .field("provider", &self.provider.provider_name())
            .field("service_request_type", &self.service_request_type)
            .field("request_parameters", &self.request_parameters)
            .finish()
    }
}

impl CachedService {
    /// Merges request parameters over the registration defaults.
    #[must_use]
    pub fn merge_parameters(
        &self,
        request_parameters: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut merged = self.request_parameters.clone();
        merged.extend(
            request_parameters
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        merged
    }
}

/// Services an engine can run, keyed by request type.
#[derive(Debug, Default)]
pub struct ServiceCache {
    services: RwLock<HashMap<String, Arc<CachedService>>>,
}

impl ServiceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the service for a request type.
    #[must_use]
    pub fn get(&self, request_type: &str) -> Option<Arc<CachedService>> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(request_type)
            .cloned()
    }

    /// Adds or replaces the service for a request type.
    pub fn insert(&self, request_type: impl Into<String>, service: CachedService) {
        self.services
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(request_type.into(), Arc::new(service));
    }

    /// Replaces the whole cache.
    pub fn replace_all(&self, services: HashMap<String, CachedService>) {
        let services = services
            .into_iter()
            .map(|(request_type, service)| (request_type, Arc::new(service)))
            .collect();
        *self
            .services
            .write()
            .unwrap_or_else(PoisonError::into_inner) = services;
    }

    /// Request types served, sorted.
    #[must_use]
    pub fn request_types(&self) -> Vec<String> {
        let mut request_types: Vec<String> = self
            .services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        request_types.sort();
        request_types
    }

    /// Number of request types served.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no request type is served.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::engine::census::PropertyCensusProvider;

    fn cached(defaults: &[(&str, &str)]) -> CachedService {
        CachedService {
            service_guid: Guid::generate(),
            service_name: "census".to_string(),
            provider: Arc::new(PropertyCensusProvider),
            service_request_type: "census".to_string(),
            request_parameters: defaults
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_request_parameters_override_defaults() {
        let service = cached(&[("depth", "1"), ("sample", "10")]);
        let request: BTreeMap<String, String> =
            [("depth".to_string(), "3".to_string())].into_iter().collect();
        let merged = service.merge_parameters(&request);
        assert_eq!(merged["depth"], "3");
        assert_eq!(merged["sample"], "10");
    }

    #[test]
    fn test_replace_all_drops_old_entries() {
        let cache = ServiceCache::new();
        cache.insert("old", cached(&[]));
        assert_eq!(cache.request_types(), vec!["old".to_string()]);

        let mut fresh = HashMap::new();
        fresh.insert("census".to_string(), cached(&[]));
        fresh.insert("audit".to_string(), cached(&[]));
        cache.replace_all(fresh);

        assert!(cache.get("old").is_none());
        assert_eq!(
            cache.request_types(),
            vec!["audit".to_string(), "census".to_string()]
        );
        assert_eq!(cache.len(), 2);
    }
}
