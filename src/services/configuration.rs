//! Governance engine and service configuration.
//!
//! Engines, services and the `SupportedGovernanceService` registrations
//! between them are stored in the metadata repository. The handler keeps
//! the invariant that an engine has at most one service per request type.
//!
//! # Registration
//!
//! | Existing registration for the request type | Outcome |
//! |--------------------------------------------|---------|
//! | None | New relationship created |
//! | Same service | Parameters updated in place (version checked) |
//! | Different service | Stale relationship deleted, new one created |
//!
//! Registrations are serialised per handler and every update or delete
//! carries the version read beforehand, so a concurrent writer that slips
//! past the handler surfaces as a version conflict rather than a duplicate.

use crate::models::property_names::{
    ADDITIONAL_PROPERTIES, CONNECTOR_PROVIDER_NAME, DESCRIPTION, DISPLAY_NAME, QUALIFIED_NAME,
    REQUEST_PARAMETERS, REQUEST_TYPE, SERVICE_REQUEST_TYPE, VERSION_IDENTIFIER,
};
use crate::models::{
    Bean, BeanShape, EntityDetail, GovernanceEngineElement, GovernanceEngineProperties,
    GovernanceServiceProperties, Guid, InstanceProperties, RegisteredGovernanceServiceElement,
    Relationship, type_registry,
};
use crate::security::AuthorizationVerifier;
use crate::services::converters::{
    BeanConverter, ConversionSource, GovernanceEngineConverter,
    RegisteredGovernanceServiceConverter, convert,
};
use crate::storage::{EntityQuery, MetadataRepository};
use crate::{Error, Result, validate_name};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::instrument;

const GOVERNANCE_ENGINE: &str = "GovernanceEngine";
const GOVERNANCE_SERVICE: &str = "GovernanceService";
const SUPPORTED_GOVERNANCE_SERVICE: &str = "SupportedGovernanceService";
const SERVICE_NAME: &str = "governance-configuration";

/// What a registration call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// A new registration was created.
    Created,
    /// The existing registration to the same service was updated.
    Updated,
    /// A registration to another service was replaced.
    Replaced,
}

impl RegistrationOutcome {
    /// Returns the outcome as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Replaced => "replaced",
        }
    }
}

/// Result of [`GovernanceConfigurationHandler::register_service_with_engine`].
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    /// The registration relationship as stored.
    pub relationship: Relationship,
    /// What happened.
    pub outcome: RegistrationOutcome,
}

/// Maintains governance engine definitions and their service registrations.
pub struct GovernanceConfigurationHandler {
    server_name: String,
    repository: Arc<dyn MetadataRepository>,
    verifier: Arc<dyn AuthorizationVerifier>,
    /// Serialises the read-modify-write of registrations.
    registration_lock: Mutex<()>,
}

impl GovernanceConfigurationHandler {
    /// Creates a handler over a repository.
    #[must_use]
    pub fn new(
        server_name: impl Into<String>,
        repository: Arc<dyn MetadataRepository>,
        verifier: Arc<dyn AuthorizationVerifier>,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            repository,
            verifier,
            registration_lock: Mutex::new(()),
        }
    }

    /// The repository this handler writes to.
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn MetadataRepository> {
        &self.repository
    }

    /// The verifier consulted before every operation.
    #[must_use]
    pub fn verifier(&self) -> &Arc<dyn AuthorizationVerifier> {
        &self.verifier
    }

    /// Creates a governance engine definition.
    ///
    /// `engine_type` must be `GovernanceEngine` or one of its subtypes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a blank or duplicate qualified
    /// name or an unknown engine type, [`Error::Unauthorized`] if the
    /// verifier denies the call, and repository errors unchanged.
    #[instrument(skip(self, properties), fields(operation = "create_governance_engine"))]
    pub fn create_governance_engine(
        &self,
        user_id: &str,
        engine_type: &str,
        properties: &GovernanceEngineProperties,
    ) -> Result<Guid> {
        const METHOD: &str = "createGovernanceEngine";

        let qualified_name = properties.qualified_name.as_deref().unwrap_or_default();
        self.validate_definition(engine_type, GOVERNANCE_ENGINE, qualified_name, METHOD)?;
        self.verifier.validate_user_operation(user_id, METHOD)?;

        let mut bag = definition_properties(
            qualified_name,
            properties.display_name.as_deref(),
            properties.description.as_deref(),
            properties.version_identifier.as_deref(),
        );
        if !properties.additional_properties.is_empty() {
            bag = bag.with_string_map(ADDITIONAL_PROPERTIES, &properties.additional_properties);
        }

        let entity = EntityDetail::new(engine_type, bag).created_by(user_id);
        self.repository.store_entity(user_id, &entity)?;

        tracing::info!(engine = %entity.guid, qualified_name, engine_type, "Created governance engine");
        Ok(entity.guid)
    }

    /// Creates a governance service definition.
    ///
    /// `service_type` must be `GovernanceService` or one of its subtypes.
    ///
    /// # Errors
    ///
    /// As [`Self::create_governance_engine`]; the connector provider name is
    /// also required.
    #[instrument(skip(self, properties), fields(operation = "create_governance_service"))]
    pub fn create_governance_service(
        &self,
        user_id: &str,
        service_type: &str,
        properties: &GovernanceServiceProperties,
    ) -> Result<Guid> {
        const METHOD: &str = "createGovernanceService";

        let qualified_name = properties.qualified_name.as_deref().unwrap_or_default();
        let provider = properties
            .connector_provider_name
            .as_deref()
            .unwrap_or_default();
        self.validate_definition(service_type, GOVERNANCE_SERVICE, qualified_name, METHOD)?;
        validate_name(provider, "connectorProviderName", METHOD)?;
        self.verifier.validate_user_operation(user_id, METHOD)?;

        let mut bag = definition_properties(
            qualified_name,
            properties.display_name.as_deref(),
            properties.description.as_deref(),
            properties.version_identifier.as_deref(),
        )
        .with_string(CONNECTOR_PROVIDER_NAME, provider);
        if !properties.additional_properties.is_empty() {
            bag = bag.with_string_map(ADDITIONAL_PROPERTIES, &properties.additional_properties);
        }

        let entity = EntityDetail::new(service_type, bag).created_by(user_id);
        self.repository.store_entity(user_id, &entity)?;

        tracing::info!(service = %entity.guid, qualified_name, provider, "Created governance service");
        Ok(entity.guid)
    }

    /// Looks up an engine by qualified name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a blank name,
    /// [`Error::Unauthorized`] if denied, and repository errors unchanged.
    pub fn get_governance_engine_by_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Option<GovernanceEngineElement>> {
        const METHOD: &str = "getGovernanceEngineByName";

        validate_name(name, "name", METHOD)?;
        self.verifier.validate_user_operation(user_id, METHOD)?;

        let Some(entity) = self.find_engine(name)? else {
            return Ok(None);
        };

        let converter = GovernanceEngineConverter::new(&self.server_name, SERVICE_NAME);
        match convert(
            &converter,
            BeanShape::GovernanceEngine,
            &ConversionSource::entity(&entity),
            METHOD,
        )? {
            Bean::GovernanceEngine(element) => Ok(Some(element)),
            other => Err(Error::InvalidBeanClass {
                shape: other.shape().to_string(),
                converter: converter.converter_name().to_string(),
                method: METHOD.to_string(),
            }),
        }
    }

    /// Registers `service_guid` with `engine_guid` for `request_type`.
    ///
    /// `service_request_type` is the request type passed to the service when
    /// it differs from the engine's; `request_parameters` are the defaults
    /// merged under every request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for blank arguments or when either
    /// end is missing or of the wrong type, [`Error::Unauthorized`] if
    /// denied, and repository errors unchanged. Nothing is written when
    /// validation fails.
    #[instrument(
        skip(self, request_parameters),
        fields(operation = "register_service_with_engine", engine = %engine_guid, service = %service_guid)
    )]
    pub fn register_service_with_engine(
        &self,
        user_id: &str,
        engine_guid: &Guid,
        service_guid: &Guid,
        request_type: &str,
        service_request_type: Option<&str>,
        request_parameters: &BTreeMap<String, String>,
    ) -> Result<Registration> {
        const METHOD: &str = "registerServiceWithEngine";

        validate_guid(engine_guid, "governanceEngineGUID", METHOD)?;
        validate_guid(service_guid, "governanceServiceGUID", METHOD)?;
        validate_name(request_type, "requestType", METHOD)?;
        self.verifier.validate_user_operation(user_id, METHOD)?;
        self.require_entity_of_type(engine_guid, GOVERNANCE_ENGINE, "governanceEngineGUID", METHOD)?;
        self.require_entity_of_type(
            service_guid,
            GOVERNANCE_SERVICE,
            "governanceServiceGUID",
            METHOD,
        )?;

        let properties =
            registration_properties(request_type, service_request_type, request_parameters);

        let _guard = self
            .registration_lock
            .lock()
            .map_err(|_| Error::server(METHOD, "registration lock poisoned"))?;

        let mut current = None;
        let mut stale = Vec::new();
        for existing in self.registrations_for(engine_guid, request_type)? {
            if current.is_none() && &existing.end_two.guid == service_guid {
                current = Some(existing);
            } else {
                stale.push(existing);
            }
        }

        // Every other registration of the request type goes, duplicates included.
        let replaced = !stale.is_empty();
        for existing in stale {
            tracing::debug!(
                stale_service = %existing.end_two.guid,
                request_type,
                "Removing stale registration"
            );
            self.repository.delete_relationship(
                user_id,
                &existing.guid,
                Some(existing.header.version),
            )?;
        }

        if let Some(existing) = current {
            let updated = self.repository.update_relationship_properties(
                user_id,
                &existing.guid,
                Some(existing.header.version),
                properties,
            )?;
            record_registration(RegistrationOutcome::Updated, request_type);
            return Ok(Registration {
                relationship: updated,
                outcome: RegistrationOutcome::Updated,
            });
        }

        let relationship = self.repository.create_relationship(
            user_id,
            SUPPORTED_GOVERNANCE_SERVICE,
            engine_guid,
            service_guid,
            properties,
        )?;
        let outcome = if replaced {
            RegistrationOutcome::Replaced
        } else {
            RegistrationOutcome::Created
        };
        record_registration(outcome, request_type);
        Ok(Registration {
            relationship,
            outcome,
        })
    }

    /// Removes every registration of `service_guid` with `engine_guid`.
    ///
    /// Returns the number of registrations removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for blank GUIDs,
    /// [`Error::Unauthorized`] if denied, and repository errors unchanged.
    #[instrument(
        skip(self),
        fields(operation = "unregister_service_from_engine", engine = %engine_guid, service = %service_guid)
    )]
    pub fn unregister_service_from_engine(
        &self,
        user_id: &str,
        engine_guid: &Guid,
        service_guid: &Guid,
    ) -> Result<usize> {
        const METHOD: &str = "unregisterServiceFromEngine";

        validate_guid(engine_guid, "governanceEngineGUID", METHOD)?;
        validate_guid(service_guid, "governanceServiceGUID", METHOD)?;
        self.verifier.validate_user_operation(user_id, METHOD)?;

        let _guard = self
            .registration_lock
            .lock()
            .map_err(|_| Error::server(METHOD, "registration lock poisoned"))?;

        let registrations = self.repository.get_relationships_between(
            engine_guid,
            service_guid,
            Some(SUPPORTED_GOVERNANCE_SERVICE),
        )?;

        let mut removed = 0;
        for registration in &registrations {
            if self.repository.delete_relationship(
                user_id,
                &registration.guid,
                Some(registration.header.version),
            )? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Every service registered with an engine, ordered by request type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a blank GUID,
    /// [`Error::Unauthorized`] if denied, and repository or conversion
    /// errors unchanged.
    pub fn get_registered_services(
        &self,
        user_id: &str,
        engine_guid: &Guid,
    ) -> Result<Vec<RegisteredGovernanceServiceElement>> {
        const METHOD: &str = "getRegisteredServices";

        validate_guid(engine_guid, "governanceEngineGUID", METHOD)?;
        self.verifier.validate_user_operation(user_id, METHOD)?;

        let mut registrations: Vec<RegisteredGovernanceServiceElement> = self
            .engine_registrations(engine_guid)?
            .iter()
            .map(|r| self.registered_service(r, METHOD))
            .collect::<Result<_>>()?;
        registrations.sort_by(|a, b| request_type_of(a).cmp(request_type_of(b)));
        Ok(registrations)
    }

    /// The service registered with an engine for one request type.
    ///
    /// # Errors
    ///
    /// As [`Self::get_registered_services`].
    pub fn get_registered_service(
        &self,
        user_id: &str,
        engine_guid: &Guid,
        request_type: &str,
    ) -> Result<Option<RegisteredGovernanceServiceElement>> {
        const METHOD: &str = "getRegisteredService";

        validate_guid(engine_guid, "governanceEngineGUID", METHOD)?;
        validate_name(request_type, "requestType", METHOD)?;
        self.verifier.validate_user_operation(user_id, METHOD)?;

        self.registrations_for(engine_guid, request_type)?
            .first()
            .map(|r| self.registered_service(r, METHOD))
            .transpose()
    }

    fn validate_definition(
        &self,
        type_name: &str,
        base_type: &str,
        qualified_name: &str,
        method: &str,
    ) -> Result<()> {
        validate_name(qualified_name, "qualifiedName", method)?;
        if !type_registry().is_type_of(type_name, base_type) {
            return Err(Error::invalid_parameter("typeName", method));
        }

        let existing = self.repository.find_entities(
            &EntityQuery::new()
                .with_type(base_type)
                .with_property(QUALIFIED_NAME, qualified_name)
                .with_limit(1),
        )?;
        if existing.is_empty() {
            Ok(())
        } else {
            Err(Error::invalid_parameter("qualifiedName", method))
        }
    }

    fn find_engine(&self, name: &str) -> Result<Option<EntityDetail>> {
        let engines = self.repository.find_entities(
            &EntityQuery::new()
                .with_type(GOVERNANCE_ENGINE)
                .with_property(QUALIFIED_NAME, name)
                .with_limit(1),
        )?;
        Ok(engines.into_iter().next())
    }

    fn require_entity_of_type(
        &self,
        guid: &Guid,
        type_name: &str,
        parameter: &str,
        method: &str,
    ) -> Result<EntityDetail> {
        match self.repository.get_entity(guid)? {
            Some(entity) if type_registry().is_type_of(entity.type_name(), type_name) => Ok(entity),
            _ => Err(Error::invalid_parameter(parameter, method)),
        }
    }

    /// Registrations where the engine is end one.
    fn engine_registrations(&self, engine_guid: &Guid) -> Result<Vec<Relationship>> {
        Ok(self
            .repository
            .get_relationships(engine_guid, Some(SUPPORTED_GOVERNANCE_SERVICE))?
            .into_iter()
            .filter(|r| &r.end_one.guid == engine_guid)
            .collect())
    }

    fn registrations_for(&self, engine_guid: &Guid, request_type: &str) -> Result<Vec<Relationship>> {
        Ok(self
            .engine_registrations(engine_guid)?
            .into_iter()
            .filter(|r| r.properties.get_str(REQUEST_TYPE) == Some(request_type))
            .collect())
    }

    fn registered_service(
        &self,
        relationship: &Relationship,
        method: &str,
    ) -> Result<RegisteredGovernanceServiceElement> {
        let service = self.repository.get_entity(&relationship.end_two.guid)?;
        let relationships = std::slice::from_ref(relationship);
        let source = ConversionSource {
            entity: service.as_ref(),
            relationships,
            starting_guid: None,
        };

        let converter = RegisteredGovernanceServiceConverter::new(&self.server_name, SERVICE_NAME);
        match convert(
            &converter,
            BeanShape::RegisteredGovernanceService,
            &source,
            method,
        )? {
            Bean::RegisteredGovernanceService(element) => Ok(element),
            other => Err(Error::InvalidBeanClass {
                shape: other.shape().to_string(),
                converter: converter.converter_name().to_string(),
                method: method.to_string(),
            }),
        }
    }
}

fn validate_guid(guid: &Guid, parameter: &str, method: &str) -> Result<()> {
    if guid.is_blank() {
        return Err(Error::invalid_parameter(parameter, method));
    }
    Ok(())
}

fn definition_properties(
    qualified_name: &str,
    display_name: Option<&str>,
    description: Option<&str>,
    version_identifier: Option<&str>,
) -> InstanceProperties {
    let mut bag = InstanceProperties::new().with_string(QUALIFIED_NAME, qualified_name);
    for (name, value) in [
        (DISPLAY_NAME, display_name),
        (DESCRIPTION, description),
        (VERSION_IDENTIFIER, version_identifier),
    ] {
        if let Some(value) = value {
            bag = bag.with_string(name, value);
        }
    }
    bag
}

fn registration_properties(
    request_type: &str,
    service_request_type: Option<&str>,
    request_parameters: &BTreeMap<String, String>,
) -> InstanceProperties {
    let mut bag = InstanceProperties::new()
        .with_string(REQUEST_TYPE, request_type)
        .with_string_map(REQUEST_PARAMETERS, request_parameters);
    if let Some(service_request_type) = service_request_type.filter(|s| !s.trim().is_empty()) {
        bag = bag.with_string(SERVICE_REQUEST_TYPE, service_request_type);
    }
    bag
}

fn request_type_of(element: &RegisteredGovernanceServiceElement) -> &str {
    element
        .properties
        .as_ref()
        .map_or("", |p| p.request_type.as_str())
}

fn record_registration(outcome: RegistrationOutcome, request_type: &str) {
    metrics::counter!("service_registrations_total", "outcome" => outcome.as_str()).increment(1);
    tracing::info!(outcome = outcome.as_str(), request_type, "Registered governance service");
}
