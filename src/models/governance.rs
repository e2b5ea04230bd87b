//! Governance engine, service, registration and engine action beans.

use super::element::{ElementHeader, ElementStub};
use super::enums::EngineActionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Properties of a governance engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GovernanceEngineProperties {
    /// Unique name.
    pub qualified_name: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Version identifier.
    pub version_identifier: Option<String>,
    /// Caller supplied name/value pairs.
    pub additional_properties: BTreeMap<String, String>,
    /// Subtype name, for example `SurveyActionEngine`.
    pub type_name: Option<String>,
    /// Properties from subtypes not claimed by a named field.
    pub extended_properties: BTreeMap<String, serde_json::Value>,
}

/// A governance engine definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GovernanceEngineElement {
    /// Header of the engine entity.
    pub element_header: ElementHeader,
    /// Engine properties; `None` until populated.
    pub properties: Option<GovernanceEngineProperties>,
}

/// Properties of a governance service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GovernanceServiceProperties {
    /// Unique name.
    pub qualified_name: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Version identifier.
    pub version_identifier: Option<String>,
    /// Name of the provider that instantiates the service.
    pub connector_provider_name: Option<String>,
    /// Caller supplied name/value pairs.
    pub additional_properties: BTreeMap<String, String>,
    /// Subtype name, for example `SurveyActionService`.
    pub type_name: Option<String>,
    /// Properties from subtypes not claimed by a named field.
    pub extended_properties: BTreeMap<String, serde_json::Value>,
}

/// A governance service definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GovernanceServiceElement {
    /// Header of the service entity.
    pub element_header: ElementHeader,
    /// Service properties; `None` until populated.
    pub properties: Option<GovernanceServiceProperties>,
}

/// Properties of a `SupportedGovernanceService` registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisteredServiceProperties {
    /// Request type the engine accepts.
    pub request_type: String,
    /// Request type passed to the service, when it differs.
    pub service_request_type: Option<String>,
    /// Default request parameters.
    pub request_parameters: BTreeMap<String, String>,
    /// Properties from subtypes not claimed by a named field.
    pub extended_properties: BTreeMap<String, serde_json::Value>,
}

/// A service registered with an engine for one request type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisteredGovernanceServiceElement {
    /// Header of the registration relationship.
    pub registration_header: ElementHeader,
    /// The engine (end one).
    pub engine: ElementStub,
    /// The service (end two).
    pub service: ElementStub,
    /// Registration properties; `None` until populated.
    pub properties: Option<RegisteredServiceProperties>,
    /// Service definition, when the service entity was supplied.
    pub service_properties: Option<GovernanceServiceProperties>,
}

/// Properties of an engine action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineActionProperties {
    /// Unique name.
    pub qualified_name: Option<String>,
    /// Governance domain.
    pub domain_identifier: i32,
    /// Display name.
    pub display_name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Request type.
    pub request_type: Option<String>,
    /// Request parameters.
    pub request_parameters: BTreeMap<String, String>,
    /// Current status.
    pub action_status: EngineActionStatus,
    /// User id of the engine that claimed the action.
    pub processing_engine_user_id: Option<String>,
    /// When the action was requested.
    pub requested_time: Option<DateTime<Utc>>,
    /// When the action should start or started.
    pub start_time: Option<DateTime<Utc>>,
    /// When the action completed.
    pub completion_time: Option<DateTime<Utc>>,
    /// Guards produced on completion.
    pub completion_guards: Vec<String>,
    /// Message produced on completion.
    pub completion_message: Option<String>,
    /// Engine that runs the action.
    pub executor_engine_guid: Option<String>,
    /// Name of the engine that runs the action.
    pub executor_engine_name: Option<String>,
    /// Properties from subtypes not claimed by a named field.
    pub extended_properties: BTreeMap<String, serde_json::Value>,
}

/// An element an engine action works on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionTargetElement {
    /// GUID of the `TargetForAction` relationship.
    pub relationship_guid: String,
    /// Name the service uses for the target.
    pub action_target_name: Option<String>,
    /// Status of the work on this target.
    pub status: EngineActionStatus,
    /// Message about the work on this target.
    pub completion_message: Option<String>,
    /// The target element (end two).
    pub target_element: ElementStub,
}

/// An engine action with its targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineActionElement {
    /// Header of the engine action entity.
    pub element_header: ElementHeader,
    /// Action properties; `None` until populated.
    pub properties: Option<EngineActionProperties>,
    /// Targets attached by `TargetForAction`.
    pub action_targets: Vec<ActionTargetElement>,
}
