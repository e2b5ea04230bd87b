//! External identifier correlation beans.
//!
//! An `ExternalId` entity sits between the asset manager that owns the
//! identifier (`ExternalIdScope`, asset manager at end one) and the catalog
//! elements it identifies (`ExternalIdLink`, element at end one).

use super::element::{ElementHeader, ElementStub};
use super::enums::{KeyPattern, SynchronizationDirection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Correlation between a catalog element and a third party identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataCorrelationProperties {
    /// GUID of the asset manager that owns the identifier.
    pub asset_manager_guid: Option<String>,
    /// Qualified name of the asset manager.
    pub asset_manager_name: Option<String>,
    /// Permitted synchronisation direction.
    pub synchronization_direction: SynchronizationDirection,
    /// Description of the synchronisation scope.
    pub synchronization_description: Option<String>,
    /// The third party identifier.
    pub external_identifier: Option<String>,
    /// How the identifier is used for the linked element.
    pub external_identifier_usage: Option<String>,
    /// Where the identifier came from.
    pub external_identifier_source: Option<String>,
    /// Description of the link.
    pub link_description: Option<String>,
    /// How the key is allocated.
    pub key_pattern: KeyPattern,
    /// User that created the external instance.
    pub external_instance_created_by: Option<String>,
    /// Creation time of the external instance.
    pub external_instance_creation_time: Option<DateTime<Utc>>,
    /// User that last changed the external instance.
    pub external_instance_last_updated_by: Option<String>,
    /// Last change time of the external instance.
    pub external_instance_last_update_time: Option<DateTime<Utc>>,
    /// Version of the external instance.
    pub external_instance_version: Option<i64>,
    /// Mapping hints for the synchronising connector.
    pub mapping_properties: BTreeMap<String, String>,
    /// Last time the element was synchronised.
    pub last_synchronized: Option<DateTime<Utc>>,
    /// Properties from subtypes not claimed by a named field.
    pub extended_properties: BTreeMap<String, serde_json::Value>,
}

/// An external identifier with its scope and linked elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataCorrelationElement {
    /// Header of the `ExternalId` entity.
    pub element_header: ElementHeader,
    /// Correlation properties; `None` until populated.
    pub correlation_properties: Option<MetadataCorrelationProperties>,
    /// Elements identified by this external identifier.
    pub correlated_elements: Vec<ElementStub>,
}
