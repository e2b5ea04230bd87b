//! Element headers shared by every bean.

use super::instance::{Guid, InstanceProvenance, InstanceStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Type information copied from an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementType {
    /// Type GUID.
    pub type_id: String,
    /// Type name.
    pub type_name: String,
    /// Supertype names, nearest first.
    pub super_type_names: Vec<String>,
}

/// Where an element's authoritative copy lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementOriginCategory {
    /// Not known.
    #[default]
    Unknown,
    /// Owned by a repository in the local cohort.
    LocalCohort,
    /// Loaded from an export archive.
    ExportArchive,
    /// Loaded from a content pack.
    ContentPack,
    /// From a repository that has left the cohort.
    DeregisteredRepository,
    /// Created from configuration.
    Configuration,
    /// Synchronised from an external source.
    ExternalSource,
}

impl From<InstanceProvenance> for ElementOriginCategory {
    fn from(provenance: InstanceProvenance) -> Self {
        match provenance {
            InstanceProvenance::Unknown => Self::Unknown,
            InstanceProvenance::LocalCohort => Self::LocalCohort,
            InstanceProvenance::ExportArchive => Self::ExportArchive,
            InstanceProvenance::ContentPack => Self::ContentPack,
            InstanceProvenance::DeregisteredRepository => Self::DeregisteredRepository,
            InstanceProvenance::Configuration => Self::Configuration,
            InstanceProvenance::ExternalSource => Self::ExternalSource,
        }
    }
}

/// Provenance of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementOrigin {
    /// Server that produced the bean.
    pub source_server: String,
    /// Origin category.
    pub origin_category: ElementOriginCategory,
    /// Home metadata collection id.
    pub home_metadata_collection_id: Option<String>,
    /// Home metadata collection name.
    pub home_metadata_collection_name: Option<String>,
}

/// Audit fields of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementVersions {
    /// Creating user.
    pub created_by: Option<String>,
    /// Last updating user.
    pub updated_by: Option<String>,
    /// Creation time.
    pub create_time: Option<DateTime<Utc>>,
    /// Last update time.
    pub update_time: Option<DateTime<Utc>>,
    /// Version number.
    pub version: u64,
}

/// Lifecycle status of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementStatus {
    /// Not known.
    #[default]
    Unknown,
    /// Work in progress.
    Draft,
    /// Proposed.
    Proposed,
    /// Approved.
    Approved,
    /// In use.
    Active,
    /// Deprecated.
    Deprecated,
    /// Deleted.
    Deleted,
    /// Some other status.
    Other,
}

impl From<InstanceStatus> for ElementStatus {
    fn from(status: InstanceStatus) -> Self {
        match status {
            InstanceStatus::Unknown => Self::Unknown,
            InstanceStatus::Draft => Self::Draft,
            InstanceStatus::Proposed => Self::Proposed,
            InstanceStatus::Approved => Self::Approved,
            InstanceStatus::Active => Self::Active,
            InstanceStatus::Deprecated => Self::Deprecated,
            InstanceStatus::Deleted => Self::Deleted,
            InstanceStatus::Other => Self::Other,
        }
    }
}

/// A classification as seen by callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementClassification {
    /// Classification name.
    pub classification_name: String,
    /// Classification properties.
    pub classification_properties: BTreeMap<String, serde_json::Value>,
    /// Entity the classification was propagated from.
    pub origin_guid: Option<Guid>,
}

/// Header common to every element and relationship bean.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementHeader {
    /// Element GUID.
    pub guid: Guid,
    /// Element type.
    pub element_type: ElementType,
    /// Provenance.
    pub origin: ElementOrigin,
    /// Audit fields.
    pub versions: ElementVersions,
    /// Lifecycle status.
    pub status: ElementStatus,
    /// Attached classifications (entities only).
    pub classifications: Vec<ElementClassification>,
}

/// Reference to an element at the end of a relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementStub {
    /// Element GUID.
    pub guid: Guid,
    /// Element type.
    pub element_type: ElementType,
    /// Unique name, if the proxy carried one.
    pub unique_name: Option<String>,
}
