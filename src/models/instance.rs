//! Generic repository instances.
//!
//! Entities and relationships arrive from the repository as type-tagged
//! property bags. Converters never see a typed view of them: they drain the
//! named properties they understand (see [`PropertyDrain`](super::PropertyDrain))
//! and treat the rest as opaque extended properties.

use super::registry::{TypeDefCategory, type_registry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Globally unique identifier of a metadata instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    /// Creates a GUID from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new random GUID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the GUID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for an empty or blank identifier.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Guid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Guid {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Guid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single tagged property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InstancePropertyValue {
    /// UTF-8 string.
    String(String),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// Double precision float.
    Double(f64),
    /// Boolean flag.
    Boolean(bool),
    /// Timestamp.
    Date(DateTime<Utc>),
    /// Enumeration value, stored by ordinal.
    Enum {
        /// Ordinal from the type definition.
        ordinal: i32,
        /// Symbolic name, informational only.
        symbolic_name: String,
    },
    /// Ordered list of values.
    Array(Vec<InstancePropertyValue>),
    /// Nested name/value map.
    Map(InstanceProperties),
}

impl InstancePropertyValue {
    /// Converts the value into plain JSON for extended/additional properties.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Int(i) => Value::from(*i),
            Self::Long(l) => Value::from(*l),
            Self::Double(d) => Value::from(*d),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Date(d) => Value::String(d.to_rfc3339()),
            Self::Enum { symbolic_name, .. } => Value::String(symbolic_name.clone()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Name of the value's kind, matching the serialized `kind` tag.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::Enum { .. } => "enum",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    /// Returns the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Unordered bag of named property values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceProperties(BTreeMap<String, InstancePropertyValue>);

impl InstanceProperties {
    /// Creates an empty property bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: InstancePropertyValue) {
        self.0.insert(name.into(), value);
    }

    /// Removes and returns a property.
    pub fn remove(&mut self, name: &str) -> Option<InstancePropertyValue> {
        self.0.remove(name)
    }

    /// Returns a property by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&InstancePropertyValue> {
        self.0.get(name)
    }

    /// Returns a string property by name.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(InstancePropertyValue::as_str)
    }

    /// Returns `true` if the named property is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over name/value pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &InstancePropertyValue)> {
        self.0.iter()
    }

    /// Property names in name order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Converts the whole bag to plain JSON values.
    #[must_use]
    pub fn to_json_map(&self) -> BTreeMap<String, serde_json::Value> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }

    /// Adds a string property.
    #[must_use]
    pub fn with_string(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, InstancePropertyValue::String(value.into()));
        self
    }

    /// Adds an integer property.
    #[must_use]
    pub fn with_int(mut self, name: &str, value: i32) -> Self {
        self.insert(name, InstancePropertyValue::Int(value));
        self
    }

    /// Adds a long property.
    #[must_use]
    pub fn with_long(mut self, name: &str, value: i64) -> Self {
        self.insert(name, InstancePropertyValue::Long(value));
        self
    }

    /// Adds a boolean property.
    #[must_use]
    pub fn with_bool(mut self, name: &str, value: bool) -> Self {
        self.insert(name, InstancePropertyValue::Boolean(value));
        self
    }

    /// Adds a date property.
    #[must_use]
    pub fn with_date(mut self, name: &str, value: DateTime<Utc>) -> Self {
        self.insert(name, InstancePropertyValue::Date(value));
        self
    }

    /// Adds an enumeration property.
    #[must_use]
    pub fn with_enum(mut self, name: &str, ordinal: i32, symbolic_name: &str) -> Self {
        self.insert(
            name,
            InstancePropertyValue::Enum {
                ordinal,
                symbolic_name: symbolic_name.to_string(),
            },
        );
        self
    }

    /// Adds a string array property.
    #[must_use]
    pub fn with_string_array<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|v| InstancePropertyValue::String(v.into()))
            .collect();
        self.insert(name, InstancePropertyValue::Array(values));
        self
    }

    /// Adds a map of strings property.
    #[must_use]
    pub fn with_string_map<I, K, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (k, v) in values {
            map.insert(k, InstancePropertyValue::String(v.into()));
        }
        self.insert(name, InstancePropertyValue::Map(map));
        self
    }
}

impl FromIterator<(String, InstancePropertyValue)> for InstanceProperties {
    fn from_iter<T: IntoIterator<Item = (String, InstancePropertyValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Type tag carried by every instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceType {
    /// GUID of the type definition.
    pub type_def_guid: String,
    /// Name of the type definition.
    pub type_def_name: String,
    /// Supertype names, nearest first.
    #[serde(default)]
    pub super_type_names: Vec<String>,
    /// Entity, relationship or classification.
    pub category: TypeDefCategory,
}

impl InstanceType {
    /// Builds the type tag for a known type name.
    ///
    /// Names absent from the registry keep an empty GUID and no supertypes.
    #[must_use]
    pub fn for_type_name(type_name: &str, category: TypeDefCategory) -> Self {
        let registry = type_registry();
        let type_def_guid = registry
            .get_by_name(type_name)
            .map(|def| def.guid.to_string())
            .unwrap_or_default();
        let super_type_names = registry
            .super_types(type_name)
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            type_def_guid,
            type_def_name: type_name.to_string(),
            super_type_names,
            category,
        }
    }
}

/// Where the instance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceProvenance {
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

/// Lifecycle status of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    /// Not known.
    Unknown,
    /// Work in progress.
    Draft,
    /// Proposed for approval.
    Proposed,
    /// Approved for use.
    Approved,
    /// In use.
    #[default]
    Active,
    /// Scheduled for removal.
    Deprecated,
    /// Soft deleted.
    Deleted,
    /// Some other status.
    Other,
}

/// Audit and provenance fields shared by entities and relationships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceAuditHeader {
    /// Type of the instance.
    pub instance_type: InstanceType,
    /// Provenance.
    #[serde(default)]
    pub instance_provenance: InstanceProvenance,
    /// Home metadata collection.
    #[serde(default)]
    pub metadata_collection_id: Option<String>,
    /// Home metadata collection display name.
    #[serde(default)]
    pub metadata_collection_name: Option<String>,
    /// Creating user.
    #[serde(default)]
    pub created_by: Option<String>,
    /// Last updating user.
    #[serde(default)]
    pub updated_by: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
    /// Version, incremented on every update.
    #[serde(default)]
    pub version: u64,
    /// Lifecycle status.
    #[serde(default)]
    pub status: InstanceStatus,
}

impl InstanceAuditHeader {
    /// Creates a header for a new, locally owned instance.
    #[must_use]
    pub fn new(instance_type: InstanceType) -> Self {
        Self {
            instance_type,
            instance_provenance: InstanceProvenance::LocalCohort,
            metadata_collection_id: None,
            metadata_collection_name: None,
            created_by: None,
            updated_by: None,
            create_time: Some(Utc::now()),
            update_time: None,
            version: 1,
            status: InstanceStatus::Active,
        }
    }

    /// Name of the instance's type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.instance_type.type_def_name
    }
}

/// A classification attached to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Classification type name.
    pub name: String,
    /// Classification properties.
    #[serde(default)]
    pub properties: InstanceProperties,
    /// Entity the classification originated on, if propagated.
    #[serde(default)]
    pub origin_guid: Option<Guid>,
}

impl Classification {
    /// Creates a classification.
    #[must_use]
    pub fn new(name: impl Into<String>, properties: InstanceProperties) -> Self {
        Self {
            name: name.into(),
            properties,
            origin_guid: None,
        }
    }
}

/// A single addressable metadata record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetail {
    /// Identifier.
    pub guid: Guid,
    /// Type, provenance and audit fields.
    pub header: InstanceAuditHeader,
    /// Property bag.
    #[serde(default)]
    pub properties: InstanceProperties,
    /// Attached classifications.
    #[serde(default)]
    pub classifications: Vec<Classification>,
}

impl EntityDetail {
    /// Creates a new entity of the named type with a generated GUID.
    #[must_use]
    pub fn new(type_name: &str, properties: InstanceProperties) -> Self {
        Self::with_guid(Guid::generate(), type_name, properties)
    }

    /// Creates a new entity with an explicit GUID.
    #[must_use]
    pub fn with_guid(guid: Guid, type_name: &str, properties: InstanceProperties) -> Self {
        Self {
            guid,
            header: InstanceAuditHeader::new(InstanceType::for_type_name(
                type_name,
                TypeDefCategory::Entity,
            )),
            properties,
            classifications: Vec::new(),
        }
    }

    /// Adds a classification.
    #[must_use]
    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classifications.push(classification);
        self
    }

    /// Sets the creating user.
    #[must_use]
    pub fn created_by(mut self, user_id: &str) -> Self {
        self.header.created_by = Some(user_id.to_string());
        self
    }

    /// Name of the entity's type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.header.type_name()
    }

    /// Builds a proxy that references this entity.
    #[must_use]
    pub fn proxy(&self) -> EntityProxy {
        let mut unique_properties = InstanceProperties::new();
        if let Some(qualified_name) = self.properties.get(super::property_names::QUALIFIED_NAME) {
            unique_properties.insert(super::property_names::QUALIFIED_NAME, qualified_name.clone());
        }
        EntityProxy {
            guid: self.guid.clone(),
            instance_type: self.header.instance_type.clone(),
            unique_properties,
        }
    }
}

/// Lightweight reference to one end of a relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityProxy {
    /// GUID of the referenced entity.
    pub guid: Guid,
    /// Type of the referenced entity.
    pub instance_type: InstanceType,
    /// Unique properties copied from the entity (usually `qualifiedName`).
    #[serde(default)]
    pub unique_properties: InstanceProperties,
}

impl EntityProxy {
    /// Creates a proxy with no unique properties.
    #[must_use]
    pub fn new(guid: Guid, type_name: &str) -> Self {
        Self {
            guid,
            instance_type: InstanceType::for_type_name(type_name, TypeDefCategory::Entity),
            unique_properties: InstanceProperties::new(),
        }
    }
}

/// A typed link between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Identifier.
    pub guid: Guid,
    /// Type, provenance and audit fields.
    pub header: InstanceAuditHeader,
    /// Property bag.
    #[serde(default)]
    pub properties: InstanceProperties,
    /// End one.
    pub end_one: EntityProxy,
    /// End two.
    pub end_two: EntityProxy,
}

impl Relationship {
    /// Creates a relationship of the named type with a generated GUID.
    #[must_use]
    pub fn new(
        type_name: &str,
        end_one: EntityProxy,
        end_two: EntityProxy,
        properties: InstanceProperties,
    ) -> Self {
        Self {
            guid: Guid::generate(),
            header: InstanceAuditHeader::new(InstanceType::for_type_name(
                type_name,
                TypeDefCategory::Relationship,
            )),
            properties,
            end_one,
            end_two,
        }
    }

    /// Name of the relationship's type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.header.type_name()
    }

    /// Returns the end that is not `guid`, if `guid` is one of the ends.
    #[must_use]
    pub fn other_end(&self, guid: &Guid) -> Option<&EntityProxy> {
        if &self.end_one.guid == guid {
            Some(&self.end_two)
        } else if &self.end_two.guid == guid {
            Some(&self.end_one)
        } else {
            None
        }
    }

    /// Returns `true` if either end references `guid`.
    #[must_use]
    pub fn touches(&self, guid: &Guid) -> bool {
        &self.end_one.guid == guid || &self.end_two.guid == guid
    }
}
