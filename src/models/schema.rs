//! Schema attribute beans.

use super::element::ElementHeader;
use super::enums::DataItemSortOrder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Properties of a schema attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaAttributeProperties {
    /// Unique name.
    pub qualified_name: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Position within the parent schema.
    pub element_position: i32,
    /// Minimum cardinality.
    pub min_cardinality: i32,
    /// Maximum cardinality.
    pub max_cardinality: i32,
    /// Whether duplicate values are allowed.
    pub allows_duplicate_values: bool,
    /// Whether values are ordered.
    pub ordered_values: bool,
    /// Sort order of the values.
    pub sort_order: DataItemSortOrder,
    /// Default value override.
    pub default_value_override: Option<String>,
    /// Minimum length.
    pub minimum_length: i32,
    /// Length.
    pub length: i32,
    /// Precision.
    pub precision: i32,
    /// Whether the attribute may be null.
    pub is_nullable: bool,
    /// Native class.
    pub native_class: Option<String>,
    /// Alternative names.
    pub aliases: Vec<String>,
    /// Caller supplied name/value pairs.
    pub additional_properties: BTreeMap<String, String>,
    /// Subtype name when the entity is a subtype of `SchemaAttribute`.
    pub type_name: Option<String>,
    /// Properties from subtypes not claimed by a named field.
    pub extended_properties: BTreeMap<String, serde_json::Value>,
}

/// A schema attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaAttributeElement {
    /// Header of the attribute entity.
    pub element_header: ElementHeader,
    /// Attribute properties; `None` until populated.
    pub properties: Option<SchemaAttributeProperties>,
}
