//! Glossary term beans.

use super::element::ElementHeader;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Properties of a glossary term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlossaryTermProperties {
    /// Unique name.
    pub qualified_name: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// One-line summary.
    pub summary: Option<String>,
    /// Full description.
    pub description: Option<String>,
    /// Examples of use.
    pub examples: Option<String>,
    /// Abbreviation.
    pub abbreviation: Option<String>,
    /// Guidance on use.
    pub usage: Option<String>,
    /// Caller supplied name/value pairs.
    pub additional_properties: BTreeMap<String, String>,
    /// Subtype name when the entity is a subtype of `GlossaryTerm`.
    pub type_name: Option<String>,
    /// Properties from subtypes not claimed by a named field.
    pub extended_properties: BTreeMap<String, serde_json::Value>,
}

/// A glossary term retrieved from the repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlossaryTermElement {
    /// Header of the term entity.
    pub element_header: ElementHeader,
    /// Term properties; `None` until populated.
    pub glossary_term_properties: Option<GlossaryTermProperties>,
}
