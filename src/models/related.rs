//! Generic relationship view from one end.

use super::element::{ElementHeader, ElementStub};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An element reached through a relationship, with the relationship itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedElement {
    /// Header of the relationship.
    pub relationship_header: ElementHeader,
    /// All relationship properties.
    pub relationship_properties: BTreeMap<String, serde_json::Value>,
    /// The end that is not the starting element.
    pub related_element: ElementStub,
}
