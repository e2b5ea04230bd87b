//! Process, port and control flow beans.

use super::element::{ElementHeader, ElementStub};
use super::enums::{PortType, ProcessContainmentType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Properties of a `ControlFlow` relationship.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlFlowProperties {
    /// Unique name.
    pub qualified_name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Guard that selects this edge.
    pub guard: Option<String>,
    /// Whether the guard must be produced before the next step runs.
    pub mandatory_guard: bool,
    /// Properties from subtypes not claimed by a named field.
    pub extended_properties: BTreeMap<String, serde_json::Value>,
}

/// A control flow edge between two process steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlFlowElement {
    /// Header of the relationship.
    pub control_flow_header: ElementHeader,
    /// Edge properties; `None` until populated.
    pub properties: Option<ControlFlowProperties>,
    /// The step the flow leaves (end one).
    pub current_step: ElementStub,
    /// The step the flow enters (end two).
    pub next_step: ElementStub,
}

/// Properties of a `ProcessHierarchy` relationship.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessHierarchyProperties {
    /// Ownership of the child.
    pub containment_type: ProcessContainmentType,
    /// Properties from subtypes not claimed by a named field.
    pub extended_properties: BTreeMap<String, serde_json::Value>,
}

/// A parent/child link between processes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessHierarchyElement {
    /// Header of the relationship.
    pub relationship_header: ElementHeader,
    /// Relationship properties; `None` until populated.
    pub properties: Option<ProcessHierarchyProperties>,
    /// The parent process (end one).
    pub parent_process: ElementStub,
    /// The child process (end two).
    pub child_process: ElementStub,
}

/// Properties of a port.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortProperties {
    /// Unique name.
    pub qualified_name: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// Direction of data through the port.
    pub port_type: PortType,
    /// Caller supplied name/value pairs.
    pub additional_properties: BTreeMap<String, String>,
    /// Subtype name when the entity is a subtype of `Port`.
    pub type_name: Option<String>,
    /// Properties from subtypes not claimed by a named field.
    pub extended_properties: BTreeMap<String, serde_json::Value>,
}

/// A port on a process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortElement {
    /// Header of the port entity.
    pub element_header: ElementHeader,
    /// Port properties; `None` until populated.
    pub port_properties: Option<PortProperties>,
}
