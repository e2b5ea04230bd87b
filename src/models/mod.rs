//! Data models for metagov.
//!
//! Generic repository instances, the registry of type and property names,
//! and the typed beans converters build from them.

mod bean;
mod completion;
mod correlation;
mod drain;
mod element;
pub mod enums;
mod feedback;
mod glossary;
mod governance;
mod instance;
mod process;
pub mod property_names;
pub mod registry;
mod related;
mod report;
mod schema;

pub use bean::{Bean, BeanShape};
pub use completion::{CompletionRecord, CompletionStatus, NewActionTarget};
pub use correlation::{MetadataCorrelationElement, MetadataCorrelationProperties};
pub use drain::PropertyDrain;
pub use element::{
    ElementClassification, ElementHeader, ElementOrigin, ElementOriginCategory, ElementStatus,
    ElementStub, ElementType, ElementVersions,
};
pub use enums::{
    DataItemSortOrder, EngineActionStatus, KeyPattern, OrdinalEnum, PortType,
    ProcessContainmentType, StarRating, SynchronizationDirection,
};
pub use feedback::{FeedbackTargetElement, RatingElement, RatingProperties};
pub use glossary::{GlossaryTermElement, GlossaryTermProperties};
pub use governance::{
    ActionTargetElement, EngineActionElement, EngineActionProperties, GovernanceEngineElement,
    GovernanceEngineProperties, GovernanceServiceElement, GovernanceServiceProperties,
    RegisteredGovernanceServiceElement, RegisteredServiceProperties,
};
pub use instance::{
    Classification, EntityDetail, EntityProxy, Guid, InstanceAuditHeader, InstanceProperties,
    InstancePropertyValue, InstanceProvenance, InstanceStatus, InstanceType, Relationship,
};
pub use process::{
    ControlFlowElement, ControlFlowProperties, PortElement, PortProperties,
    ProcessHierarchyElement, ProcessHierarchyProperties,
};
pub use registry::{TypeDefCategory, TypeDefSummary, TypeRegistry, type_registry};
pub use related::RelatedElement;
pub use report::{Annotation, SurveyReport};
pub use schema::{SchemaAttributeElement, SchemaAttributeProperties};
