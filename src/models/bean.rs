//! The closed set of bean shapes a converter can produce.

use super::correlation::MetadataCorrelationElement;
use super::feedback::RatingElement;
use super::glossary::GlossaryTermElement;
use super::governance::{
    EngineActionElement, GovernanceEngineElement, GovernanceServiceElement,
    RegisteredGovernanceServiceElement,
};
use super::process::{ControlFlowElement, PortElement, ProcessHierarchyElement};
use super::related::RelatedElement;
use super::schema::SchemaAttributeElement;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selects the bean a conversion should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeanShape {
    /// [`GlossaryTermElement`].
    GlossaryTerm,
    /// [`RatingElement`].
    Rating,
    /// [`MetadataCorrelationElement`].
    MetadataCorrelation,
    /// [`ControlFlowElement`].
    ControlFlow,
    /// [`ProcessHierarchyElement`].
    ProcessHierarchy,
    /// [`PortElement`].
    Port,
    /// [`SchemaAttributeElement`].
    SchemaAttribute,
    /// [`EngineActionElement`].
    EngineAction,
    /// [`GovernanceEngineElement`].
    GovernanceEngine,
    /// [`GovernanceServiceElement`].
    GovernanceService,
    /// [`RegisteredGovernanceServiceElement`].
    RegisteredGovernanceService,
    /// [`RelatedElement`].
    RelatedElement,
}

impl BeanShape {
    /// Returns all shapes.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::GlossaryTerm,
            Self::Rating,
            Self::MetadataCorrelation,
            Self::ControlFlow,
            Self::ProcessHierarchy,
            Self::Port,
            Self::SchemaAttribute,
            Self::EngineAction,
            Self::GovernanceEngine,
            Self::GovernanceService,
            Self::RegisteredGovernanceService,
            Self::RelatedElement,
        ]
    }

    /// Returns the shape as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GlossaryTerm => "glossary_term",
            Self::Rating => "rating",
            Self::MetadataCorrelation => "metadata_correlation",
            Self::ControlFlow => "control_flow",
            Self::ProcessHierarchy => "process_hierarchy",
            Self::Port => "port",
            Self::SchemaAttribute => "schema_attribute",
            Self::EngineAction => "engine_action",
            Self::GovernanceEngine => "governance_engine",
            Self::GovernanceService => "governance_service",
            Self::RegisteredGovernanceService => "registered_governance_service",
            Self::RelatedElement => "related_element",
        }
    }

    /// Parses a shape from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.to_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|shape| shape.as_str() == normalized)
    }
}

impl fmt::Display for BeanShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BeanShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown bean shape: {s}"))
    }
}

/// A bean of one of the known shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "bean", rename_all = "snake_case")]
pub enum Bean {
    /// Glossary term.
    GlossaryTerm(GlossaryTermElement),
    /// Rating.
    Rating(RatingElement),
    /// External identifier correlation.
    MetadataCorrelation(MetadataCorrelationElement),
    /// Control flow edge.
    ControlFlow(ControlFlowElement),
    /// Process hierarchy link.
    ProcessHierarchy(ProcessHierarchyElement),
    /// Port.
    Port(PortElement),
    /// Schema attribute.
    SchemaAttribute(SchemaAttributeElement),
    /// Engine action.
    EngineAction(EngineActionElement),
    /// Governance engine.
    GovernanceEngine(GovernanceEngineElement),
    /// Governance service.
    GovernanceService(GovernanceServiceElement),
    /// Service registration.
    RegisteredGovernanceService(RegisteredGovernanceServiceElement),
    /// Related element.
    RelatedElement(RelatedElement),
}

impl Bean {
    /// Creates an unpopulated bean of the given shape.
    #[must_use]
    pub fn empty(shape: BeanShape) -> Self {
        match shape {
            BeanShape::GlossaryTerm => Self::GlossaryTerm(GlossaryTermElement::default()),
            BeanShape::Rating => Self::Rating(RatingElement::default()),
            BeanShape::MetadataCorrelation => {
                Self::MetadataCorrelation(MetadataCorrelationElement::default())
            },
            BeanShape::ControlFlow => Self::ControlFlow(ControlFlowElement::default()),
            BeanShape::ProcessHierarchy => {
                Self::ProcessHierarchy(ProcessHierarchyElement::default())
            },
            BeanShape::Port => Self::Port(PortElement::default()),
            BeanShape::SchemaAttribute => Self::SchemaAttribute(SchemaAttributeElement::default()),
            BeanShape::EngineAction => Self::EngineAction(EngineActionElement::default()),
            BeanShape::GovernanceEngine => {
                Self::GovernanceEngine(GovernanceEngineElement::default())
            },
            BeanShape::GovernanceService => {
                Self::GovernanceService(GovernanceServiceElement::default())
            },
            BeanShape::RegisteredGovernanceService => {
                Self::RegisteredGovernanceService(RegisteredGovernanceServiceElement::default())
            },
            BeanShape::RelatedElement => Self::RelatedElement(RelatedElement::default()),
        }
    }

    /// Returns the shape of this bean.
    #[must_use]
    pub const fn shape(&self) -> BeanShape {
        match self {
            Self::GlossaryTerm(_) => BeanShape::GlossaryTerm,
            Self::Rating(_) => BeanShape::Rating,
            Self::MetadataCorrelation(_) => BeanShape::MetadataCorrelation,
            Self::ControlFlow(_) => BeanShape::ControlFlow,
            Self::ProcessHierarchy(_) => BeanShape::ProcessHierarchy,
            Self::Port(_) => BeanShape::Port,
            Self::SchemaAttribute(_) => BeanShape::SchemaAttribute,
            Self::EngineAction(_) => BeanShape::EngineAction,
            Self::GovernanceEngine(_) => BeanShape::GovernanceEngine,
            Self::GovernanceService(_) => BeanShape::GovernanceService,
            Self::RegisteredGovernanceService(_) => BeanShape::RegisteredGovernanceService,
            Self::RelatedElement(_) => BeanShape::RelatedElement,
        }
    }

    /// Returns `true` if the bean's domain properties were filled in.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        match self {
            Self::GlossaryTerm(b) => b.glossary_term_properties.is_some(),
            Self::Rating(b) => b.properties.is_some(),
            Self::MetadataCorrelation(b) => b.correlation_properties.is_some(),
            Self::ControlFlow(b) => b.properties.is_some(),
            Self::ProcessHierarchy(b) => b.properties.is_some(),
            Self::Port(b) => b.port_properties.is_some(),
            Self::SchemaAttribute(b) => b.properties.is_some(),
            Self::EngineAction(b) => b.properties.is_some(),
            Self::GovernanceEngine(b) => b.properties.is_some(),
            Self::GovernanceService(b) => b.properties.is_some(),
            Self::RegisteredGovernanceService(b) => b.properties.is_some(),
            Self::RelatedElement(b) => !b.relationship_header.guid.is_blank(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_matches_shape() {
        for shape in BeanShape::all() {
            let bean = Bean::empty(*shape);
            assert_eq!(bean.shape(), *shape);
            assert!(!bean.is_populated());
        }
    }

    #[test]
    fn test_shape_parse_roundtrip() {
        for shape in BeanShape::all() {
            assert_eq!(BeanShape::parse(shape.as_str()), Some(*shape));
        }
        assert_eq!(BeanShape::parse("Control-Flow"), Some(BeanShape::ControlFlow));
        assert!("nonsense".parse::<BeanShape>().is_err());
    }
}
