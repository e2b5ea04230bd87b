//! Converters from generic repository instances to typed beans.
//!
//! Each converter targets one [`BeanShape`]. It reads the primary entity
//! (and, for relationship-based beans, the supplied relationships), drains
//! the properties it recognises and leaves the rest as extended properties.
//!
//! # Contract
//!
//! | Situation | Result |
//! |-----------|--------|
//! | Requested shape is the converter's target | Populated bean |
//! | Requested shape differs | Unpopulated [`Bean::empty`] of the requested shape |
//! | Required entity/relationship absent | [`Error::MissingInstance`](crate::Error::MissingInstance) |
//! | Bean variant does not fit the converter | [`Error::InvalidBeanClass`](crate::Error::InvalidBeanClass) |
//!
//! # Example
//!
//! ```rust,ignore
//! use metagov::services::converters::{ConversionSource, GlossaryTermConverter, convert};
//! use metagov::BeanShape;
//!
//! let converter = GlossaryTermConverter::new("server1", "glossary-view");
//! let bean = convert(
//!     &converter,
//!     BeanShape::GlossaryTerm,
//!     &ConversionSource::entity(&entity),
//!     "getTermByGUID",
//! )?;
//! ```

mod base;
mod correlation;
mod feedback;
mod glossary;
mod governance;
mod process;
mod related;
mod schema;

pub use base::ConverterBase;
pub use correlation::MetadataCorrelationConverter;
pub use feedback::RatingConverter;
pub use glossary::GlossaryTermConverter;
pub use governance::{
    EngineActionConverter, GovernanceEngineConverter, GovernanceServiceConverter,
    RegisteredGovernanceServiceConverter,
};
pub use process::{ControlFlowConverter, PortConverter, ProcessHierarchyConverter};
pub use related::RelatedElementConverter;
pub use schema::SchemaAttributeConverter;

use crate::Result;
use crate::models::{Bean, BeanShape, EntityDetail, Guid, Relationship};

/// The instances a bean is built from.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionSource<'a> {
    /// Primary entity.
    pub entity: Option<&'a EntityDetail>,
    /// Relationships attached to the entity, or the primary relationship.
    pub relationships: &'a [Relationship],
    /// End a relationship is viewed from.
    pub starting_guid: Option<&'a Guid>,
}

impl<'a> ConversionSource<'a> {
    /// A source with nothing in it.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entity: None,
            relationships: &[],
            starting_guid: None,
        }
    }

    /// A source with a primary entity.
    #[must_use]
    pub const fn entity(entity: &'a EntityDetail) -> Self {
        Self {
            entity: Some(entity),
            relationships: &[],
            starting_guid: None,
        }
    }

    /// A source with a single primary relationship.
    #[must_use]
    pub const fn relationship(relationship: &'a Relationship) -> Self {
        Self {
            entity: None,
            relationships: std::slice::from_ref(relationship),
            starting_guid: None,
        }
    }

    /// Adds relationships.
    #[must_use]
    pub const fn with_relationships(mut self, relationships: &'a [Relationship]) -> Self {
        self.relationships = relationships;
        self
    }

    /// Sets the end relationships are viewed from.
    #[must_use]
    pub const fn starting_at(mut self, guid: &'a Guid) -> Self {
        self.starting_guid = Some(guid);
        self
    }
}

/// Populates one shape of bean from generic instances.
pub trait BeanConverter: Send + Sync {
    /// Name used in diagnostics.
    fn converter_name(&self) -> &'static str;

    /// The shape this converter populates.
    fn target_shape(&self) -> BeanShape;

    /// Fills in `bean` from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingInstance`](crate::Error::MissingInstance) when a
    /// required instance is absent and
    /// [`Error::InvalidBeanClass`](crate::Error::InvalidBeanClass) when `bean`
    /// is not this converter's shape.
    fn populate(&self, bean: &mut Bean, source: &ConversionSource<'_>, method: &str)
    -> Result<()>;
}

/// Builds a bean of `shape` using `converter`.
///
/// A shape the converter does not produce yields an unpopulated bean of that
/// shape.
///
/// # Errors
///
/// Propagates the converter's errors; a partially populated bean is never
/// returned.
pub fn convert<C>(
    converter: &C,
    shape: BeanShape,
    source: &ConversionSource<'_>,
    method: &str,
) -> Result<Bean>
where
    C: BeanConverter + ?Sized,
{
    let mut bean = Bean::empty(shape);

    if shape != converter.target_shape() {
        tracing::debug!(
            converter = converter.converter_name(),
            requested = %shape,
            target = %converter.target_shape(),
            method,
            "Returning unpopulated bean for unsupported shape"
        );
        return Ok(bean);
    }

    converter.populate(&mut bean, source, method)?;
    metrics::counter!("beans_converted_total", "shape" => shape.as_str()).increment(1);
    Ok(bean)
}

/// Converts every entity into a bean of `shape`.
///
/// # Errors
///
/// Fails on the first conversion error.
pub fn convert_all<C>(
    converter: &C,
    shape: BeanShape,
    entities: &[EntityDetail],
    method: &str,
) -> Result<Vec<Bean>>
where
    C: BeanConverter + ?Sized,
{
    entities
        .iter()
        .map(|entity| convert(converter, shape, &ConversionSource::entity(entity), method))
        .collect()
}

/// Returns the converter that produces `shape`.
#[must_use]
pub fn converter_for(
    shape: BeanShape,
    server_name: &str,
    service_name: &str,
) -> Box<dyn BeanConverter> {
    match shape {
        BeanShape::GlossaryTerm => Box::new(GlossaryTermConverter::new(server_name, service_name)),
        BeanShape::Rating => Box::new(RatingConverter::new(server_name, service_name)),
        BeanShape::MetadataCorrelation => {
            Box::new(MetadataCorrelationConverter::new(server_name, service_name))
        },
        BeanShape::ControlFlow => Box::new(ControlFlowConverter::new(server_name, service_name)),
        BeanShape::ProcessHierarchy => {
            Box::new(ProcessHierarchyConverter::new(server_name, service_name))
        },
        BeanShape::Port => Box::new(PortConverter::new(server_name, service_name)),
        BeanShape::SchemaAttribute => {
            Box::new(SchemaAttributeConverter::new(server_name, service_name))
        },
        BeanShape::EngineAction => Box::new(EngineActionConverter::new(server_name, service_name)),
        BeanShape::GovernanceEngine => {
            Box::new(GovernanceEngineConverter::new(server_name, service_name))
        },
        BeanShape::GovernanceService => {
            Box::new(GovernanceServiceConverter::new(server_name, service_name))
        },
        BeanShape::RegisteredGovernanceService => Box::new(
            RegisteredGovernanceServiceConverter::new(server_name, service_name),
        ),
        BeanShape::RelatedElement => {
            Box::new(RelatedElementConverter::new(server_name, service_name))
        },
    }
}
