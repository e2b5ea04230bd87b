//! Generic relationship view converter.

use super::{BeanConverter, ConversionSource, ConverterBase};
use crate::Result;
use crate::models::{Bean, BeanShape, TypeDefCategory};

/// Builds [`RelatedElement`](crate::models::RelatedElement) beans from the
/// first supplied relationship, viewed from the source's starting GUID.
#[derive(Debug, Clone)]
pub struct RelatedElementConverter {
    base: ConverterBase,
}

impl RelatedElementConverter {
    /// Creates a converter.
    #[must_use]
    pub fn new(server_name: &str, service_name: &str) -> Self {
        Self {
            base: ConverterBase::new(server_name, service_name),
        }
    }
}

impl BeanConverter for RelatedElementConverter {
    fn converter_name(&self) -> &'static str {
        "RelatedElementConverter"
    }

    fn target_shape(&self) -> BeanShape {
        BeanShape::RelatedElement
    }

    fn populate(
        &self,
        bean: &mut Bean,
        source: &ConversionSource<'_>,
        method: &str,
    ) -> Result<()> {
        let shape = bean.shape();
        let Bean::RelatedElement(related) = bean else {
            return Err(ConverterBase::invalid_bean(shape, self.converter_name(), method));
        };
        let relationship = source.relationships.first().ok_or_else(|| {
            ConverterBase::missing(TypeDefCategory::Relationship, "Relationship", method)
        })?;

        *related = self.base.related_element(relationship, source.starting_guid);
        Ok(())
    }
}
