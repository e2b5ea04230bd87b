//! Glossary term converter.

use super::{BeanConverter, ConversionSource, ConverterBase};
use crate::Result;
use crate::models::property_names::{
    ABBREVIATION, DESCRIPTION, DISPLAY_NAME, EXAMPLES, QUALIFIED_NAME, SUMMARY, USAGE,
};
use crate::models::{Bean, BeanShape, GlossaryTermProperties, PropertyDrain};

/// Builds [`GlossaryTermElement`](crate::models::GlossaryTermElement) beans.
#[derive(Debug, Clone)]
pub struct GlossaryTermConverter {
    base: ConverterBase,
}

impl GlossaryTermConverter {
    /// Creates a converter.
    #[must_use]
    pub fn new(server_name: &str, service_name: &str) -> Self {
        Self {
            base: ConverterBase::new(server_name, service_name),
        }
    }
}

impl BeanConverter for GlossaryTermConverter {
    fn converter_name(&self) -> &'static str {
        "GlossaryTermConverter"
    }

    fn target_shape(&self) -> BeanShape {
        BeanShape::GlossaryTerm
    }

    fn populate(
        &self,
        bean: &mut Bean,
        source: &ConversionSource<'_>,
        method: &str,
    ) -> Result<()> {
        let shape = bean.shape();
        let Bean::GlossaryTerm(term) = bean else {
            return Err(ConverterBase::invalid_bean(shape, self.converter_name(), method));
        };
        let entity = ConverterBase::require_entity(source.entity, "GlossaryTerm", method)?;

        let mut drain = PropertyDrain::from_ref(&entity.properties);
        let mut properties = GlossaryTermProperties {
            qualified_name: drain.take_string(QUALIFIED_NAME),
            display_name: drain.take_string(DISPLAY_NAME),
            summary: drain.take_string(SUMMARY),
            description: drain.take_string(DESCRIPTION),
            examples: drain.take_string(EXAMPLES),
            abbreviation: drain.take_string(ABBREVIATION),
            usage: drain.take_string(USAGE),
            additional_properties: ConverterBase::take_additional_properties(&mut drain),
            type_name: Some(entity.type_name().to_string()),
            ..GlossaryTermProperties::default()
        };
        properties.extended_properties = drain.into_extended();

        term.element_header = self.base.entity_header(entity);
        term.glossary_term_properties = Some(properties);
        Ok(())
    }
}
