//! Schema attribute converter.

use super::{BeanConverter, ConversionSource, ConverterBase};
use crate::Result;
use crate::models::property_names::{
    ALIASES, ALLOWS_DUPLICATE_VALUES, DEFAULT_VALUE_OVERRIDE, DESCRIPTION, DISPLAY_NAME,
    IS_NULLABLE, LENGTH, MAX_CARDINALITY, MIN_CARDINALITY, MINIMUM_LENGTH, NATIVE_CLASS,
    ORDERED_VALUES, POSITION, PRECISION, QUALIFIED_NAME, SORT_ORDER,
};
use crate::models::{
    Bean, BeanShape, DataItemSortOrder, OrdinalEnum, PropertyDrain, SchemaAttributeProperties,
};

/// Builds [`SchemaAttributeElement`](crate::models::SchemaAttributeElement) beans.
///
/// Missing cardinality and length fields default to zero; a missing
/// `isNullable` defaults to `true`.
#[derive(Debug, Clone)]
pub struct SchemaAttributeConverter {
    base: ConverterBase,
}

impl SchemaAttributeConverter {
    /// Creates a converter.
    #[must_use]
    pub fn new(server_name: &str, service_name: &str) -> Self {
        Self {
            base: ConverterBase::new(server_name, service_name),
        }
    }
}

impl BeanConverter for SchemaAttributeConverter {
    fn converter_name(&self) -> &'static str {
        "SchemaAttributeConverter"
    }

    fn target_shape(&self) -> BeanShape {
        BeanShape::SchemaAttribute
    }

    fn populate(
        &self,
        bean: &mut Bean,
        source: &ConversionSource<'_>,
        method: &str,
    ) -> Result<()> {
        let shape = bean.shape();
        let Bean::SchemaAttribute(attribute) = bean else {
            return Err(ConverterBase::invalid_bean(shape, self.converter_name(), method));
        };
        let entity = ConverterBase::require_entity(source.entity, "SchemaAttribute", method)?;

        let mut drain = PropertyDrain::from_ref(&entity.properties);
        let mut properties = SchemaAttributeProperties {
            qualified_name: drain.take_string(QUALIFIED_NAME),
            display_name: drain.take_string(DISPLAY_NAME),
            description: drain.take_string(DESCRIPTION),
            element_position: drain.take_int(POSITION).unwrap_or_default(),
            min_cardinality: drain.take_int(MIN_CARDINALITY).unwrap_or_default(),
            max_cardinality: drain.take_int(MAX_CARDINALITY).unwrap_or_default(),
            allows_duplicate_values: drain.take_flag(ALLOWS_DUPLICATE_VALUES),
            ordered_values: drain.take_flag(ORDERED_VALUES),
            sort_order: drain
                .take_enum_ordinal(SORT_ORDER)
                .map_or(DataItemSortOrder::FALLBACK, DataItemSortOrder::from_ordinal),
            default_value_override: drain.take_string(DEFAULT_VALUE_OVERRIDE),
            minimum_length: drain.take_int(MINIMUM_LENGTH).unwrap_or_default(),
            length: drain.take_int(LENGTH).unwrap_or_default(),
            precision: drain.take_int(PRECISION).unwrap_or_default(),
            is_nullable: drain.take_bool(IS_NULLABLE).unwrap_or(true),
            native_class: drain.take_string(NATIVE_CLASS),
            aliases: drain.take_string_array(ALIASES).unwrap_or_default(),
            additional_properties: ConverterBase::take_additional_properties(&mut drain),
            type_name: Some(entity.type_name().to_string()),
            ..SchemaAttributeProperties::default()
        };
        properties.extended_properties = drain.into_extended();

        attribute.element_header = self.base.entity_header(entity);
        attribute.properties = Some(properties);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityDetail, InstanceProperties, SchemaAttributeElement};
    use crate::services::converters::convert;

    fn convert_attribute(properties: InstanceProperties) -> SchemaAttributeElement {
        let entity = EntityDetail::new("SchemaAttribute", properties);
        let converter = SchemaAttributeConverter::new("server1", "data-manager");
        match convert(
            &converter,
            BeanShape::SchemaAttribute,
            &ConversionSource::entity(&entity),
            "getSchemaAttribute",
        )
        .unwrap()
        {
            Bean::SchemaAttribute(attribute) => attribute,
            other => panic!("unexpected bean {other:?}"),
        }
    }

    #[test]
    fn test_schema_attribute_fields() {
        let attribute = convert_attribute(
            InstanceProperties::new()
                .with_string(QUALIFIED_NAME, "orders.customer_id")
                .with_int(POSITION, 3)
                .with_int(MAX_CARDINALITY, 1)
                .with_enum(SORT_ORDER, 1, "DESCENDING")
                .with_bool(IS_NULLABLE, false)
                .with_int(LENGTH, 36)
                .with_string_array(ALIASES, ["cust_id", "customer"])
                .with_string("piiCategory", "identifier"),
        );
        let props = attribute.properties.unwrap();
        assert_eq!(props.element_position, 3);
        assert_eq!(props.max_cardinality, 1);
        assert_eq!(props.sort_order, DataItemSortOrder::Descending);
        assert!(!props.is_nullable);
        assert_eq!(props.length, 36);
        assert_eq!(props.aliases, vec!["cust_id", "customer"]);
        assert_eq!(props.extended_properties.len(), 1);
        assert!(props.extended_properties.contains_key("piiCategory"));
    }

    #[test]
    fn test_schema_attribute_defaults() {
        let props = convert_attribute(InstanceProperties::new()).properties.unwrap();
        assert!(props.is_nullable);
        assert_eq!(props.sort_order, DataItemSortOrder::Unsorted);
        assert_eq!(props.min_cardinality, 0);
        assert!(props.aliases.is_empty());
    }

    #[test]
    fn test_wrong_kind_is_consumed() {
        let props = convert_attribute(
            InstanceProperties::new().with_string(POSITION, "third"),
        )
        .properties
        .unwrap();
        assert_eq!(props.element_position, 0);
        assert!(!props.extended_properties.contains_key(POSITION));
    }
}
