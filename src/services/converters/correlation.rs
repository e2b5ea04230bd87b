//! External identifier correlation converter.

use super::{BeanConverter, ConversionSource, ConverterBase};
use crate::Result;
use crate::models::property_names::{
    DESCRIPTION, EXTERNAL_INSTANCE_CREATED_BY, EXTERNAL_INSTANCE_CREATION_TIME,
    EXTERNAL_INSTANCE_LAST_UPDATE_TIME, EXTERNAL_INSTANCE_LAST_UPDATED_BY,
    EXTERNAL_INSTANCE_VERSION, IDENTIFIER, KEY_PATTERN, LAST_SYNCHRONIZED, MAPPING_PROPERTIES,
    PERMITTED_SYNCHRONIZATION, QUALIFIED_NAME, SOURCE, USAGE,
};
use crate::models::{
    Bean, BeanShape, KeyPattern, MetadataCorrelationProperties, OrdinalEnum, PropertyDrain,
    SynchronizationDirection,
};

/// Builds [`MetadataCorrelationElement`](crate::models::MetadataCorrelationElement)
/// beans from an `ExternalId` entity and its relationships.
///
/// | Relationship | End one | End two |
/// |--------------|---------|---------|
/// | `ExternalIdScope` | asset manager | external id |
/// | `ExternalIdLink` | correlated element | external id |
#[derive(Debug, Clone)]
pub struct MetadataCorrelationConverter {
    base: ConverterBase,
}

impl MetadataCorrelationConverter {
    /// Creates a converter.
    #[must_use]
    pub fn new(server_name: &str, service_name: &str) -> Self {
        Self {
            base: ConverterBase::new(server_name, service_name),
        }
    }
}

impl BeanConverter for MetadataCorrelationConverter {
    fn converter_name(&self) -> &'static str {
        "MetadataCorrelationConverter"
    }

    fn target_shape(&self) -> BeanShape {
        BeanShape::MetadataCorrelation
    }

    fn populate(
        &self,
        bean: &mut Bean,
        source: &ConversionSource<'_>,
        method: &str,
    ) -> Result<()> {
        let shape = bean.shape();
        let Bean::MetadataCorrelation(correlation) = bean else {
            return Err(ConverterBase::invalid_bean(shape, self.converter_name(), method));
        };
        let entity = ConverterBase::require_entity(source.entity, "ExternalId", method)?;

        let mut drain = PropertyDrain::from_ref(&entity.properties);
        let mut properties = MetadataCorrelationProperties {
            external_identifier: drain.take_string(IDENTIFIER),
            key_pattern: drain
                .take_enum_ordinal(KEY_PATTERN)
                .map_or_else(KeyPattern::default, KeyPattern::from_ordinal),
            external_instance_created_by: drain.take_string(EXTERNAL_INSTANCE_CREATED_BY),
            external_instance_creation_time: drain.take_date(EXTERNAL_INSTANCE_CREATION_TIME),
            external_instance_last_updated_by: drain
                .take_string(EXTERNAL_INSTANCE_LAST_UPDATED_BY),
            external_instance_last_update_time: drain
                .take_date(EXTERNAL_INSTANCE_LAST_UPDATE_TIME),
            external_instance_version: drain.take_long(EXTERNAL_INSTANCE_VERSION),
            mapping_properties: drain.take_string_map(MAPPING_PROPERTIES).unwrap_or_default(),
            ..MetadataCorrelationProperties::default()
        };
        properties.extended_properties = drain.into_extended();

        if let Some(scope) =
            ConverterBase::select_relationships(source.relationships, "ExternalIdScope")
                .find(|r| r.end_two.guid == entity.guid)
        {
            let mut scope_drain = PropertyDrain::from_ref(&scope.properties);
            properties.asset_manager_guid = Some(scope.end_one.guid.to_string());
            properties.asset_manager_name = scope
                .end_one
                .unique_properties
                .get_str(QUALIFIED_NAME)
                .map(str::to_string);
            properties.synchronization_direction = scope_drain
                .take_enum_ordinal(PERMITTED_SYNCHRONIZATION)
                .map_or_else(
                    SynchronizationDirection::default,
                    SynchronizationDirection::from_ordinal,
                );
            properties.synchronization_description = scope_drain.take_string(DESCRIPTION);
        }

        let links: Vec<_> =
            ConverterBase::select_relationships(source.relationships, "ExternalIdLink")
                .filter(|r| r.end_two.guid == entity.guid)
                .collect();

        // Link properties describe how this identifier maps to the element;
        // the first link carries them.
        if let Some(link) = links.first() {
            let mut link_drain = PropertyDrain::from_ref(&link.properties);
            properties.link_description = link_drain.take_string(DESCRIPTION);
            properties.external_identifier_usage = link_drain.take_string(USAGE);
            properties.external_identifier_source = link_drain.take_string(SOURCE);
            properties.last_synchronized = link_drain.take_date(LAST_SYNCHRONIZED);
        }

        correlation.element_header = self.base.entity_header(entity);
        correlation.correlated_elements = links
            .iter()
            .map(|link| ConverterBase::element_stub(&link.end_one))
            .collect();
        correlation.correlation_properties = Some(properties);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        EntityDetail, InstanceProperties, MetadataCorrelationElement, Relationship,
    };
    use crate::services::converters::convert;

    fn correlation(bean: Bean) -> MetadataCorrelationElement {
        match bean {
            Bean::MetadataCorrelation(c) => c,
            other => panic!("unexpected bean {other:?}"),
        }
    }

    #[test]
    fn test_correlation_reads_both_ends() {
        let manager = EntityDetail::new(
            "AssetManager",
            InstanceProperties::new().with_string(QUALIFIED_NAME, "catalog::hms"),
        );
        let table = EntityDetail::new(
            "Asset",
            InstanceProperties::new().with_string(QUALIFIED_NAME, "table::orders"),
        );
        let external_id = EntityDetail::new(
            "ExternalId",
            InstanceProperties::new()
                .with_string(IDENTIFIER, "hms-1234")
                .with_enum(KEY_PATTERN, 0, "LOCAL_KEY")
                .with_long(EXTERNAL_INSTANCE_VERSION, 7)
                .with_string_map(MAPPING_PROPERTIES, [("db", "sales")]),
        );
        let scope = Relationship::new(
            "ExternalIdScope",
            manager.proxy(),
            external_id.proxy(),
            InstanceProperties::new()
                .with_enum(PERMITTED_SYNCHRONIZATION, 1, "TO_THIRD_PARTY")
                .with_string(DESCRIPTION, "one way"),
        );
        let link = Relationship::new(
            "ExternalIdLink",
            table.proxy(),
            external_id.proxy(),
            InstanceProperties::new()
                .with_string(USAGE, "primary key")
                .with_string(SOURCE, "hms"),
        );

        let relationships = [scope, link];
        let converter = MetadataCorrelationConverter::new("server1", "asset-manager");
        let bean = convert(
            &converter,
            BeanShape::MetadataCorrelation,
            &ConversionSource::entity(&external_id).with_relationships(&relationships),
            "getCorrelations",
        )
        .unwrap();

        let correlation = correlation(bean);
        let props = correlation.correlation_properties.unwrap();
        assert_eq!(props.external_identifier.as_deref(), Some("hms-1234"));
        assert_eq!(props.key_pattern, KeyPattern::LocalKey);
        assert_eq!(props.external_instance_version, Some(7));
        assert_eq!(props.mapping_properties["db"], "sales");
        assert_eq!(props.asset_manager_guid.as_deref(), Some(manager.guid.as_str()));
        assert_eq!(props.asset_manager_name.as_deref(), Some("catalog::hms"));
        assert_eq!(
            props.synchronization_direction,
            SynchronizationDirection::from_ordinal(1)
        );
        assert_eq!(props.synchronization_description.as_deref(), Some("one way"));
        assert_eq!(props.external_identifier_usage.as_deref(), Some("primary key"));
        assert_eq!(props.external_identifier_source.as_deref(), Some("hms"));
        assert!(props.extended_properties.is_empty());

        assert_eq!(correlation.correlated_elements.len(), 1);
        assert_eq!(correlation.correlated_elements[0].guid, table.guid);
    }
}
