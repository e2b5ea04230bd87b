//! Helpers shared by every converter.

use crate::models::property_names::{ADDITIONAL_PROPERTIES, QUALIFIED_NAME};
use crate::models::{
    BeanShape, Classification, ElementClassification, ElementHeader, ElementOrigin, ElementStub,
    ElementType, ElementVersions, EntityDetail, EntityProxy, Guid, InstanceAuditHeader,
    InstanceType, PropertyDrain, RelatedElement, Relationship, TypeDefCategory, type_registry,
};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Header extraction, stub building and error construction for converters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterBase {
    server_name: String,
    service_name: String,
}

impl ConverterBase {
    /// Creates the helpers for a server and calling service.
    #[must_use]
    pub fn new(server_name: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            service_name: service_name.into(),
        }
    }

    /// Server recorded as the source of every header.
    #[must_use]
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Service the converter works for.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Copies type information.
    #[must_use]
    pub fn element_type(instance_type: &InstanceType) -> ElementType {
        ElementType {
            type_id: instance_type.type_def_guid.clone(),
            type_name: instance_type.type_def_name.clone(),
            super_type_names: instance_type.super_type_names.clone(),
        }
    }

    /// Builds an element header from an instance's audit header.
    #[must_use]
    pub fn element_header(
        &self,
        guid: &Guid,
        header: &InstanceAuditHeader,
        classifications: &[Classification],
    ) -> ElementHeader {
        ElementHeader {
            guid: guid.clone(),
            element_type: Self::element_type(&header.instance_type),
            origin: ElementOrigin {
                source_server: self.server_name.clone(),
                origin_category: header.instance_provenance.into(),
                home_metadata_collection_id: header.metadata_collection_id.clone(),
                home_metadata_collection_name: header.metadata_collection_name.clone(),
            },
            versions: ElementVersions {
                created_by: header.created_by.clone(),
                updated_by: header.updated_by.clone(),
                create_time: header.create_time,
                update_time: header.update_time,
                version: header.version,
            },
            status: header.status.into(),
            classifications: classifications
                .iter()
                .map(|c| ElementClassification {
                    classification_name: c.name.clone(),
                    classification_properties: c.properties.to_json_map(),
                    origin_guid: c.origin_guid.clone(),
                })
                .collect(),
        }
    }

    /// Header for an entity, classifications included.
    #[must_use]
    pub fn entity_header(&self, entity: &EntityDetail) -> ElementHeader {
        self.element_header(&entity.guid, &entity.header, &entity.classifications)
    }

    /// Header for a relationship.
    #[must_use]
    pub fn relationship_header(&self, relationship: &Relationship) -> ElementHeader {
        self.element_header(&relationship.guid, &relationship.header, &[])
    }

    /// Stub for one end of a relationship.
    #[must_use]
    pub fn element_stub(proxy: &EntityProxy) -> ElementStub {
        ElementStub {
            guid: proxy.guid.clone(),
            element_type: Self::element_type(&proxy.instance_type),
            unique_name: proxy
                .unique_properties
                .get_str(QUALIFIED_NAME)
                .map(str::to_string),
        }
    }

    /// Returns the primary entity or a missing-instance error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingInstance`] when no entity was supplied.
    pub fn require_entity<'a>(
        entity: Option<&'a EntityDetail>,
        expected_type: &str,
        method: &str,
    ) -> Result<&'a EntityDetail> {
        entity.ok_or_else(|| Self::missing(TypeDefCategory::Entity, expected_type, method))
    }

    /// Returns the first relationship of a type (is-a) or a missing-instance error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingInstance`] when no such relationship was supplied.
    pub fn require_relationship<'a>(
        relationships: &'a [Relationship],
        expected_type: &str,
        method: &str,
    ) -> Result<&'a Relationship> {
        Self::select_relationships(relationships, expected_type)
            .next()
            .ok_or_else(|| Self::missing(TypeDefCategory::Relationship, expected_type, method))
    }

    /// Relationships whose type is `type_name` or one of its subtypes.
    pub fn select_relationships<'a, 'b>(
        relationships: &'a [Relationship],
        type_name: &'b str,
    ) -> impl Iterator<Item = &'a Relationship> + use<'a, 'b> {
        relationships
            .iter()
            .filter(move |r| type_registry().is_type_of(r.type_name(), type_name))
    }

    /// Builds a [`Error::MissingInstance`].
    #[must_use]
    pub fn missing(category: TypeDefCategory, expected_type: &str, method: &str) -> Error {
        Error::MissingInstance {
            category,
            expected_type: expected_type.to_string(),
            method: method.to_string(),
        }
    }

    /// Builds a [`Error::InvalidBeanClass`].
    #[must_use]
    pub fn invalid_bean(shape: BeanShape, converter: &str, method: &str) -> Error {
        Error::InvalidBeanClass {
            shape: shape.to_string(),
            converter: converter.to_string(),
            method: method.to_string(),
        }
    }

    /// Drains the caller-supplied additional properties.
    pub fn take_additional_properties(drain: &mut PropertyDrain) -> BTreeMap<String, String> {
        drain
            .take_string_map(ADDITIONAL_PROPERTIES)
            .unwrap_or_default()
    }

    /// Describes a relationship as seen from `starting_guid`.
    ///
    /// The related element is the other end. Without a starting point, or
    /// when the starting point is not an end, end two is reported.
    #[must_use]
    pub fn related_element(
        &self,
        relationship: &Relationship,
        starting_guid: Option<&Guid>,
    ) -> RelatedElement {
        let related = starting_guid
            .and_then(|guid| relationship.other_end(guid))
            .unwrap_or(&relationship.end_two);

        RelatedElement {
            relationship_header: self.relationship_header(relationship),
            relationship_properties: relationship.properties.to_json_map(),
            related_element: Self::element_stub(related),
        }
    }
}
