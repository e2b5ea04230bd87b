//! Governance engine, service, registration and engine action converters.

use super::{BeanConverter, ConversionSource, ConverterBase};
use crate::Result;
use crate::models::property_names::{
    ACTION_STATUS, ACTION_TARGET_NAME, COMPLETION_GUARDS, COMPLETION_MESSAGE, COMPLETION_TIME,
    CONNECTOR_PROVIDER_NAME, DESCRIPTION, DISPLAY_NAME, DOMAIN_IDENTIFIER, EXECUTOR_ENGINE_GUID,
    EXECUTOR_ENGINE_NAME, PROCESSING_ENGINE_USER_ID, QUALIFIED_NAME, REQUEST_PARAMETERS,
    REQUEST_TYPE, REQUESTED_TIME, SERVICE_REQUEST_TYPE, START_TIME, VERSION_IDENTIFIER,
};
use crate::models::{
    ActionTargetElement, Bean, BeanShape, EngineActionProperties, EngineActionStatus,
    EntityDetail, GovernanceEngineProperties, GovernanceServiceProperties, OrdinalEnum,
    PropertyDrain, RegisteredServiceProperties,
};

fn take_action_status(drain: &mut PropertyDrain) -> EngineActionStatus {
    drain
        .take_enum_ordinal(ACTION_STATUS)
        .map_or_else(EngineActionStatus::default, EngineActionStatus::from_ordinal)
}

/// Drains the properties of a governance service entity.
pub(crate) fn governance_service_properties(entity: &EntityDetail) -> GovernanceServiceProperties {
    let mut drain = PropertyDrain::from_ref(&entity.properties);
    let mut properties = GovernanceServiceProperties {
        qualified_name: drain.take_string(QUALIFIED_NAME),
        display_name: drain.take_string(DISPLAY_NAME),
        description: drain.take_string(DESCRIPTION),
        version_identifier: drain.take_string(VERSION_IDENTIFIER),
        connector_provider_name: drain.take_string(CONNECTOR_PROVIDER_NAME),
        additional_properties: ConverterBase::take_additional_properties(&mut drain),
        type_name: Some(entity.type_name().to_string()),
        ..GovernanceServiceProperties::default()
    };
    properties.extended_properties = drain.into_extended();
    properties
}

/// Builds [`GovernanceEngineElement`](crate::models::GovernanceEngineElement) beans.
#[derive(Debug, Clone)]
pub struct GovernanceEngineConverter {
    base: ConverterBase,
}

impl GovernanceEngineConverter {
    /// Creates a converter.
    #[must_use]
    pub fn new(server_name: &str, service_name: &str) -> Self {
        Self {
            base: ConverterBase::new(server_name, service_name),
        }
    }
}

impl BeanConverter for GovernanceEngineConverter {
    fn converter_name(&self) -> &'static str {
        "GovernanceEngineConverter"
    }

    fn target_shape(&self) -> BeanShape {
        BeanShape::GovernanceEngine
    }

    fn populate(
        &self,
        bean: &mut Bean,
        source: &ConversionSource<'_>,
        method: &str,
    ) -> Result<()> {
        let shape = bean.shape();
        let Bean::GovernanceEngine(engine) = bean else {
            return Err(ConverterBase::invalid_bean(shape, self.converter_name(), method));
        };
        let entity = ConverterBase::require_entity(source.entity, "GovernanceEngine", method)?;

        let mut drain = PropertyDrain::from_ref(&entity.properties);
        let mut properties = GovernanceEngineProperties {
            qualified_name: drain.take_string(QUALIFIED_NAME),
            display_name: drain.take_string(DISPLAY_NAME),
            description: drain.take_string(DESCRIPTION),
            version_identifier: drain.take_string(VERSION_IDENTIFIER),
            additional_properties: ConverterBase::take_additional_properties(&mut drain),
            type_name: Some(entity.type_name().to_string()),
            ..GovernanceEngineProperties::default()
        };
        properties.extended_properties = drain.into_extended();

        engine.element_header = self.base.entity_header(entity);
        engine.properties = Some(properties);
        Ok(())
    }
}

/// Builds [`GovernanceServiceElement`](crate::models::GovernanceServiceElement) beans.
#[derive(Debug, Clone)]
pub struct GovernanceServiceConverter {
    base: ConverterBase,
}

impl GovernanceServiceConverter {
    /// Creates a converter.
    #[must_use]
    pub fn new(server_name: &str, service_name: &str) -> Self {
        Self {
            base: ConverterBase::new(server_name, service_name),
        }
    }
}

impl BeanConverter for GovernanceServiceConverter {
    fn converter_name(&self) -> &'static str {
        "GovernanceServiceConverter"
    }

    fn target_shape(&self) -> BeanShape {
        BeanShape::GovernanceService
    }

    fn populate(
        &self,
        bean: &mut Bean,
        source: &ConversionSource<'_>,
        method: &str,
    ) -> Result<()> {
        let shape = bean.shape();
        let Bean::GovernanceService(service) = bean else {
            return Err(ConverterBase::invalid_bean(shape, self.converter_name(), method));
        };
        let entity = ConverterBase::require_entity(source.entity, "GovernanceService", method)?;

        service.element_header = self.base.entity_header(entity);
        service.properties = Some(governance_service_properties(entity));
        Ok(())
    }
}

/// Builds [`RegisteredGovernanceServiceElement`](crate::models::RegisteredGovernanceServiceElement)
/// beans from a `SupportedGovernanceService` relationship.
///
/// End one is the engine, end two the service. When the service entity is
/// supplied as the primary entity its properties are included.
#[derive(Debug, Clone)]
pub struct RegisteredGovernanceServiceConverter {
    base: ConverterBase,
}

impl RegisteredGovernanceServiceConverter {
    /// Creates a converter.
    #[must_use]
    pub fn new(server_name: &str, service_name: &str) -> Self {
        Self {
            base: ConverterBase::new(server_name, service_name),
        }
    }
}

impl BeanConverter for RegisteredGovernanceServiceConverter {
    fn converter_name(&self) -> &'static str {
        "RegisteredGovernanceServiceConverter"
    }

    fn target_shape(&self) -> BeanShape {
        BeanShape::RegisteredGovernanceService
    }

    fn populate(
        &self,
        bean: &mut Bean,
        source: &ConversionSource<'_>,
        method: &str,
    ) -> Result<()> {
        let shape = bean.shape();
        let Bean::RegisteredGovernanceService(registration) = bean else {
            return Err(ConverterBase::invalid_bean(shape, self.converter_name(), method));
        };
        let relationship = ConverterBase::require_relationship(
            source.relationships,
            "SupportedGovernanceService",
            method,
        )?;

        let mut drain = PropertyDrain::from_ref(&relationship.properties);
        let mut properties = RegisteredServiceProperties {
            request_type: drain.take_string(REQUEST_TYPE).unwrap_or_default(),
            service_request_type: drain.take_string(SERVICE_REQUEST_TYPE),
            request_parameters: drain.take_string_map(REQUEST_PARAMETERS).unwrap_or_default(),
            ..RegisteredServiceProperties::default()
        };
        properties.extended_properties = drain.into_extended();

        registration.registration_header = self.base.relationship_header(relationship);
        registration.engine = ConverterBase::element_stub(&relationship.end_one);
        registration.service = ConverterBase::element_stub(&relationship.end_two);
        registration.properties = Some(properties);
        registration.service_properties = source
            .entity
            .filter(|entity| entity.guid == relationship.end_two.guid)
            .map(governance_service_properties);
        Ok(())
    }
}

/// Builds [`EngineActionElement`](crate::models::EngineActionElement) beans.
///
/// `TargetForAction` relationships from the action (end one) become action
/// targets (end two).
#[derive(Debug, Clone)]
pub struct EngineActionConverter {
    base: ConverterBase,
}

impl EngineActionConverter {
    /// Creates a converter.
    #[must_use]
    pub fn new(server_name: &str, service_name: &str) -> Self {
        Self {
            base: ConverterBase::new(server_name, service_name),
        }
    }
}

impl BeanConverter for EngineActionConverter {
    fn converter_name(&self) -> &'static str {
        "EngineActionConverter"
    }

    fn target_shape(&self) -> BeanShape {
        BeanShape::EngineAction
    }

    fn populate(
        &self,
        bean: &mut Bean,
        source: &ConversionSource<'_>,
        method: &str,
    ) -> Result<()> {
        let shape = bean.shape();
        let Bean::EngineAction(action) = bean else {
            return Err(ConverterBase::invalid_bean(shape, self.converter_name(), method));
        };
        let entity = ConverterBase::require_entity(source.entity, "EngineAction", method)?;

        let mut drain = PropertyDrain::from_ref(&entity.properties);
        let mut properties = EngineActionProperties {
            qualified_name: drain.take_string(QUALIFIED_NAME),
            domain_identifier: drain.take_int(DOMAIN_IDENTIFIER).unwrap_or_default(),
            display_name: drain.take_string(DISPLAY_NAME),
            description: drain.take_string(DESCRIPTION),
            request_type: drain.take_string(REQUEST_TYPE),
            request_parameters: drain.take_string_map(REQUEST_PARAMETERS).unwrap_or_default(),
            action_status: take_action_status(&mut drain),
            processing_engine_user_id: drain.take_string(PROCESSING_ENGINE_USER_ID),
            requested_time: drain.take_date(REQUESTED_TIME),
            start_time: drain.take_date(START_TIME),
            completion_time: drain.take_date(COMPLETION_TIME),
            completion_guards: drain.take_string_array(COMPLETION_GUARDS).unwrap_or_default(),
            completion_message: drain.take_string(COMPLETION_MESSAGE),
            executor_engine_guid: drain.take_string(EXECUTOR_ENGINE_GUID),
            executor_engine_name: drain.take_string(EXECUTOR_ENGINE_NAME),
            ..EngineActionProperties::default()
        };
        properties.extended_properties = drain.into_extended();

        action.element_header = self.base.entity_header(entity);
        action.properties = Some(properties);
        action.action_targets =
            ConverterBase::select_relationships(source.relationships, "TargetForAction")
                .filter(|r| r.end_one.guid == entity.guid)
                .map(|r| {
                    let mut target_drain = PropertyDrain::from_ref(&r.properties);
                    ActionTargetElement {
                        relationship_guid: r.guid.to_string(),
                        action_target_name: target_drain.take_string(ACTION_TARGET_NAME),
                        status: take_action_status(&mut target_drain),
                        completion_message: target_drain.take_string(COMPLETION_MESSAGE),
                        target_element: ConverterBase::element_stub(&r.end_two),
                    }
                })
                .collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::property_names::properties_for;
    use crate::models::{InstanceProperties, Relationship};
    use crate::services::converters::convert;
    use chrono::Utc;

    #[test]
    fn test_engine_action() {
        let now = Utc::now();
        let action = EntityDetail::new(
            "EngineAction",
            InstanceProperties::new()
                .with_string(QUALIFIED_NAME, "action::1")
                .with_string(REQUEST_TYPE, "survey-asset")
                .with_enum(ACTION_STATUS, 4, "IN_PROGRESS")
                .with_date(START_TIME, now)
                .with_string_array(COMPLETION_GUARDS, ["survey-completed"])
                .with_string_map(REQUEST_PARAMETERS, [("depth", "2")]),
        );
        let asset = EntityDetail::new("Asset", InstanceProperties::new());
        let target = Relationship::new(
            "TargetForAction",
            action.proxy(),
            asset.proxy(),
            InstanceProperties::new()
                .with_string(ACTION_TARGET_NAME, "assetToSurvey")
                .with_enum(ACTION_STATUS, 10, "ACTIONED"),
        );
        let relationships = [target];

        let converter = EngineActionConverter::new("server1", "engine-host");
        let bean = convert(
            &converter,
            BeanShape::EngineAction,
            &ConversionSource::entity(&action).with_relationships(&relationships),
            "getEngineAction",
        )
        .unwrap();

        let Bean::EngineAction(element) = bean else {
            panic!("expected engine action bean");
        };
        let props = element.properties.unwrap();
        assert_eq!(props.action_status, EngineActionStatus::InProgress);
        assert_eq!(props.start_time, Some(now));
        assert_eq!(props.completion_guards, vec!["survey-completed"]);
        assert_eq!(props.request_parameters["depth"], "2");
        assert!(props.extended_properties.is_empty());

        assert_eq!(element.action_targets.len(), 1);
        let target = &element.action_targets[0];
        assert_eq!(target.action_target_name.as_deref(), Some("assetToSurvey"));
        assert_eq!(target.status, EngineActionStatus::Actioned);
        assert_eq!(target.target_element.guid, asset.guid);
    }

    #[test]
    fn test_registered_service_includes_service_properties() {
        let engine = EntityDetail::new(
            "SurveyActionEngine",
            InstanceProperties::new().with_string(QUALIFIED_NAME, "engine::survey"),
        );
        let service = EntityDetail::new(
            "SurveyActionService",
            InstanceProperties::new()
                .with_string(QUALIFIED_NAME, "service::census")
                .with_string(CONNECTOR_PROVIDER_NAME, "property-census"),
        );
        let registration = Relationship::new(
            "SupportedGovernanceService",
            engine.proxy(),
            service.proxy(),
            InstanceProperties::new()
                .with_string(REQUEST_TYPE, "census")
                .with_string(SERVICE_REQUEST_TYPE, "census-full")
                .with_string_map(REQUEST_PARAMETERS, [("sample", "10")]),
        );

        let converter = RegisteredGovernanceServiceConverter::new("server1", "config");
        let bean = convert(
            &converter,
            BeanShape::RegisteredGovernanceService,
            &ConversionSource::relationship(&registration),
            "getRegisteredService",
        )
        .unwrap();
        let Bean::RegisteredGovernanceService(element) = bean else {
            panic!("expected registration bean");
        };
        assert_eq!(element.engine.guid, engine.guid);
        assert_eq!(element.service.guid, service.guid);
        let props = element.properties.unwrap();
        assert_eq!(props.request_type, "census");
        assert_eq!(props.service_request_type.as_deref(), Some("census-full"));
        assert!(element.service_properties.is_none());

        let relationships = [registration];
        let bean = convert(
            &converter,
            BeanShape::RegisteredGovernanceService,
            &ConversionSource::entity(&service).with_relationships(&relationships),
            "getRegisteredService",
        )
        .unwrap();
        let Bean::RegisteredGovernanceService(element) = bean else {
            panic!("expected registration bean");
        };
        let service_props = element.service_properties.unwrap();
        assert_eq!(
            service_props.connector_provider_name.as_deref(),
            Some("property-census")
        );
    }

    #[test]
    fn test_governance_engine_claims_listed_properties() {
        let mut properties = InstanceProperties::new();
        for key in properties_for("GovernanceEngine").unwrap() {
            properties = properties.with_string(key, "value");
        }
        let entity = EntityDetail::new("GovernanceActionEngine", properties);
        let converter = GovernanceEngineConverter::new("server1", "config");
        let bean = convert(
            &converter,
            BeanShape::GovernanceEngine,
            &ConversionSource::entity(&entity),
            "getGovernanceEngine",
        )
        .unwrap();
        let Bean::GovernanceEngine(element) = bean else {
            panic!("expected engine bean");
        };
        let props = element.properties.unwrap();
        assert_eq!(props.type_name.as_deref(), Some("GovernanceActionEngine"));
        assert!(props.extended_properties.is_empty());
    }
}
