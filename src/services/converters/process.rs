//! Process lineage converters: control flow, process hierarchy and port.

use super::{BeanConverter, ConversionSource, ConverterBase};
use crate::Result;
use crate::models::property_names::{
    CONTAINMENT_TYPE, DESCRIPTION, DISPLAY_NAME, GUARD, MANDATORY_GUARD, PORT_TYPE,
    QUALIFIED_NAME,
};
use crate::models::{
    Bean, BeanShape, ControlFlowProperties, OrdinalEnum, PortProperties, PortType,
    ProcessContainmentType, ProcessHierarchyProperties, PropertyDrain,
};

/// Builds [`ControlFlowElement`](crate::models::ControlFlowElement) beans.
///
/// End one of the `ControlFlow` relationship is the current step, end two
/// the next step.
#[derive(Debug, Clone)]
pub struct ControlFlowConverter {
    base: ConverterBase,
}

impl ControlFlowConverter {
    /// Creates a converter.
    #[must_use]
    pub fn new(server_name: &str, service_name: &str) -> Self {
        Self {
            base: ConverterBase::new(server_name, service_name),
        }
    }
}

impl BeanConverter for ControlFlowConverter {
    fn converter_name(&self) -> &'static str {
        "ControlFlowConverter"
    }

    fn target_shape(&self) -> BeanShape {
        BeanShape::ControlFlow
    }

    fn populate(
        &self,
        bean: &mut Bean,
        source: &ConversionSource<'_>,
        method: &str,
    ) -> Result<()> {
        let shape = bean.shape();
        let Bean::ControlFlow(flow) = bean else {
            return Err(ConverterBase::invalid_bean(shape, self.converter_name(), method));
        };
        let relationship =
            ConverterBase::require_relationship(source.relationships, "ControlFlow", method)?;

        let mut drain = PropertyDrain::from_ref(&relationship.properties);
        let mut properties = ControlFlowProperties {
            qualified_name: drain.take_string(QUALIFIED_NAME),
            description: drain.take_string(DESCRIPTION),
            guard: drain.take_string(GUARD),
            mandatory_guard: drain.take_flag(MANDATORY_GUARD),
            ..ControlFlowProperties::default()
        };
        properties.extended_properties = drain.into_extended();

        flow.control_flow_header = self.base.relationship_header(relationship);
        flow.current_step = ConverterBase::element_stub(&relationship.end_one);
        flow.next_step = ConverterBase::element_stub(&relationship.end_two);
        flow.properties = Some(properties);
        Ok(())
    }
}

/// Builds [`ProcessHierarchyElement`](crate::models::ProcessHierarchyElement) beans.
///
/// End one is the parent process, end two the child.
#[derive(Debug, Clone)]
pub struct ProcessHierarchyConverter {
    base: ConverterBase,
}

impl ProcessHierarchyConverter {
    /// Creates a converter.
    #[must_use]
    pub fn new(server_name: &str, service_name: &str) -> Self {
        Self {
            base: ConverterBase::new(server_name, service_name),
        }
    }
}

impl BeanConverter for ProcessHierarchyConverter {
    fn converter_name(&self) -> &'static str {
        "ProcessHierarchyConverter"
    }

    fn target_shape(&self) -> BeanShape {
        BeanShape::ProcessHierarchy
    }

    fn populate(
        &self,
        bean: &mut Bean,
        source: &ConversionSource<'_>,
        method: &str,
    ) -> Result<()> {
        let shape = bean.shape();
        let Bean::ProcessHierarchy(hierarchy) = bean else {
            return Err(ConverterBase::invalid_bean(shape, self.converter_name(), method));
        };
        let relationship =
            ConverterBase::require_relationship(source.relationships, "ProcessHierarchy", method)?;

        let mut drain = PropertyDrain::from_ref(&relationship.properties);
        let containment_type = drain
            .take_enum_ordinal(CONTAINMENT_TYPE)
            .map_or_else(ProcessContainmentType::default, ProcessContainmentType::from_ordinal);

        hierarchy.relationship_header = self.base.relationship_header(relationship);
        hierarchy.parent_process = ConverterBase::element_stub(&relationship.end_one);
        hierarchy.child_process = ConverterBase::element_stub(&relationship.end_two);
        hierarchy.properties = Some(ProcessHierarchyProperties {
            containment_type,
            extended_properties: drain.into_extended(),
        });
        Ok(())
    }
}

/// Builds [`PortElement`](crate::models::PortElement) beans.
#[derive(Debug, Clone)]
pub struct PortConverter {
    base: ConverterBase,
}

impl PortConverter {
    /// Creates a converter.
    #[must_use]
    pub fn new(server_name: &str, service_name: &str) -> Self {
        Self {
            base: ConverterBase::new(server_name, service_name),
        }
    }
}

impl BeanConverter for PortConverter {
    fn converter_name(&self) -> &'static str {
        "PortConverter"
    }

    fn target_shape(&self) -> BeanShape {
        BeanShape::Port
    }

    fn populate(
        &self,
        bean: &mut Bean,
        source: &ConversionSource<'_>,
        method: &str,
    ) -> Result<()> {
        let shape = bean.shape();
        let Bean::Port(port) = bean else {
            return Err(ConverterBase::invalid_bean(shape, self.converter_name(), method));
        };
        let entity = ConverterBase::require_entity(source.entity, "Port", method)?;

        let mut drain = PropertyDrain::from_ref(&entity.properties);
        let mut properties = PortProperties {
            qualified_name: drain.take_string(QUALIFIED_NAME),
            display_name: drain.take_string(DISPLAY_NAME),
            port_type: drain
                .take_enum_ordinal(PORT_TYPE)
                .map_or_else(PortType::default, PortType::from_ordinal),
            additional_properties: ConverterBase::take_additional_properties(&mut drain),
            type_name: Some(entity.type_name().to_string()),
            ..PortProperties::default()
        };
        properties.extended_properties = drain.into_extended();

        port.element_header = self.base.entity_header(entity);
        port.port_properties = Some(properties);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::models::{EntityDetail, InstanceProperties, Relationship};
    use crate::services::converters::convert;
    use test_case::test_case;

    fn steps() -> (EntityDetail, EntityDetail) {
        (
            EntityDetail::new(
                "Process",
                InstanceProperties::new().with_string(QUALIFIED_NAME, "step::extract"),
            ),
            EntityDetail::new(
                "Process",
                InstanceProperties::new().with_string(QUALIFIED_NAME, "step::load"),
            ),
        )
    }

    #[test]
    fn test_control_flow_ends() {
        let (extract, load) = steps();
        let hierarchy = Relationship::new(
            "ProcessHierarchy",
            extract.proxy(),
            load.proxy(),
            InstanceProperties::new(),
        );
        let flow = Relationship::new(
            "ControlFlow",
            extract.proxy(),
            load.proxy(),
            InstanceProperties::new()
                .with_string(GUARD, "extracted")
                .with_bool(MANDATORY_GUARD, true),
        );
        let relationships = [hierarchy, flow.clone()];

        let converter = ControlFlowConverter::new("server1", "lineage");
        let bean = convert(
            &converter,
            BeanShape::ControlFlow,
            &ConversionSource::empty().with_relationships(&relationships),
            "getControlFlow",
        )
        .unwrap();

        let Bean::ControlFlow(element) = bean else {
            panic!("expected control flow bean");
        };
        assert_eq!(element.control_flow_header.guid, flow.guid);
        assert_eq!(element.current_step.unique_name.as_deref(), Some("step::extract"));
        assert_eq!(element.next_step.unique_name.as_deref(), Some("step::load"));
        let props = element.properties.unwrap();
        assert_eq!(props.guard.as_deref(), Some("extracted"));
        assert!(props.mandatory_guard);
    }

    #[test]
    fn test_control_flow_missing_relationship() {
        let converter = ControlFlowConverter::new("server1", "lineage");
        let result = convert(
            &converter,
            BeanShape::ControlFlow,
            &ConversionSource::empty(),
            "getControlFlow",
        );
        assert!(matches!(result, Err(Error::MissingInstance { .. })));
    }

    #[test_case(0, ProcessContainmentType::Owned ; "owned")]
    #[test_case(1, ProcessContainmentType::Used ; "used")]
    #[test_case(7, ProcessContainmentType::Other ; "unknown ordinal")]
    fn test_process_hierarchy_containment(ordinal: i32, expected: ProcessContainmentType) {
        let (parent, child) = steps();
        let relationship = Relationship::new(
            "ProcessHierarchy",
            parent.proxy(),
            child.proxy(),
            InstanceProperties::new().with_enum(CONTAINMENT_TYPE, ordinal, "ANY"),
        );
        let converter = ProcessHierarchyConverter::new("server1", "lineage");
        let bean = convert(
            &converter,
            BeanShape::ProcessHierarchy,
            &ConversionSource::relationship(&relationship),
            "getProcessHierarchy",
        )
        .unwrap();

        let Bean::ProcessHierarchy(element) = bean else {
            panic!("expected process hierarchy bean");
        };
        assert_eq!(element.parent_process.guid, parent.guid);
        assert_eq!(element.child_process.guid, child.guid);
        assert_eq!(element.properties.unwrap().containment_type, expected);
    }

    #[test]
    fn test_port() {
        let entity = EntityDetail::new(
            "PortImplementation",
            InstanceProperties::new()
                .with_string(QUALIFIED_NAME, "port::in")
                .with_enum(PORT_TYPE, 1, "INPUT_PORT")
                .with_string("encoding", "utf-8"),
        );
        let converter = PortConverter::new("server1", "lineage");
        let bean = convert(
            &converter,
            BeanShape::Port,
            &ConversionSource::entity(&entity),
            "getPort",
        )
        .unwrap();

        let Bean::Port(port) = bean else {
            panic!("expected port bean");
        };
        let props = port.port_properties.unwrap();
        assert_eq!(props.port_type, PortType::from_ordinal(1));
        assert_eq!(props.type_name.as_deref(), Some("PortImplementation"));
        assert_eq!(props.extended_properties["encoding"], serde_json::json!("utf-8"));
    }
}
