//! Built-in survey that counts the properties of an asset.

use super::context::ServiceContext;
use super::service::{GovernanceService, ServiceError, ServiceKind, ServiceProvider, ServiceResult};
use crate::models::Annotation;
use serde_json::json;
use std::collections::BTreeMap;

/// Provider name registered for the census survey.
pub const PROPERTY_CENSUS: &str = "property-census";

/// Request parameter that adds relationship counts to the census.
pub const INCLUDE_RELATIONSHIPS: &str = "includeRelationships";

/// Output parameter carrying the number of properties counted.
pub const PROPERTY_COUNT: &str = "propertyCount";

/// Creates [`PropertyCensusSurvey`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyCensusProvider;

impl ServiceProvider for PropertyCensusProvider {
    fn provider_name(&self) -> &str {
        PROPERTY_CENSUS
    }

    fn create(&self) -> Box<dyn GovernanceService> {
        Box::new(PropertyCensusSurvey)
    }
}

/// Counts the properties of the asset by value kind, its classifications
/// and optionally its relationships by type, and reports the counts as one
/// `PropertyCensus` annotation.
#[derive(Debug, Default)]
pub struct PropertyCensusSurvey;

impl PropertyCensusSurvey {
    fn check_cancelled(context: &ServiceContext) -> ServiceResult<()> {
        if context.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }
        Ok(())
    }
}

impl GovernanceService for PropertyCensusSurvey {
    fn service_name(&self) -> &str {
        PROPERTY_CENSUS
    }

    fn kind(&self) -> ServiceKind {
        ServiceKind::Survey
    }

    fn start(&mut self, context: &mut ServiceContext) -> ServiceResult<()> {
        let asset_guid = context
            .asset_guid()
            .cloned()
            .ok_or_else(|| ServiceError::InvalidRequest("no asset to survey".to_string()))?;

        let asset = context
            .repository()
            .get_entity(&asset_guid)?
            .ok_or_else(|| ServiceError::AssetNotFound(asset_guid.to_string()))?;
        Self::check_cancelled(context)?;

        let mut by_kind: BTreeMap<&str, usize> = BTreeMap::new();
        for (_, value) in asset.properties.iter() {
            *by_kind.entry(value.kind_name()).or_default() += 1;
        }
        let classifications: Vec<&str> = asset
            .classifications
            .iter()
            .map(|c| c.name.as_str())
            .collect();

        let mut payload = json!({
            "assetType": asset.type_name(),
            "propertyCount": asset.properties.len(),
            "propertiesByKind": by_kind,
            "classifications": classifications,
        });

        if context.parameter(INCLUDE_RELATIONSHIPS) == Some("true") {
            Self::check_cancelled(context)?;
            let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
            for relationship in context.repository().get_relationships(&asset_guid, None)? {
                *by_type
                    .entry(relationship.type_name().to_string())
                    .or_default() += 1;
            }
            payload["relationshipsByType"] = json!(by_type);
        }
        Self::check_cancelled(context)?;

        let count = asset.properties.len();
        tracing::debug!(asset = %asset_guid, properties = count, "Property census complete");

        let report = context.report_mut();
        report.purpose = Some(format!("Property census of {}", asset.type_name()));
        report.add_annotation(
            Annotation::new(
                "PropertyCensus",
                format!("{count} properties on {} {asset_guid}", asset.type_name()),
            )
            .with_analysis_step("count-properties")
            .with_json(payload),
        );
        context.add_output_parameter(PROPERTY_COUNT, count.to_string());
        Ok(())
    }
}
