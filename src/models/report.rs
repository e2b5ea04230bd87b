//! Survey reports and the annotations a survey produces.

use super::instance::Guid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A finding recorded by a survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Kind of finding.
    pub annotation_type: String,
    /// One-line summary.
    pub summary: String,
    /// Confidence, 0-100.
    pub confidence_level: i32,
    /// Why the finding was made.
    pub explanation: Option<String>,
    /// Step of the survey that produced it.
    pub analysis_step: Option<String>,
    /// Structured payload.
    pub json_properties: serde_json::Value,
}

impl Annotation {
    /// Creates an annotation with full confidence and no payload.
    #[must_use]
    pub fn new(annotation_type: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            annotation_type: annotation_type.into(),
            summary: summary.into(),
            confidence_level: 100,
            explanation: None,
            analysis_step: None,
            json_properties: serde_json::Value::Null,
        }
    }

    /// Sets the analysis step.
    #[must_use]
    pub fn with_analysis_step(mut self, step: impl Into<String>) -> Self {
        self.analysis_step = Some(step.into());
        self
    }

    /// Sets the structured payload.
    #[must_use]
    pub fn with_json(mut self, json: serde_json::Value) -> Self {
        self.json_properties = json;
        self
    }
}

/// Results of one survey run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyReport {
    /// Report GUID, fixed when the run is set up.
    pub guid: Guid,
    /// Unique name.
    pub qualified_name: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Why the survey ran.
    pub purpose: Option<String>,
    /// Asset surveyed.
    pub asset_guid: Option<Guid>,
    /// User the survey ran as.
    pub user_id: String,
    /// When the survey started.
    pub start_time: Option<DateTime<Utc>>,
    /// When the survey finished.
    pub completion_time: Option<DateTime<Utc>>,
    /// Findings.
    pub annotations: Vec<Annotation>,
}

impl SurveyReport {
    /// Creates an empty report with a fresh GUID.
    #[must_use]
    pub fn new(service_name: &str, user_id: &str, asset_guid: Option<Guid>) -> Self {
        let guid = Guid::generate();
        Self {
            qualified_name: format!("SurveyReport::{service_name}::{guid}"),
            guid,
            display_name: Some(format!("Survey report for {service_name}")),
            purpose: None,
            asset_guid,
            user_id: user_id.to_string(),
            start_time: None,
            completion_time: None,
            annotations: Vec::new(),
        }
    }

    /// Adds a finding.
    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }
}
