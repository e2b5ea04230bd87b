//! Sinks for completion records and audit messages.

use super::audit::AuditCode;
use crate::models::property_names::{
    ACTION_STATUS, ACTION_TARGET_NAME, ANALYSIS_STEP, ANNOTATION_TYPE, COMPLETION_GUARDS,
    COMPLETION_MESSAGE, COMPLETION_TIME, CONFIDENCE_LEVEL, DISPLAY_NAME, EXPLANATION,
    JSON_PROPERTIES, PURPOSE, QUALIFIED_NAME, REQUEST_PARAMETERS, START_TIME, SUMMARY, USER_ID,
};
use crate::models::{
    Annotation, CompletionRecord, EntityDetail, InstanceProperties, NewActionTarget, OrdinalEnum,
    SurveyReport,
};
use crate::storage::MetadataRepository;
use crate::{Error, Result};
use std::sync::{Arc, Mutex, PoisonError};

/// Accepts the outcome of service runs.
pub trait CompletionRecorder: Send + Sync {
    /// Records the final outcome and the report of a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the outcome cannot be stored. Runners log it and
    /// carry on.
    fn record_completion(
        &self,
        user_id: &str,
        record: &CompletionRecord,
        report: &SurveyReport,
    ) -> Result<()>;

    /// Receives an audit message. The default emits it through `tracing`.
    fn log_audit(&self, code: &AuditCode) {
        code.emit();
    }
}

/// Writes outcomes to the metadata repository.
///
/// Every report is stored as a `SurveyReport` entity with one
/// `ReportedAnnotation` link per annotation, attached to the surveyed asset
/// by `AssetSurveyReport`. The engine action entity, when it exists, is
/// updated with the status, guards, message, completion time and follow-on
/// request parameters, and gets one `TargetForAction` link per action target.
pub struct RepositoryCompletionRecorder {
    repository: Arc<dyn MetadataRepository>,
}

impl RepositoryCompletionRecorder {
    /// Creates a recorder over a repository.
    #[must_use]
    pub fn new(repository: Arc<dyn MetadataRepository>) -> Self {
        Self { repository }
    }

    fn update_engine_action(&self, user_id: &str, record: &CompletionRecord) -> Result<()> {
        let Some(mut action) = self.repository.get_entity(&record.engine_action_guid)? else {
            tracing::debug!(
                engine_action = %record.engine_action_guid,
                "No engine action entity to update"
            );
            return Ok(());
        };

        let status = record.status.action_status();
        action.properties = action
            .properties
            .with_enum(ACTION_STATUS, status.ordinal(), status.symbolic_name())
            .with_date(COMPLETION_TIME, record.completion_time)
            .with_string_array(COMPLETION_GUARDS, record.guards.iter().map(String::as_str))
            .with_string(COMPLETION_MESSAGE, record.message.as_str())
            .with_string_map(
                REQUEST_PARAMETERS,
                record
                    .request_parameters
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );
        self.repository.store_entity(user_id, &action)?;

        for target in &record.action_targets {
            self.link_action_target(user_id, &action, target)?;
        }
        Ok(())
    }

    fn link_action_target(
        &self,
        user_id: &str,
        action: &EntityDetail,
        target: &NewActionTarget,
    ) -> Result<()> {
        let existing = self.repository.get_relationships_between(
            &action.guid,
            &target.action_target_guid,
            Some("TargetForAction"),
        )?;
        let name = Some(target.action_target_name.as_str());
        if existing
            .iter()
            .any(|r| r.properties.get_str(ACTION_TARGET_NAME) == name)
        {
            return Ok(());
        }
        if self.repository.get_entity(&target.action_target_guid)?.is_none() {
            tracing::debug!(
                engine_action = %action.guid,
                target = %target.action_target_guid,
                name = %target.action_target_name,
                "Action target not in repository, not linked"
            );
            return Ok(());
        }
        self.repository.create_relationship(
            user_id,
            "TargetForAction",
            &action.guid,
            &target.action_target_guid,
            InstanceProperties::new()
                .with_string(ACTION_TARGET_NAME, target.action_target_name.as_str()),
        )?;
        Ok(())
    }

    fn store_report(&self, user_id: &str, report: &SurveyReport) -> Result<()> {
        let mut properties = InstanceProperties::new()
            .with_string(QUALIFIED_NAME, report.qualified_name.as_str())
            .with_string(USER_ID, report.user_id.as_str());
        if let Some(display_name) = &report.display_name {
            properties = properties.with_string(DISPLAY_NAME, display_name.as_str());
        }
        if let Some(purpose) = &report.purpose {
            properties = properties.with_string(PURPOSE, purpose.as_str());
        }
        if let Some(start_time) = report.start_time {
            properties = properties.with_date(START_TIME, start_time);
        }
        if let Some(completion_time) = report.completion_time {
            properties = properties.with_date(COMPLETION_TIME, completion_time);
        }

        let entity = EntityDetail::with_guid(report.guid.clone(), "SurveyReport", properties)
            .created_by(user_id);
        self.repository.store_entity(user_id, &entity)?;

        for annotation in &report.annotations {
            let annotation_entity =
                EntityDetail::new("Annotation", annotation_properties(annotation)?)
                    .created_by(user_id);
            self.repository.store_entity(user_id, &annotation_entity)?;
            self.repository.create_relationship(
                user_id,
                "ReportedAnnotation",
                &entity.guid,
                &annotation_entity.guid,
                InstanceProperties::new(),
            )?;
        }

        if let Some(asset_guid) = &report.asset_guid
            && self.repository.get_entity(asset_guid)?.is_some()
        {
            self.repository.create_relationship(
                user_id,
                "AssetSurveyReport",
                asset_guid,
                &entity.guid,
                InstanceProperties::new(),
            )?;
        }
        Ok(())
    }
}

fn annotation_properties(annotation: &Annotation) -> Result<InstanceProperties> {
    let mut properties = InstanceProperties::new()
        .with_string(ANNOTATION_TYPE, annotation.annotation_type.as_str())
        .with_string(SUMMARY, annotation.summary.as_str())
        .with_int(CONFIDENCE_LEVEL, annotation.confidence_level);
    if let Some(explanation) = &annotation.explanation {
        properties = properties.with_string(EXPLANATION, explanation.as_str());
    }
    if let Some(step) = &annotation.analysis_step {
        properties = properties.with_string(ANALYSIS_STEP, step.as_str());
    }
    if !annotation.json_properties.is_null() {
        let json = serde_json::to_string(&annotation.json_properties)
            .map_err(|e| Error::server("serialize_annotation", e))?;
        properties = properties.with_string(JSON_PROPERTIES, json);
    }
    Ok(properties)
}

impl CompletionRecorder for RepositoryCompletionRecorder {
    fn record_completion(
        &self,
        user_id: &str,
        record: &CompletionRecord,
        report: &SurveyReport,
    ) -> Result<()> {
        self.store_report(user_id, report)?;
        self.update_engine_action(user_id, record)?;
        metrics::counter!("completions_recorded_total", "status" => record.status.as_str())
            .increment(1);
        Ok(())
    }
}

/// Keeps outcomes in memory. Used by tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryCompletionRecorder {
    records: Mutex<Vec<CompletionRecord>>,
    reports: Mutex<Vec<SurveyReport>>,
    audit_ids: Mutex<Vec<&'static str>>,
}

impl MemoryCompletionRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records received so far.
    #[must_use]
    pub fn records(&self) -> Vec<CompletionRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reports received so far.
    #[must_use]
    pub fn reports(&self) -> Vec<SurveyReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Identifiers of the audit messages received so far.
    #[must_use]
    pub fn audit_ids(&self) -> Vec<&'static str> {
        self.audit_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CompletionRecorder for MemoryCompletionRecorder {
    fn record_completion(
        &self,
        _user_id: &str,
        record: &CompletionRecord,
        report: &SurveyReport,
    ) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn log_audit(&self, code: &AuditCode) {
        code.emit();
        self.audit_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(code.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompletionStatus, EngineActionStatus, Guid};
    use crate::storage::InMemoryRepository;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn record(engine_action: Guid) -> CompletionRecord {
        CompletionRecord {
            engine_action_guid: engine_action,
            status: CompletionStatus::Actioned,
            guards: vec!["survey-completed".to_string()],
            message: "done".to_string(),
            request_parameters: BTreeMap::new(),
            action_targets: Vec::new(),
            completion_time: Utc::now(),
        }
    }

    #[test]
    fn test_repository_recorder_updates_engine_action_and_stores_report() {
        let repository = Arc::new(InMemoryRepository::new());
        let asset = EntityDetail::new("Asset", InstanceProperties::new());
        let action = EntityDetail::new(
            "EngineAction",
            InstanceProperties::new().with_enum(ACTION_STATUS, 4, "IN_PROGRESS"),
        );
        repository.store_entity("test", &asset).unwrap();
        repository.store_entity("test", &action).unwrap();

        let mut report = SurveyReport::new("census", "enginehost", Some(asset.guid.clone()));
        report.add_annotation(
            Annotation::new("PropertyCensus", "3 properties")
                .with_json(serde_json::json!({"count": 3})),
        );

        let recorder = RepositoryCompletionRecorder::new(repository.clone());
        recorder
            .record_completion("enginehost", &record(action.guid.clone()), &report)
            .unwrap();

        let updated = repository.get_entity(&action.guid).unwrap().unwrap();
        let mut drain = crate::models::PropertyDrain::from_ref(&updated.properties);
        assert_eq!(
            drain
                .take_enum_ordinal(ACTION_STATUS)
                .map(EngineActionStatus::from_ordinal),
            Some(EngineActionStatus::Actioned)
        );
        assert_eq!(
            drain.take_string_array(COMPLETION_GUARDS),
            Some(vec!["survey-completed".to_string()])
        );

        let stored_report = repository.get_entity(&report.guid).unwrap().unwrap();
        assert_eq!(stored_report.type_name(), "SurveyReport");
        assert_eq!(
            repository
                .get_relationships(&report.guid, Some("ReportedAnnotation"))
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            repository
                .get_relationships(&asset.guid, Some("AssetSurveyReport"))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_missing_engine_action_is_not_an_error() {
        let repository = Arc::new(InMemoryRepository::new());
        let recorder = RepositoryCompletionRecorder::new(repository.clone());
        let report = SurveyReport::new("census", "enginehost", None);
        recorder
            .record_completion("enginehost", &record(Guid::generate()), &report)
            .unwrap();
        // Only the report itself is stored.
        assert_eq!(repository.entity_count(), 1);
        assert!(repository.get_entity(&report.guid).unwrap().is_some());
    }

    #[test]
    fn test_failed_record_keeps_parameters_and_report_target() {
        let repository = Arc::new(InMemoryRepository::new());
        let action = EntityDetail::new(
            "EngineAction",
            InstanceProperties::new().with_enum(ACTION_STATUS, 4, "IN_PROGRESS"),
        );
        repository.store_entity("test", &action).unwrap();

        let report = SurveyReport::new("census", "enginehost", None);
        let mut failed = record(action.guid.clone());
        failed.status = CompletionStatus::Failed;
        failed.guards = vec!["survey-failed".to_string()];
        failed
            .request_parameters
            .insert("next".to_string(), "profile".to_string());
        failed.action_targets = vec![
            NewActionTarget::new("surveyReport", report.guid.clone()),
            NewActionTarget::new("missing", Guid::generate()),
        ];

        let recorder = RepositoryCompletionRecorder::new(repository.clone());
        recorder
            .record_completion("enginehost", &failed, &report)
            .unwrap();
        // Recording twice does not duplicate target links.
        recorder
            .record_completion("enginehost", &failed, &report)
            .unwrap();

        assert!(repository.get_entity(&report.guid).unwrap().is_some());
        let stored = repository.get_entity(&action.guid).unwrap().unwrap();
        let mut drain = crate::models::PropertyDrain::from_ref(&stored.properties);
        assert_eq!(
            drain.take_string_map(REQUEST_PARAMETERS),
            Some(BTreeMap::from([("next".to_string(), "profile".to_string())]))
        );

        let targets = repository
            .get_relationships(&action.guid, Some("TargetForAction"))
            .unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].end_two.guid, report.guid);
        assert_eq!(
            targets[0].properties.get_str(ACTION_TARGET_NAME),
            Some("surveyReport")
        );
    }

    #[test]
    fn test_memory_recorder_collects() {
        let recorder = MemoryCompletionRecorder::new();
        let report = SurveyReport::new("census", "enginehost", None);
        recorder
            .record_completion("enginehost", &record(Guid::generate()), &report)
            .unwrap();
        recorder.log_audit(&AuditCode::EngineRefreshed {
            engine: "engine1".to_string(),
            request_types: 1,
        });
        assert_eq!(recorder.records().len(), 1);
        assert_eq!(recorder.reports()[0].guid, report.guid);
        assert_eq!(recorder.audit_ids(), vec!["METAGOV-ENGINE-0007"]);
    }
}
