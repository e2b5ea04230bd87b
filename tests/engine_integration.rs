//! Integration tests for engine configuration and service execution.
#![allow(clippy::unwrap_used, clippy::panic, clippy::too_many_lines)]

use metagov::config::{EngineHostConfig, ServicePoolConfig};
use metagov::models::property_names::{
    ACTION_STATUS, ACTION_TARGET_NAME, COMPLETION_GUARDS, REQUEST_TYPE,
};
use metagov::models::{
    CompletionStatus, EngineActionStatus, EntityDetail, GovernanceEngineProperties,
    GovernanceServiceProperties, Guid, InstanceProperties, OrdinalEnum, PropertyDrain,
};
use metagov::security::{AllowAllVerifier, Role, RoleBasedVerifier};
use metagov::services::engine::{
    PROPERTY_CENSUS, ProviderRegistry, REPORT_TARGET_NAME, RepositoryCompletionRecorder,
    ServiceRequest,
};
use metagov::services::{
    GovernanceConfigurationHandler, GovernanceEngineHandler, RegistrationOutcome,
};
use metagov::storage::{InMemoryRepository, MetadataRepository};
use metagov::Error;
use std::collections::BTreeMap;
use std::sync::Arc;

struct Host {
    repository: Arc<InMemoryRepository>,
    configuration: Arc<GovernanceConfigurationHandler>,
    engine: Guid,
    service: Guid,
}

fn host() -> Host {
    let repository = Arc::new(InMemoryRepository::new());
    let verifier = RoleBasedVerifier::new()
        .with_user("steward", Role::Steward)
        .with_user("enginehost", Role::EngineHost);
    let configuration = Arc::new(GovernanceConfigurationHandler::new(
        "server1",
        repository.clone(),
        Arc::new(verifier),
    ));
    let engine = configuration
        .create_governance_engine(
            "steward",
            "SurveyActionEngine",
            &GovernanceEngineProperties {
                qualified_name: Some("survey-engine".to_string()),
                ..GovernanceEngineProperties::default()
            },
        )
        .unwrap();
    let service = configuration
        .create_governance_service(
            "steward",
            "SurveyActionService",
            &GovernanceServiceProperties {
                qualified_name: Some("census".to_string()),
                connector_provider_name: Some(PROPERTY_CENSUS.to_string()),
                ..GovernanceServiceProperties::default()
            },
        )
        .unwrap();
    Host {
        repository,
        configuration,
        engine,
        service,
    }
}

fn engine_handler(host: &Host) -> GovernanceEngineHandler {
    let config = EngineHostConfig::new()
        .with_service_pool(ServicePoolConfig::new().with_max_concurrent(2))
        .with_start_poll_interval_ms(5);
    GovernanceEngineHandler::new(
        &config,
        "survey-engine",
        host.configuration.clone(),
        Arc::new(ProviderRegistry::with_builtin()),
        Arc::new(RepositoryCompletionRecorder::new(host.repository.clone())),
    )
    .unwrap()
}

#[test]
fn test_survey_run_updates_engine_action_and_links_report() {
    let host = host();
    host.configuration
        .register_service_with_engine(
            "steward",
            &host.engine,
            &host.service,
            "census",
            None,
            &BTreeMap::new(),
        )
        .unwrap();

    let asset = EntityDetail::new(
        "Asset",
        InstanceProperties::new()
            .with_string("qualifiedName", "asset-1")
            .with_long("size", 42),
    );
    host.repository.store_entity("test", &asset).unwrap();
    let action = EntityDetail::new(
        "EngineAction",
        InstanceProperties::new().with_enum(ACTION_STATUS, 4, "IN_PROGRESS"),
    );
    host.repository.store_entity("test", &action).unwrap();

    let handler = engine_handler(&host);
    let record = handler
        .run_service(
            "enginehost",
            ServiceRequest::new("census")
                .with_engine_action(action.guid.clone())
                .with_asset(asset.guid.clone()),
        )
        .unwrap()
        .join()
        .unwrap();

    assert_eq!(record.status, CompletionStatus::Actioned);
    assert!(record.has_guard("survey-completed"));
    let report_guid = record
        .target(REPORT_TARGET_NAME)
        .unwrap()
        .action_target_guid
        .clone();

    let stored_action = host.repository.get_entity(&action.guid).unwrap().unwrap();
    let mut drain = PropertyDrain::from_ref(&stored_action.properties);
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

    let report = host.repository.get_entity(&report_guid).unwrap().unwrap();
    assert_eq!(report.type_name(), "SurveyReport");
    let links = host
        .repository
        .get_relationships(&asset.guid, Some("AssetSurveyReport"))
        .unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].end_two.guid, report_guid);
}

#[test]
fn test_failed_survey_reports_failure_with_report_target() {
    let host = host();
    host.configuration
        .register_service_with_engine(
            "steward",
            &host.engine,
            &host.service,
            "census",
            None,
            &BTreeMap::new(),
        )
        .unwrap();

    let action = EntityDetail::new(
        "EngineAction",
        InstanceProperties::new().with_enum(ACTION_STATUS, 4, "IN_PROGRESS"),
    );
    host.repository.store_entity("test", &action).unwrap();

    let handler = engine_handler(&host);
    let record = handler
        .run_service(
            "enginehost",
            ServiceRequest::new("census")
                .with_engine_action(action.guid.clone())
                .with_asset(Guid::new("no-such-asset")),
        )
        .unwrap()
        .join()
        .unwrap();

    assert_eq!(record.status, CompletionStatus::Failed);
    assert!(record.has_guard("survey-failed"));
    assert!(record.message.contains("AssetNotFound"), "{}", record.message);
    let report_guid = record
        .target(REPORT_TARGET_NAME)
        .unwrap()
        .action_target_guid
        .clone();

    // The report exists even though the survey produced no annotations.
    let report = host.repository.get_entity(&report_guid).unwrap().unwrap();
    assert_eq!(report.type_name(), "SurveyReport");

    let stored_action = host.repository.get_entity(&action.guid).unwrap().unwrap();
    let mut drain = PropertyDrain::from_ref(&stored_action.properties);
    assert_eq!(
        drain
            .take_enum_ordinal(ACTION_STATUS)
            .map(EngineActionStatus::from_ordinal),
        Some(EngineActionStatus::Failed)
    );

    let targets = host
        .repository
        .get_relationships(&action.guid, Some("TargetForAction"))
        .unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].end_two.guid, report_guid);
    assert_eq!(
        targets[0].properties.get_str(ACTION_TARGET_NAME),
        Some(REPORT_TARGET_NAME)
    );
}

#[test]
fn test_one_registration_per_request_type() {
    let host = host();
    let other = host
        .configuration
        .create_governance_service(
            "steward",
            "SurveyActionService",
            &GovernanceServiceProperties {
                qualified_name: Some("census-v2".to_string()),
                connector_provider_name: Some(PROPERTY_CENSUS.to_string()),
                ..GovernanceServiceProperties::default()
            },
        )
        .unwrap();

    let register = |service: &Guid, depth: &str| {
        host.configuration
            .register_service_with_engine(
                "steward",
                &host.engine,
                service,
                "census",
                None,
                &BTreeMap::from([("depth".to_string(), depth.to_string())]),
            )
            .unwrap()
            .outcome
    };
    assert_eq!(register(&host.service, "1"), RegistrationOutcome::Created);
    assert_eq!(register(&host.service, "2"), RegistrationOutcome::Updated);
    assert_eq!(register(&other, "3"), RegistrationOutcome::Replaced);

    let registrations = host
        .repository
        .get_relationships(&host.engine, Some("SupportedGovernanceService"))
        .unwrap();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].end_two.guid, other);
    assert_eq!(registrations[0].properties.get_str(REQUEST_TYPE), Some("census"));

    let registered = host
        .configuration
        .get_registered_service("enginehost", &host.engine, "census")
        .unwrap()
        .unwrap();
    assert_eq!(
        registered.properties.unwrap().request_parameters["depth"],
        "3"
    );
}

#[test]
fn test_concurrent_registrations_keep_single_relationship() {
    let repository = Arc::new(InMemoryRepository::new());
    let configuration = Arc::new(GovernanceConfigurationHandler::new(
        "server1",
        repository.clone(),
        Arc::new(AllowAllVerifier),
    ));
    let engine = configuration
        .create_governance_engine(
            "steward",
            "GovernanceActionEngine",
            &GovernanceEngineProperties {
                qualified_name: Some("action-engine".to_string()),
                ..GovernanceEngineProperties::default()
            },
        )
        .unwrap();
    let services: Vec<Guid> = (0..4)
        .map(|i| {
            configuration
                .create_governance_service(
                    "steward",
                    "GovernanceActionService",
                    &GovernanceServiceProperties {
                        qualified_name: Some(format!("service-{i}")),
                        connector_provider_name: Some("noop".to_string()),
                        ..GovernanceServiceProperties::default()
                    },
                )
                .unwrap()
        })
        .collect();

    std::thread::scope(|scope| {
        for service in &services {
            let configuration = &configuration;
            let engine = &engine;
            scope.spawn(move || {
                configuration
                    .register_service_with_engine(
                        "steward",
                        engine,
                        service,
                        "remediate",
                        None,
                        &BTreeMap::new(),
                    )
                    .unwrap();
            });
        }
    });

    let registrations = repository
        .get_relationships(&engine, Some("SupportedGovernanceService"))
        .unwrap();
    assert_eq!(registrations.len(), 1);
}

#[test]
fn test_unregistered_request_type_and_unauthorized_user() {
    let host = host();
    let handler = engine_handler(&host);
    assert!(handler.registered_request_types().is_empty());

    let err = handler
        .run_service("enginehost", ServiceRequest::new("census"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { .. }));

    let err = handler
        .run_service("stranger", ServiceRequest::new("census"))
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized { .. }));
}
