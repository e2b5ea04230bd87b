//! Binary entry point for metagov.
//!
//! Converts instance fixtures into beans and runs the built-in survey
//! against an in-memory repository.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stdout in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use metagov::config::EngineHostConfig;
use metagov::models::{
    BeanShape, Classification, EntityDetail, EntityProxy, GovernanceEngineProperties,
    GovernanceServiceProperties, Guid, InstanceProperties, Relationship,
};
use metagov::observability;
use metagov::security::AllowAllVerifier;
use metagov::services::converters::{ConversionSource, convert, converter_for};
use metagov::services::engine::{
    MemoryCompletionRecorder, PROPERTY_CENSUS, ProviderRegistry, ServiceRequest,
};
use metagov::services::{GovernanceConfigurationHandler, GovernanceEngineHandler};
use metagov::storage::{BulkheadRepository, InMemoryRepository, MetadataRepository};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// Metagov - open metadata conversion and governance service runner.
#[derive(Parser)]
#[command(name = "metagov")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "METAGOV_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Convert an instance fixture into a bean.
    Convert {
        /// Bean shape, for example `glossary_term` or `control_flow`.
        #[arg(short, long)]
        shape: BeanShape,

        /// JSON fixture with an entity and/or relationships.
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Run the property census survey over an asset.
    Survey {
        /// JSON fixture of the asset entity.
        #[arg(short, long)]
        asset: PathBuf,

        /// Also count the asset's relationships.
        #[arg(long)]
        include_relationships: bool,
    },

    /// Print the effective configuration.
    Config,
}

/// An entity as written in a fixture file.
#[derive(Debug, Deserialize)]
struct EntityFixture {
    #[serde(default)]
    guid: Option<Guid>,
    type_name: String,
    #[serde(default)]
    properties: InstanceProperties,
    #[serde(default)]
    classifications: Vec<ClassificationFixture>,
}

#[derive(Debug, Deserialize)]
struct ClassificationFixture {
    name: String,
    #[serde(default)]
    properties: InstanceProperties,
}

#[derive(Debug, Deserialize)]
struct EndFixture {
    guid: Guid,
    type_name: String,
}

#[derive(Debug, Deserialize)]
struct RelationshipFixture {
    type_name: String,
    end_one: EndFixture,
    end_two: EndFixture,
    #[serde(default)]
    properties: InstanceProperties,
}

/// Input of the `convert` command.
#[derive(Debug, Deserialize)]
struct ConversionFixture {
    #[serde(default)]
    entity: Option<EntityFixture>,
    #[serde(default)]
    relationships: Vec<RelationshipFixture>,
    #[serde(default)]
    starting_guid: Option<Guid>,
}

impl EntityFixture {
    fn into_entity(self) -> EntityDetail {
        let guid = self.guid.unwrap_or_else(Guid::generate);
        self.classifications.into_iter().fold(
            EntityDetail::with_guid(guid, &self.type_name, self.properties),
            |entity, c| entity.with_classification(Classification::new(c.name, c.properties)),
        )
    }
}

impl RelationshipFixture {
    fn into_relationship(self) -> Relationship {
        Relationship::new(
            &self.type_name,
            EntityProxy::new(self.end_one.guid, &self.end_one.type_name),
            EntityProxy::new(self.end_two.guid, &self.end_two.type_name),
            self.properties,
        )
    }
}

/// Main entry point.
fn main() -> ExitCode {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_settings(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Convert { shape, input } => cmd_convert(&config, shape, &input),
        Commands::Survey {
            asset,
            include_relationships,
        } => cmd_survey(&config, &asset, include_relationships),
        Commands::Config => {
            println!("{config:#?}");
            Ok(())
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Loads configuration from the given file or the default location.
fn load_config(path: Option<&Path>) -> Result<EngineHostConfig> {
    let config = match path {
        Some(path) => EngineHostConfig::load_from_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => EngineHostConfig::load_default(),
    };
    Ok(config.with_env_overrides())
}

fn read_fixture<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn cmd_convert(config: &EngineHostConfig, shape: BeanShape, input: &Path) -> Result<()> {
    let fixture: ConversionFixture = read_fixture(input)?;
    let entity = fixture.entity.map(EntityFixture::into_entity);
    let relationships: Vec<Relationship> = fixture
        .relationships
        .into_iter()
        .map(RelationshipFixture::into_relationship)
        .collect();

    let source = ConversionSource {
        entity: entity.as_ref(),
        relationships: &relationships,
        starting_guid: fixture.starting_guid.as_ref(),
    };
    let converter = converter_for(shape, &config.server_name, "metagov-cli");
    let bean = convert(converter.as_ref(), shape, &source, "convert")?;

    println!("{}", serde_json::to_string_pretty(&bean)?);
    Ok(())
}

fn cmd_survey(config: &EngineHostConfig, asset: &Path, include_relationships: bool) -> Result<()> {
    const ENGINE: &str = "metagov-cli-survey-engine";

    let asset = read_fixture::<EntityFixture>(asset)?.into_entity();
    let repository = Arc::new(BulkheadRepository::new(
        InMemoryRepository::new(),
        config.repository_bulkhead.clone(),
        "memory",
    ));
    repository.store_entity(&config.user_id, &asset)?;

    let configuration = Arc::new(GovernanceConfigurationHandler::new(
        &config.server_name,
        repository.clone(),
        Arc::new(AllowAllVerifier),
    ));
    let engine = configuration.create_governance_engine(
        &config.user_id,
        "SurveyActionEngine",
        &GovernanceEngineProperties {
            qualified_name: Some(ENGINE.to_string()),
            ..GovernanceEngineProperties::default()
        },
    )?;
    let service = configuration.create_governance_service(
        &config.user_id,
        "SurveyActionService",
        &GovernanceServiceProperties {
            qualified_name: Some(PROPERTY_CENSUS.to_string()),
            connector_provider_name: Some(PROPERTY_CENSUS.to_string()),
            ..GovernanceServiceProperties::default()
        },
    )?;
    configuration.register_service_with_engine(
        &config.user_id,
        &engine,
        &service,
        PROPERTY_CENSUS,
        None,
        &BTreeMap::new(),
    )?;

    let recorder = Arc::new(MemoryCompletionRecorder::new());
    let handler = GovernanceEngineHandler::new(
        config,
        ENGINE,
        configuration,
        Arc::new(ProviderRegistry::with_builtin()),
        recorder.clone(),
    )?;

    let request = ServiceRequest::new(PROPERTY_CENSUS)
        .with_asset(asset.guid.clone())
        .with_parameter("includeRelationships", include_relationships.to_string());
    let record = handler.run_service(&config.user_id, request)?.join()?;

    let report = recorder
        .reports()
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("survey produced no report"))?;
    let output = serde_json::json!({
        "completion": record,
        "report": report,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
