//! Command-line interface for gqlsync.
//!
//! # Usage
//!
//! ```bash
//! # Validate a resolver configuration
//! gqlsync check --config resolvers.json
//!
//! # Show what a synchronization pass would do against a snapshot of the API
//! gqlsync plan --config resolvers.json --snapshot api.json
//!
//! # List resolvers a removal pass would delete
//! gqlsync prune --config resolvers.json --state last-run.json
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use gqlsync_client::{ApiSnapshot, InMemoryApi};
use gqlsync_core::{
    check_duplicates, obsolete_keys, validate_resolver, ConfigError, Mode, SyncConfig, SyncState,
    SyncSummary,
};
use gqlsync_reconcile::{
    resolve_templates, FsTemplateLoader, InlineTemplateLoader, ResolverSynchronizer, SyncError,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "gqlsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a resolver configuration without contacting the API
    Check {
        /// Resolver configuration file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Classify every declared resolver against an API snapshot
    Plan {
        /// Resolver configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Snapshot of the deployed data sources and resolvers
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Print the resulting resolver state as JSON
        #[arg(long)]
        json: bool,
    },

    /// List resolvers that are no longer declared
    Prune {
        /// Resolver configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// State written by the previous synchronization
        #[arg(short, long)]
        state: PathBuf,
    },

    /// Print version information
    Version,
}

pub async fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check { config } => check_config(&config, cli.quiet).await,
        Commands::Plan {
            config,
            snapshot,
            json,
        } => plan(&config, &snapshot, json).await,
        Commands::Prune { config, state } => prune(&config, &state),
        Commands::Version => {
            println!("gqlsync {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    }
}

fn report(error: ConfigError) {
    eprintln!("{:?}", miette::Report::new(error));
}

fn load_config(path: &Path) -> Option<SyncConfig> {
    match SyncConfig::from_path(path) {
        Ok(config) => Some(config),
        Err(error) => {
            report(error);
            None
        }
    }
}

async fn check_config(path: &Path, quiet: bool) -> Result<i32, Box<dyn std::error::Error>> {
    let Some(config) = load_config(path) else {
        return Ok(1);
    };

    let mut errors = Vec::new();
    if let Err(error) = check_duplicates(&config.mapping_templates) {
        errors.push(error);
    }
    for template in &config.mapping_templates {
        let resolver = resolve_templates(&InlineTemplateLoader, template).await?;
        if let Err(error) = validate_resolver(&resolver, &config) {
            errors.push(error);
        }
    }

    if errors.is_empty() {
        if !quiet {
            println!(
                "{} {} resolver(s) checked",
                "Success:".green().bold(),
                config.mapping_templates.len()
            );
        }
        Ok(0)
    } else {
        eprintln!("{} {}", "Error".red().bold(), path.display());
        for error in errors {
            report(error);
        }
        Ok(1)
    }
}

async fn plan(
    config_path: &Path,
    snapshot_path: &Path,
    json: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let Some(config) = load_config(config_path) else {
        return Ok(1);
    };
    let snapshot: ApiSnapshot = serde_json::from_str(&std::fs::read_to_string(snapshot_path)?)?;

    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let synchronizer = ResolverSynchronizer::new(Arc::new(InMemoryApi::from_snapshot(snapshot)))
        .with_loader(Arc::new(FsTemplateLoader::with_base_dir(base_dir)));

    let results = match synchronizer.plan(&config).await {
        Ok(results) => results,
        Err(SyncError::Config(error)) => {
            report(error);
            return Ok(1);
        }
        Err(error) => return Err(error.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(0);
    }

    for synced in &results {
        let label = match synced.mode {
            Mode::Create => "create".green(),
            Mode::Update => "update".yellow(),
            Mode::Ignore => "ignore".dimmed(),
        };
        println!("  {label:>6} {}", synced.key());
    }
    let summary = SyncSummary::from_results(&results);
    if summary.is_noop() {
        println!("{} no changes", "Plan:".bold());
    } else {
        println!("{} {summary}", "Plan:".bold());
    }
    Ok(0)
}

fn prune(config_path: &Path, state_path: &Path) -> Result<i32, Box<dyn std::error::Error>> {
    let Some(config) = load_config(config_path) else {
        return Ok(1);
    };
    let state = match SyncState::from_path(state_path) {
        Ok(state) => state,
        Err(error) => {
            report(error);
            return Ok(1);
        }
    };

    let obsolete = obsolete_keys(&config, &state);
    for key in &obsolete {
        println!("  {} {key}", "delete".red());
    }
    println!(
        "{} {} obsolete resolver(s)",
        "Prune:".bold(),
        obsolete.len()
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    const CONFIG: &str = r#"{
        "apiId": "api-1",
        "mappingTemplates": [
            { "dataSource": "DS1", "type": "Query", "field": "getItem", "request": "getItem.vtl", "response": "res" },
            { "type": "Query", "field": "me", "kind": "PIPELINE", "pipelineConfig": { "functions": ["auth"] } }
        ],
        "functions": [{ "name": "auth", "functionId": "fn-auth" }]
    }"#;

    #[tokio::test]
    async fn test_check_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = write(dir.path(), "resolvers.json", CONFIG);

        let cli = Cli::parse_from(["gqlsync", "check", "--config", config.to_str().unwrap()]);
        assert_eq!(run(cli).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_check_reports_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = write(
            dir.path(),
            "resolvers.json",
            r#"{
                "apiId": "api-1",
                "mappingTemplates": [
                    { "type": "Query", "field": "getItem" },
                    { "dataSource": "DS1", "type": "Query", "field": "me", "kind": "PIPELINE" }
                ]
            }"#,
        );

        let cli = Cli::parse_from(["gqlsync", "check", "--config", config.to_str().unwrap()]);
        assert_eq!(run(cli).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_check_missing_file() {
        let cli = Cli::parse_from(["gqlsync", "check", "--config", "/no/such/resolvers.json"]);
        assert_eq!(run(cli).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_plan_against_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let config = write(dir.path(), "resolvers.json", CONFIG);
        write(dir.path(), "getItem.vtl", "{}");
        let snapshot = write(
            dir.path(),
            "api.json",
            r#"{
                "dataSources": [{ "name": "DS1", "type": "AMAZON_DYNAMODB" }],
                "resolvers": [{
                    "typeName": "Query",
                    "fieldName": "getItem",
                    "dataSourceName": "DS1",
                    "requestMappingTemplate": "{}",
                    "responseMappingTemplate": "res"
                }]
            }"#,
        );

        let cli = Cli::parse_from([
            "gqlsync",
            "plan",
            "--config",
            config.to_str().unwrap(),
            "--snapshot",
            snapshot.to_str().unwrap(),
        ]);
        assert_eq!(run(cli).await.unwrap(), 0);
    }

    #[test]
    fn test_prune_lists_obsolete() {
        let dir = tempfile::tempdir().unwrap();
        let config = write(dir.path(), "resolvers.json", CONFIG);
        let state = write(
            dir.path(),
            "state.json",
            r#"{ "mappingTemplates": [{ "type": "Query", "field": "getX" }] }"#,
        );

        let code = prune(&config, &state).unwrap();
        assert_eq!(code, 0);
    }
}
