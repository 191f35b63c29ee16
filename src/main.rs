mod config;
mod services;

use std::fs;
use std::io::{self, Read};

use clap::{Args, Parser, Subcommand};
use digitizer::areas::{AreaError, AreaField, AreaId, AreaStore};
use digitizer::camera::Point;
use digitizer::primitive::{DecodeError, decode_primitives};
use digitizer::regions::extract_regions;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{ConfigError, ZonemapConfig};
use services::convert::{ConvertError, PollSettings, wait_for_conversion};
use services::http::{HttpAreaRepository, HttpConversionStatus};
use services::repository::{AreaRepository, RepositoryError};
use services::sync::{self, SaveReport, SyncContext};


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Area(#[from] AreaError),
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("nothing to change; pass --name, --description or --color")]
    NoChanges,
    #[error("{failed} of {total} changes were not saved")]
    SaveIncomplete { failed: usize, total: usize },
}

#[derive(Parser, Debug)]
#[command(name = "zonemap", about = "Area digitizing tools for converted CAD drawings")]
struct Cli {
    /// Overrides `ZONEMAP_API_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the closed regions of a primitive payload.
    Regions {
        #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
        input: String,
    },
    Areas(AreasCommand),
    Convert(ConvertCommand),
}

#[derive(Args, Debug)]
struct AreasCommand {
    #[command(subcommand)]
    command: AreasSubcommand,
}

#[derive(Subcommand, Debug)]
enum AreasSubcommand {
    /// Print the stored areas of a model.
    List { model_id: String },
    /// Delete every stored area of a model.
    Purge { model_id: String },
    /// Store new areas read from a JSON array.
    Import {
        model_id: String,
        #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
        input: String,
    },
    /// Change the metadata of one stored area.
    Edit {
        model_id: String,
        area_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete one stored area.
    Delete { model_id: String, area_id: i64 },
}

#[derive(Args, Debug)]
struct ConvertCommand {
    #[command(subcommand)]
    command: ConvertSubcommand,
}

#[derive(Subcommand, Debug)]
enum ConvertSubcommand {
    /// Wait until an uploaded file has been converted.
    Wait { file_name: String },
}

/// One entry of an import file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ImportedArea {
    coordinates: Vec<Point>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveSummary {
    inserted: usize,
    updated: usize,
    deleted: usize,
    unconfirmed: usize,
    failed: usize,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ZonemapConfig::from_env()?;
    let config = match &cli.base_url {
        Some(url) => config.with_base_url(url)?,
        None => config,
    };

    match cli.command {
        Command::Regions { input } => run_regions(&input),
        Command::Areas(areas) => run_areas(&config, areas).await,
        Command::Convert(convert) => run_convert(&config, convert).await,
    }
}

fn run_regions(input: &str) -> Result<(), CliError> {
    let primitives = decode_primitives(&read_input(input)?)?;
    let regions = extract_regions(&primitives);
    print_json(&regions)?;
    eprintln!("{} closed regions from {} primitives", regions.len(), primitives.len());
    Ok(())
}

async fn run_areas(config: &ZonemapConfig, areas: AreasCommand) -> Result<(), CliError> {
    let repo = HttpAreaRepository::new(config)?;
    match areas.command {
        AreasSubcommand::List { model_id } => {
            let ctx = SyncContext::new(model_id);
            let store = load_store(&repo, &ctx).await?;
            let active: Vec<_> = store.active_areas().collect();
            print_json(&active)
        }
        AreasSubcommand::Purge { model_id } => {
            sync::delete_all(&repo, &SyncContext::new(model_id)).await?;
            eprintln!("all areas deleted");
            Ok(())
        }
        AreasSubcommand::Import { model_id, input } => {
            let imported: Vec<ImportedArea> = serde_json::from_str(&read_input(&input)?)?;
            let ctx = SyncContext::new(model_id);
            let mut store = load_store(&repo, &ctx).await?;
            let drafted = add_imported(&mut store, imported)?;
            info!(drafted = drafted.len(), "imported areas drafted");
            save_store(&repo, &ctx, &mut store).await
        }
        AreasSubcommand::Edit { model_id, area_id, name, description, color } => {
            let changes: Vec<(AreaField, String)> = [
                (AreaField::Name, name),
                (AreaField::Description, description),
                (AreaField::Color, color),
            ]
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field, v)))
            .collect();
            if changes.is_empty() {
                return Err(CliError::NoChanges);
            }

            let ctx = SyncContext::new(model_id);
            let mut store = load_store(&repo, &ctx).await?;
            apply_edits(&mut store, AreaId::Persistent(area_id), changes)?;
            save_store(&repo, &ctx, &mut store).await
        }
        AreasSubcommand::Delete { model_id, area_id } => {
            let ctx = SyncContext::new(model_id);
            let mut store = load_store(&repo, &ctx).await?;
            store.delete(AreaId::Persistent(area_id))?;
            save_store(&repo, &ctx, &mut store).await
        }
    }
}

async fn run_convert(config: &ZonemapConfig, convert: ConvertCommand) -> Result<(), CliError> {
    match convert.command {
        ConvertSubcommand::Wait { file_name } => {
            let status = HttpConversionStatus::new(config)?;
            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel_tx.send_replace(true);
                }
            });

            let attempts =
                wait_for_conversion(&status, &file_name, PollSettings::from_config(config), cancel_rx).await?;
            eprintln!("{file_name} converted after {attempts} checks");
            Ok(())
        }
    }
}

async fn load_store(repo: &dyn AreaRepository, ctx: &SyncContext) -> Result<AreaStore, CliError> {
    let mut store = AreaStore::new();
    sync::hydrate(repo, ctx, &mut store).await?;
    Ok(store)
}

async fn save_store(repo: &dyn AreaRepository, ctx: &SyncContext, store: &mut AreaStore) -> Result<(), CliError> {
    let report = sync::save(repo, ctx, store).await;
    print_json(&summarize(&report))?;
    for failure in &report.failures {
        eprintln!("{} ({:?}): {}", failure.id, failure.status, failure.reason);
    }
    if !report.failures.is_empty() {
        return Err(CliError::SaveIncomplete {
            failed: report.failures.len(),
            total: report.saved() + report.failures.len(),
        });
    }
    if !report.is_clean() {
        warn!(unconfirmed = report.unconfirmed, "inserts accepted without an id; list the model to see them");
    }
    Ok(())
}

/// Draft every imported area, applying any metadata it carries.
fn add_imported(store: &mut AreaStore, imported: Vec<ImportedArea>) -> Result<Vec<AreaId>, CliError> {
    let mut ids = Vec::with_capacity(imported.len());
    for area in imported {
        let id = store.create_draft(area.coordinates)?;
        let fields = [
            (AreaField::Name, area.name),
            (AreaField::Description, area.description),
            (AreaField::Color, area.color),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                store.edit(id, field, value)?;
            }
        }
        ids.push(id);
    }
    Ok(ids)
}

/// Route edits through an editor buffer so only changed fields are applied.
fn apply_edits(store: &mut AreaStore, id: AreaId, changes: Vec<(AreaField, String)>) -> Result<(), CliError> {
    store.open_editor(id)?;
    for (field, value) in changes {
        store.update_editor(id, field, value)?;
    }
    store.commit_editor(id)?;
    Ok(())
}

fn summarize(report: &SaveReport) -> SaveSummary {
    SaveSummary {
        inserted: report.inserted,
        updated: report.updated,
        deleted: report.deleted,
        unconfirmed: report.unconfirmed,
        failed: report.failures.len(),
    }
}

fn read_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
