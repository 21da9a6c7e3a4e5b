//! shelter-ingest - handwritten care-log importer
//!
//! Reads the JSON produced by the sheet extraction step, validates and
//! normalizes every record, and registers the valid ones with the shelter
//! record store in one authenticated batch.
//!
//! Exit codes: 0 all records registered, 2 some records failed,
//! 1 the run could not be performed.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use shelter_common::config::{load_or_default, locate_config_file, LoggingConfig};
use shelter_common::time::YearMonth;
use shelter_ingest::config::{resolve_settings, CliOverrides, ENV_CONFIG};
use shelter_ingest::services::{HttpCareLogStore, ValidationContext};
use shelter_ingest::services::Report;
use shelter_ingest::{parse_input, ImportPipeline};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Command-line arguments for shelter-ingest
#[derive(Parser, Debug)]
#[command(name = "shelter-ingest")]
#[command(about = "Import handwritten care-log records into the shelter record store")]
#[command(version)]
struct Args {
    /// Extracted records (JSON array or {"records": [...]})
    input: PathBuf,

    /// TOML config file
    #[arg(short, long, env = ENV_CONFIG)]
    config: Option<PathBuf>,

    /// Record store base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Login name for the batch
    #[arg(short, long)]
    username: Option<String>,

    /// Month the sheet covers (YYYY-MM); dates outside it are flagged
    #[arg(long)]
    expected_month: Option<YearMonth>,

    /// Year for year-less dates when no expected month is given
    #[arg(long)]
    reference_year: Option<i32>,

    /// Write the JSON report here instead of stdout
    #[arg(long)]
    report: Option<PathBuf>,

    /// Validate and map only; print what would be sent
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Args::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let log_level = shelter_common::logging::init_tracing(&LoggingConfig::default())?;
    info!("Starting shelter-ingest v{}", env!("CARGO_PKG_VERSION"));

    let config_path = locate_config_file(args.config.as_deref(), ENV_CONFIG);
    let toml_config =
        load_or_default(config_path.as_deref()).context("Failed to load configuration")?;
    log_level.apply(&toml_config.logging)?;

    let context = ValidationContext::new(
        args.expected_month,
        args.reference_year
            .unwrap_or_else(shelter_common::time::current_year),
    );

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input {}", args.input.display()))?;
    let records = parse_input(&text)?;
    info!(records = records.len(), input = %args.input.display(), "Loaded extracted records");

    if args.dry_run {
        let pipeline = ImportPipeline::new(context, (&toml_config.provenance).into());
        let preview = pipeline.preview(records);
        write_json(&preview, args.report.as_deref())?;
        return Ok(ExitCode::SUCCESS);
    }

    let cli = CliOverrides {
        base_url: args.base_url.clone(),
        username: args.username.clone(),
    };
    let settings = resolve_settings(&cli, &toml_config)?;
    let store = Arc::new(HttpCareLogStore::new(&settings.remote)?);
    let pipeline = ImportPipeline::new(context, settings.provenance);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing current record and stopping");
            on_signal.cancel();
        }
    });

    let report = pipeline
        .run(store, settings.credentials, records, &cancel)
        .await?;

    report.emit_log_trail();
    write_json(&report, args.report.as_deref())?;
    print_trail(&report, args.report.is_some());

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn write_json<T: serde::Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Line trail goes to stderr when stdout carries the JSON report
fn print_trail(report: &Report, report_in_file: bool) {
    for line in report.log_lines() {
        if report_in_file {
            println!("{}", line);
        } else {
            eprintln!("{}", line);
        }
    }
}
