//! CLI for the event-study pipeline.
//!
//! Lists and describes the summary tables, and runs the full pipeline from
//! CSV panels to CSV outputs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use event_study::{EventStudy, EventStudyConfig, TableRegistry, TableSource, frame};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "event-study")]
#[command(about = "Earnings-announcement event study over daily returns", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all summary tables
    List,
    /// Show information about a specific summary table
    Info {
        /// Table name
        table: String,
    },
    /// Run the pipeline and write every output table
    Run {
        /// Annual disclosure panel (CSV)
        #[arg(long)]
        annual: PathBuf,
        /// Daily event-window return panel (CSV)
        #[arg(long)]
        daily: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = "out")]
        out: PathBuf,
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List => list_tables(&TableRegistry::with_defaults()),
        Commands::Info { table } => show_table_info(&TableRegistry::with_defaults(), &table)?,
        Commands::Run {
            annual,
            daily,
            out,
            config,
        } => run_pipeline(&annual, &daily, &out, config)?,
    }

    Ok(())
}

/// List all summary tables grouped by source frame.
fn list_tables(registry: &TableRegistry) {
    println!("Summary Tables ({} total)\n", registry.len());

    for source in [
        TableSource::Annual,
        TableSource::SubPeriod,
        TableSource::EventWindow,
    ] {
        println!("{}:", source);
        for info in registry.all_info().into_iter().filter(|i| i.source == source) {
            println!("  {} - {}", info.name, info.description);
        }
        println!();
    }
}

/// Show detailed information about a specific summary table.
fn show_table_info(registry: &TableRegistry, table_name: &str) -> Result<()> {
    let info = registry
        .all_info()
        .into_iter()
        .find(|t| t.name == table_name)
        .with_context(|| {
            format!(
                "table '{}' not found, available: {}",
                table_name,
                registry.names().join(", ")
            )
        })?;

    println!("Table: {}", info.name);
    println!("Source: {}", info.source);
    println!("Description: {}", info.description);
    println!("Required columns:");
    for col in &info.required_columns {
        println!("  - {}", col);
    }
    Ok(())
}

/// Load both panels, run every stage and write the outputs.
fn run_pipeline(
    annual: &Path,
    daily: &Path,
    out: &Path,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = match config {
        Some(path) => EventStudyConfig::from_json_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EventStudyConfig::default(),
    };

    let annual = frame::read_annual(annual)
        .with_context(|| format!("loading annual panel {}", annual.display()))?;
    let daily = frame::read_daily(daily)
        .with_context(|| format!("loading daily panel {}", daily.display()))?;

    let output = EventStudy::new(config.clone()).run(annual, daily)?;
    let written = output
        .write_all(&TableRegistry::from_config(&config), out)
        .with_context(|| format!("writing outputs to {}", out.display()))?;

    info!(files = written.len(), out = %out.display(), "done");
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
