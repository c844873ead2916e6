//! Feedback report tool
//!
//! Reads the recorded feedback events from the configured store and prints
//! an analysis report, optionally writing it to a file as well.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use finknows_common::config::{self, StorageBackend};
use tracing::{info, warn};

use finknows_server::feedback::{store, FeedbackReport};
use finknows_server::logging;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Command-line arguments for feedback-report
#[derive(Parser, Debug)]
#[command(name = "feedback-report")]
#[command(about = "Analyze recorded FinKnows feedback")]
#[command(version)]
struct Args {
    /// TOML configuration file (falls back to FINKNOWS_CONFIG, then the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder holding feedback data (falls back to FINKNOWS_DATA_DIR, then the config file)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Storage backend to read: json or sqlite
    #[arg(long, env = "FINKNOWS_STORAGE_BACKEND")]
    backend: Option<StorageBackend>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Also write the report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn render(report: &FeedbackReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => report.to_string(),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize report")?
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    // Logs go to stderr so the report itself can be piped
    let config = logging::load_config_with_logging(args.config.as_deref(), std::io::stderr)
        .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(logging::env_filter(&config.logging.level))
        .with_writer(std::io::stderr)
        .init();

    let backend = args.backend.unwrap_or(config.storage.backend);
    if backend == StorageBackend::Memory {
        bail!("The memory backend keeps no records between runs; choose json or sqlite");
    }

    let data_dir = config::resolve_data_dir(args.data_dir.as_deref(), &config);
    if !data_dir.exists() {
        warn!("Data folder {} does not exist", data_dir.display());
    }

    let stores = store::open_stores(backend, &data_dir)
        .await
        .context("Failed to open feedback storage")?;
    let events = stores
        .events
        .list()
        .await
        .context("Failed to read feedback events")?;
    info!("Loaded {} feedback events", events.len());

    let report = FeedbackReport::build(&events);
    let rendered = render(&report, args.format)?;
    println!("{}", rendered);

    if let Some(path) = args.output {
        tokio::fs::write(&path, &rendered)
            .await
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report saved to {}", path.display());
    }

    Ok(())
}
