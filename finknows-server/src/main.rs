//! FinKnows insight service - main entry point
//!
//! Serves sentiment analysis with explanations and collects user feedback on
//! prediction accuracy.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use finknows_common::config::{self, StorageBackend};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finknows_server::analysis::Analyzer;
use finknows_server::classifier::HttpClassifier;
use finknows_server::feedback::{store, FeedbackService};
use finknows_server::logging;
use finknows_server::{build_router, AppState};

/// Command-line arguments for finknows-server
#[derive(Parser, Debug)]
#[command(name = "finknows-server")]
#[command(about = "Financial sentiment insight and feedback service")]
#[command(version)]
struct Args {
    /// TOML configuration file (falls back to FINKNOWS_CONFIG, then the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder for feedback data (falls back to FINKNOWS_DATA_DIR, then the config file)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Address to listen on, overriding the config file
    #[arg(short, long, env = "FINKNOWS_BIND")]
    bind: Option<String>,

    /// Storage backend: json, sqlite or memory
    #[arg(long, env = "FINKNOWS_STORAGE_BACKEND")]
    backend: Option<StorageBackend>,

    /// Classifier endpoint URL, overriding the config file
    #[arg(long, env = "FINKNOWS_CLASSIFIER_URL")]
    classifier_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = logging::load_config_with_logging(args.config.as_deref(), std::io::stdout)
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(logging::env_filter(&config.logging.level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting FinKnows insight service (finknows-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(backend) = args.backend {
        config.storage.backend = backend;
    }
    if let Some(url) = args.classifier_url {
        config.classifier.endpoint = url;
    }

    let data_dir = config::resolve_data_dir(args.data_dir.as_deref(), &config);
    if config.storage.backend != StorageBackend::Memory {
        config::ensure_directory_exists(&data_dir)
            .with_context(|| format!("Failed to create data folder {}", data_dir.display()))?;
    }
    info!("Data folder: {}", data_dir.display());

    let stores = store::open_stores(config.storage.backend, &data_dir)
        .await
        .context("Failed to open feedback storage")?;
    let feedback = FeedbackService::new(stores);

    let classifier =
        HttpClassifier::new(&config.classifier).context("Failed to build classifier client")?;
    info!(
        "Classifier endpoint: {} (timeout {}ms)",
        classifier.endpoint(),
        config.classifier.timeout_ms
    );
    let analyzer = Analyzer::new(Arc::new(classifier));

    let app = build_router(AppState::new(analyzer, feedback));

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;
    info!("finknows-server listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
