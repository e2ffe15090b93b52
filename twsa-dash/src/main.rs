//! twsa-dash - Tweet sentiment dashboard server
//!
//! Serves the sentiment dashboard, tweet tables, and CSV transfer pages on
//! top of the configured record store.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use twsa_common::config::{self, ConfigOverrides};
use twsa_common::db::{MemoryRecordStore, SqliteRecordStore};
use twsa_common::RecordStore;
use twsa_dash::{build_router, AppState};

/// Command-line arguments for twsa-dash
#[derive(Parser, Debug)]
#[command(name = "twsa-dash")]
#[command(about = "Tweet sentiment dashboard")]
#[command(version)]
struct Args {
    /// Config file (default: ~/.config/twsa/config.toml, then /etc/twsa/config.toml)
    #[arg(short, long, env = "TWSA_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "TWSA_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// SQLite database file holding the records
    #[arg(long, env = "TWSA_DATABASE_PATH")]
    database_path: Option<PathBuf>,

    /// Collection (table) name within the database
    #[arg(long, env = "TWSA_COLLECTION")]
    collection: Option<String>,

    /// Most records one dashboard request may aggregate
    #[arg(long, env = "TWSA_MAX_RECORDS")]
    max_records: Option<usize>,

    /// Rows shown in table previews
    #[arg(long, env = "TWSA_PREVIEW_LIMIT")]
    preview_limit: Option<usize>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, env = "TWSA_LOG_LEVEL")]
    log_level: Option<String>,

    /// TrueType font used for chart text
    #[arg(long, env = "TWSA_FONT_PATH")]
    font_path: Option<PathBuf>,

    /// Keep records in memory instead of the database (lost on exit)
    #[arg(long)]
    memory: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind_address: self.bind.clone(),
            port: self.port,
            database_path: self.database_path.clone(),
            collection: self.collection.clone(),
            max_records: self.max_records,
            preview_limit: self.preview_limit,
            log_level: self.log_level.clone(),
            font_path: self.font_path.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is resolved before tracing starts so log_level can take effect;
    // failures are reported once the subscriber is up.
    let resolved = config::load(args.config.as_deref(), args.overrides());
    let log_level = match &resolved {
        Ok(config) => config.log_level.clone(),
        Err(_) => config::DEFAULT_LOG_LEVEL.to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    info!(
        "Starting Tweet Sentiment Analyzer (twsa-dash) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = match resolved {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e).context("Failed to load configuration");
        }
    };

    let store: Arc<dyn RecordStore> = if args.memory {
        info!("Using in-memory record store");
        Arc::new(MemoryRecordStore::new())
    } else {
        info!(
            "Database: {} (collection '{}')",
            config.database_path.display(),
            config.collection
        );
        let store = SqliteRecordStore::open(&config.database_path, &config.collection)
            .await
            .context("Failed to open record store")?;
        info!("✓ Connected to database ({} records)", store.count().await?);
        Arc::new(store)
    };

    let address = config.listen_address();
    let state = AppState::new(store, config);
    if !state.renderer.draws_text() {
        info!("Charts will render without text; set chart.font_path to enable labels");
    }
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("twsa-dash listening on http://{}", address);
    info!("Health check: http://{}/health", address);

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
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
