//! tick-server - tick sighting ingestion and query service
//!
//! Startup is strictly sequential: open the store, load the bootstrap
//! snapshot, merge the external feed, then bind the listener.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tick_common::config::{
    database_path, resolve_in_root, resolve_root_folder, TomlConfig, DEFAULT_HOST, DEFAULT_PORT,
};
use tick_common::db::{count_sightings, init_database};
use tick_server::ingest::{FeedClient, Reconciler};
use tick_server::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SEED_FILE: &str = "seed_data.json";
const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Command-line arguments for tick-server
#[derive(Parser, Debug)]
#[command(name = "tick-server")]
#[command(about = "Tick sighting ingestion and query service")]
#[command(version)]
struct Args {
    /// TOML config file (default: <config dir>/tick-tracker/config.toml)
    #[arg(short, long, env = "TICK_CONFIG")]
    config: Option<PathBuf>,

    /// Data folder holding the database, snapshot and uploads
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "TICK_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "TICK_PORT")]
    port: Option<u16>,

    /// Bootstrap snapshot (relative paths resolve against the root folder)
    #[arg(long, env = "TICK_SEED_FILE")]
    seed_file: Option<PathBuf>,

    /// External feed URL
    #[arg(long, env = "TICK_FEED_URL")]
    feed_url: Option<String>,

    /// Skip the external feed at startup
    #[arg(long)]
    no_feed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=info", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tick-server v{}", env!("CARGO_PKG_VERSION"));

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    info!("Root folder: {}", root_folder.display());

    let db_path = database_path(&root_folder);
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("Database ready: {}", db_path.display());

    let cities = Arc::new(config.city_table());
    info!("City table: {} entries", cities.len());

    let seed_file = resolve_in_root(
        &root_folder,
        args.seed_file
            .as_deref()
            .or(config.seed_file.as_deref())
            .unwrap_or(Path::new(DEFAULT_SEED_FILE)),
    );

    let mut feed_config = config.feed.clone();
    if let Some(url) = args.feed_url {
        feed_config.url = url;
    }
    let feed = if feed_config.enabled && !args.no_feed {
        match FeedClient::from_config(&feed_config) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Feed client unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    let reconciler = Reconciler::new(pool.clone(), Arc::clone(&cities));
    reconciler.run_startup(&seed_file, feed.as_ref()).await;
    info!("Sightings in database: {}", count_sightings(&pool).await?);

    let upload_dir = resolve_in_root(
        &root_folder,
        config
            .upload_dir
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_UPLOAD_DIR)),
    );
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .with_context(|| format!("Failed to create upload dir {}", upload_dir.display()))?;

    let frontend_dir = config
        .frontend_dir
        .as_deref()
        .map(|dir| resolve_in_root(&root_folder, dir));
    if let Some(dir) = &frontend_dir {
        info!("Serving frontend from {}", dir.display());
    }

    let state = AppState::new(pool, cities, upload_dir).with_frontend(frontend_dir);
    let app = build_router(state);

    let host = args
        .host
        .or(config.host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("tick-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

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
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
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
