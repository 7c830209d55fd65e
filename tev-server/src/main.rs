//! Tumblr Export Viewer (tev-server) - Main entry point
//!
//! Serves the viewer UI and JSON API on a local port. The SQLite database
//! lives in the root folder and is created on first start.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tev_common::config::{CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig};
use tev_common::db::init::init_database;
use tev_server::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for tev-server
#[derive(Parser, Debug)]
#[command(name = "tev-server")]
#[command(about = "Tumblr Export Viewer")]
#[command(version)]
struct Args {
    /// Port to listen on (default 8080)
    #[arg(short, long, env = "TEV_PORT")]
    port: Option<u16>,

    /// Address to bind (default 127.0.0.1)
    #[arg(short, long, env = "TEV_BIND")]
    bind: Option<String>,

    /// Folder holding the database
    #[arg(short, long, env = "TEV_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,
}

fn log_filter(config: Option<&TomlConfig>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    match config.and_then(|c| c.log_level.as_deref()) {
        Some(level) => EnvFilter::new(format!(
            "tev_server={level},tev_common={level},tower_http={level}"
        )),
        None => EnvFilter::new("tev_server=info,tev_common=info,tower_http=info"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load_default();

    tracing_subscriber::registry()
        .with(log_filter(config.as_ref()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Tumblr Export Viewer (tev-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let defaults = CompiledDefaults::for_current_platform();
    let port = args
        .port
        .or_else(|| config.as_ref().and_then(|c| c.port))
        .unwrap_or(defaults.port);
    let bind = args
        .bind
        .or_else(|| config.as_ref().and_then(|c| c.bind_address.clone()))
        .unwrap_or(defaults.bind_address);

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(args.root_folder)
        .with_config(config)
        .resolve();
    info!("Root folder: {}", root_folder.display());

    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    if !initializer.database_exists() {
        info!("Creating new database at {}", db_path.display());
    }
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("Database ready: {}", db_path.display());

    let app = build_router(AppState::new(pool.clone()));

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("tev-server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Err(e) = sqlx::query("PRAGMA optimize").execute(&pool).await {
        warn!("PRAGMA optimize failed: {}", e);
    }
    pool.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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
