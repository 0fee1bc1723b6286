//! lumora-server - Lumora marketplace and research backend
//!
//! Serves the JSON API for app listings, reviews, research studies and
//! AI-moderated interviews from a single SQLite database.

use anyhow::{Context, Result};
use clap::Parser;
use lumora_common::config::{database_path, load_toml_config, resolve_root_folder, ROOT_FOLDER_ENV};
use lumora_common::db::init_database;
use lumora_server::{build_router, config, AppState};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 5780;
const DEFAULT_BIND: &str = "127.0.0.1";

/// Command-line arguments for lumora-server
#[derive(Parser, Debug)]
#[command(name = "lumora-server")]
#[command(about = "App-review marketplace and customer research API")]
#[command(version)]
struct Args {
    /// Port to listen on [default: 5780]
    #[arg(short, long, env = "LUMORA_PORT")]
    port: Option<u16>,

    /// Address to bind [default: 127.0.0.1]
    #[arg(short, long, env = "LUMORA_BIND")]
    bind: Option<String>,

    /// Root folder holding lumora.db
    #[arg(short, long, env = "LUMORA_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Path to config.toml
    #[arg(short, long, env = "LUMORA_CONFIG")]
    config: Option<PathBuf>,

    /// Store this AI API key in the database before starting
    #[arg(long, value_name = "KEY")]
    store_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lumora_server=info,lumora_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database work
    info!(
        "Starting Lumora server (lumora-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let toml_config = load_toml_config(args.config.as_deref()).context("Failed to load config file")?;

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV, &toml_config);
    std::fs::create_dir_all(&root_folder)
        .with_context(|| format!("Failed to create root folder {}", root_folder.display()))?;

    let db_path = database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    if let Some(key) = args.store_api_key.as_deref() {
        config::store_api_key(&pool, key)
            .await
            .context("Failed to store AI API key")?;
    }

    let chat = config::build_chat_model(&pool, &toml_config)
        .await
        .context("Failed to configure chat model")?;

    let state = AppState::new(pool, chat);
    let app = build_router(state);

    let bind = args
        .bind
        .or(toml_config.bind.clone())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let addr = format!("{}:{}", bind, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("lumora-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
