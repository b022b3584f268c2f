mod config;
mod error;
mod nasa;
mod openapi;
mod routes;
mod state;
mod translate;
mod utils;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("apod_translator=debug,tower_http=debug")),
        )
        .init();

    let config_path = find_config_file();
    match &config_path {
        Some(path) => info!("Loading configuration from: {}", path),
        None => info!("No configuration file found, using APOD__* environment variables"),
    }
    let config = Config::load(config_path.as_deref())?;

    let host = config.server.host.clone();
    let port = config.server.port;

    let app_state = AppState::new(config)?;
    let app = routes::build_app(app_state);

    info!("Starting server on {}:{}", host, port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// `CONFIG_PATH` wins when set, even if the file is missing, so a typo
/// fails loudly instead of silently falling back.
fn find_config_file() -> Option<String> {
    if let Ok(path) = std::env::var("CONFIG_PATH") {
        return Some(path);
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    [
        PathBuf::from("conf.yaml"),
        PathBuf::from("conf.json"),
        exe_dir.join("conf.yaml"),
    ]
    .into_iter()
    .find(|p| p.exists())
    .and_then(|p| p.to_str().map(|s| s.to_string()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
