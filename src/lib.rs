//! Navigation panel backend
//!
//! REST API over SQLite for a personal bookmark dashboard: grouped shortcuts,
//! a todo list, bearer-token auth and site icon upload/fetch into local or
//! S3-compatible storage.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod logo;
pub mod repository;
pub mod state;
pub mod storage;

use std::{env, path::PathBuf};

use rolling_logger::LoggerOptions;

use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use tracing::info;

use config::Config;
use error::AppError;
use state::AppState;

pub async fn start_server() -> Result<(), AppError> {
    let log_dir = env::var("NAVPANEL_LOG_DIR").ok().map(PathBuf::from);
    if let Err(e) =
        rolling_logger::init_logger(log_dir.as_deref(), env!("CARGO_PKG_NAME"), logger_options())
    {
        eprintln!("Logger setup failed: {}", e);
    }

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    let app = api::app(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind {}: {}", address, e)))?;
    let _ = rolling_logger::info(&format!("Server running on {address}"));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let _ = rolling_logger::info("Server shut down");
    Ok(())
}

/// File sink sizing from `NAVPANEL_LOG_MAX_BYTES` / `NAVPANEL_LOG_BACKUPS`
fn logger_options() -> LoggerOptions {
    let mut options = LoggerOptions {
        default_filter: "info,tower_http=debug".to_string(),
        ..LoggerOptions::default()
    };
    if let Some(max_bytes) = env::var("NAVPANEL_LOG_MAX_BYTES").ok().and_then(|v| v.parse().ok()) {
        options.max_bytes = max_bytes;
    }
    if let Some(backups) = env::var("NAVPANEL_LOG_BACKUPS").ok().and_then(|v| v.parse().ok()) {
        options.max_backups = backups;
    }
    options
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
