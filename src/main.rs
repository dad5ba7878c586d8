//! PasantiasUNI session daemon.
//!
//! Opens the configured session, keeps the notification feed polled and
//! logs every change until interrupted or until the backend invalidates
//! the token.

use tracing_subscriber::{EnvFilter, fmt};

use pasantias_core::config::AppConfig;
use pasantias_core::error::AppError;
use pasantias_service::Session;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Session daemon failed");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("PASANTIAS_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    AppConfig::load(&config_path).map_err(|e| e.context(format!("loading '{config_path}'")))
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Run the session until ctrl-c or invalidation
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting PasantiasUNI session daemon v{}", env!("CARGO_PKG_VERSION"));

    let session = Session::connect(config)?;
    let loaded = session.catalogs().preload_all().await;
    tracing::info!(loaded, "Catalogs preloaded");

    let tasks = session.spawn_background();
    let mut events = session.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
            _ = session.ended() => {
                tracing::warn!("Session ended by the backend, re-authentication required");
                break;
            }
            event = events.recv() => {
                if let Ok(event) = event {
                    tracing::info!(summary = %event.summary(), "Lifecycle event");
                }
            }
        }
    }

    let unread = session.notifications().unread_count().await;
    session.logout().await;
    for task in tasks {
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "Background task ended abnormally");
        }
    }

    tracing::info!(unread, "Session daemon stopped");
    Ok(())
}
