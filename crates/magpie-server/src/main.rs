//! Main entry point for the Magpie server.
//!
//! Sets up configuration, logging, metrics and background tasks, then runs
//! the HTTP server until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use magpie_core::{HttpFetcher, spawn_cleanup_task};
use magpie_server::{
    middleware::rate_limit,
    model::{AppState, Configuration},
    startup::{self, GracefulShutdown, LoggingConfig},
};
use tracing::{error, info, warn};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize configuration and logging
    let configuration = Configuration::new();

    let logging_config = LoggingConfig::from_env();
    let _logging_guard = startup::init_logging(&logging_config)?;

    // Initialize metrics for observability
    magpie_server::metrics::init_metrics();

    // Start background cleanup task for the login rate limiter
    rate_limit::start_cleanup_task();

    if configuration.uses_default_credentials() {
        warn!(
            "APP_USERNAME/APP_PASSWORD not configured, using default credentials; set them before exposing this server"
        );
    }

    let download_timeout = Duration::from_secs(configuration.download_timeout_secs());
    let fetcher = Arc::new(HttpFetcher::new(download_timeout)?);

    let app_state = AppState::build(configuration.clone(), fetcher)?;

    // The archive directory must exist before the first task persists a ZIP
    app_state.store.ensure_dir().await?;

    let shutdown_signal = startup::wait_for_shutdown_signal();
    let graceful_shutdown = GracefulShutdown::new(shutdown_signal.clone(), Duration::from_secs(30));

    let janitor = spawn_cleanup_task(
        app_state.store.clone(),
        app_state.registry.clone(),
        Duration::from_secs(configuration.zip_ttl_seconds()),
        Duration::from_secs(configuration.cleanup_interval_secs()),
        shutdown_signal.subscribe(),
    );

    let address = configuration.server_address();
    let port = configuration.server_port();
    info!("Starting Magpie server on {}:{}", address, port);

    let server = startup::app_server(app_state.clone())?;
    let server_handle = server.handle();

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = graceful_shutdown.wait_for_shutdown() => {
            info!("Shutting down HTTP server");
            graceful_shutdown.drain(server_handle.stop(true)).await;
        }
    }

    // Stop the janitor regardless of which branch ended the server
    shutdown_signal.shutdown();
    let _ = janitor.await;

    info!("Magpie server shutdown complete");
    Ok(())
}
