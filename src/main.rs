//! permit-study server entry point.
//!
//! Loads configuration, rebuilds the session index from the event log, and
//! serves the HTTP API. A failure before the listener is bound aborts the
//! process: without its index the service cannot answer resume or
//! condition-assignment requests correctly.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use permit_study::adapters::http::{api_router, with_transport_layers, ApiHandlers};
use permit_study::adapters::JsonlEventLog;
use permit_study::application::SessionIndex;
use permit_study::config::{AppConfig, ConfigError, ValidationError};
use permit_study::domain::condition::RandomizerError;
use permit_study::domain::session::UpcasterRegistry;
use permit_study::ports::{EventLog, EventLogError};

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error("could not rebuild session index: {0}")]
    IndexLoad(#[from] EventLogError),

    #[error("could not set up condition assignment: {0}")]
    Randomizer(#[from] RandomizerError),

    #[error("invalid bind address: {0}")]
    BindAddress(#[from] std::net::AddrParseError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    if let Err(e) = run(config).await {
        error!(error = %e, "permit-study stopped");
        return Err(e);
    }
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.is_production() {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    if let Err(e) = result {
        eprintln!("tracing init failed: {e}");
    }
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    config.validate()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting permit-study"
    );

    let log: Arc<dyn EventLog> = Arc::new(JsonlEventLog::new(&config.storage.data_dir));
    info!(data_dir = %config.storage.data_dir.display(), "Using event log");

    let index = Arc::new(SessionIndex::new());
    let indexed = index
        .load(log.as_ref(), &UpcasterRegistry::standard())
        .await?;
    info!(sessions = indexed, "Session index rebuilt");

    let answer_key = config.study.load_answer_key()?;
    info!(rules = answer_key.len(), "Answer key loaded");

    let handlers = ApiHandlers::build(
        log,
        index,
        &config.study,
        &config.export,
        answer_key,
    )?;
    let app = with_transport_layers(api_router(handlers), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "permit-study listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("permit-study shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
