mod bootstrap;
mod gateway;
mod health;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use kudos_core::config::{AppConfig, LoadOptions};
use kudos_db::repositories::WinRepository;

fn init_logging(config: &AppConfig) {
    use kudos_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let sweeper = kudos_db::expiry::spawn_sweeper(
        app.store.clone() as Arc<dyn WinRepository>,
        Duration::from_secs(app.config.database.sweep_interval_secs),
    );

    let router = routes::router(app.state.clone()).merge(health::router(app.db_pool.clone()));
    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "kudos-server listening"
    );

    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "kudos-server stopping"
    );
    sweeper.abort();

    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
