use std::sync::Arc;

use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::info;

use kudos_core::config::{AppConfig, ConfigError, LoadOptions};
use kudos_db::{connect_with_settings, migrations, DbPool, SqlWinRepository};
use kudos_slack::commands::CommandIntake;
use kudos_slack::help::HelpResponder;
use kudos_slack::interaction::DialogCapture;

use crate::gateway::HttpSlackGateway;
use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub store: Arc<SqlWinRepository>,
    pub state: AppState<SqlWinRepository, HttpSlackGateway>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let store = Arc::new(SqlWinRepository::new(db_pool.clone(), &config.database.wins_table));
    let gateway = Arc::new(HttpSlackGateway::new(config.slack.access_token.clone()));
    let verification_token = config.slack.verification_token.expose_secret().to_owned();

    let state = AppState {
        command_intake: Arc::new(CommandIntake::new(
            verification_token.clone(),
            store.clone(),
            gateway,
        )),
        dialog_capture: Arc::new(DialogCapture::new(store.clone())),
        help_responder: Arc::new(HelpResponder::new(verification_token)),
    };

    Ok(Application { config, db_pool, store, state })
}

#[cfg(test)]
mod tests {
    use kudos_core::config::{ConfigOverrides, LoadOptions};

    use crate::bootstrap::bootstrap;

    fn valid_overrides(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                slack_verification_token: Some("verif-token".to_string()),
                slack_access_token: Some("xoxb-test".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_without_slack_tokens() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                slack_access_token: Some("xoxb-test".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("bootstrap must fail").to_string();
        assert!(message.contains("slack.verification_token"));
    }

    #[tokio::test]
    async fn bootstrap_provisions_the_wins_table() {
        let app = bootstrap(valid_overrides("sqlite::memory:?cache=shared"))
            .await
            .expect("bootstrap should succeed with valid overrides");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'wins'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("wins table should exist after bootstrap");
        assert_eq!(table_count, 1);

        app.db_pool.close().await;
    }
}
