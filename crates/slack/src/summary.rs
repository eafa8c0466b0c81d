use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use kudos_core::domain::Win;
use kudos_db::repositories::{RepositoryError, WinRepository};

use crate::commands::CommandRequest;
use crate::gateway::{CallbackMessage, GatewayError, SlackGateway};

const BANNER: &str = "=============================";
const WINDOW_LABEL: &str = " Summary for last 7 days (TTL)";

/// Wins younger than this are left out of the report. The threshold is
/// deliberately narrower than the seven-day banner text; see DESIGN.md.
pub const MIN_AGE_HOURS: i64 = 12;

/// One report row; `created_at` is pre-rendered to whole seconds with no
/// timezone suffix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WinSummary {
    pub who: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("store scan failed: {0}")]
    Store(#[from] RepositoryError),
    #[error("summary delivery failed: {0}")]
    Delivery(#[from] GatewayError),
    #[error("summary encode failed: {0}")]
    Encode(String),
}

/// Scans the store, filters to the recency window, formats the report and
/// posts it to the command's callback URL.
pub struct SummaryAggregator<R, G> {
    store: Arc<R>,
    gateway: Arc<G>,
}

impl<R, G> SummaryAggregator<R, G>
where
    R: WinRepository,
    G: SlackGateway,
{
    pub fn new(store: Arc<R>, gateway: Arc<G>) -> Self {
        Self { store, gateway }
    }

    pub async fn deliver(&self, command: &CommandRequest) -> Result<usize, SummaryError> {
        let wins = self.store.scan_all().await?;
        let rows = summarize(&wins, Utc::now());
        let count = rows.len();
        let body = format_report(&rows)?;

        let ack = self
            .gateway
            .post_response(&command.response_url, &CallbackMessage { text: body })
            .await?;
        info!(
            event_name = "wins.summary.delivered",
            user_id = %command.user_id,
            wins_count = count,
            ack = %ack,
            "summary posted to callback url"
        );

        Ok(count)
    }
}

/// Keeps wins strictly older than [`MIN_AGE_HOURS`], in scan order.
pub fn summarize(wins: &[Win], now: DateTime<Utc>) -> Vec<WinSummary> {
    wins.iter()
        .filter(|win| win.age(now) > Duration::hours(MIN_AGE_HOURS))
        .map(|win| WinSummary {
            who: win.who.clone(),
            title: win.title.clone(),
            description: win.description.clone(),
            created_at: win.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        })
        .collect()
}

/// Banner, count line and the indented JSON rows, joined into one text
/// body.
pub fn format_report(rows: &[WinSummary]) -> Result<String, SummaryError> {
    let rows_text = serde_json::to_string_pretty(rows)
        .map_err(|error| SummaryError::Encode(error.to_string()))?;

    let lines = [
        BANNER.to_owned(),
        WINDOW_LABEL.to_owned(),
        format!(" WINS count: {}", rows.len()),
        BANNER.to_owned(),
        String::new(),
        rows_text,
    ];

    Ok(lines.join("\n"))
}
