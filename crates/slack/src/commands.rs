use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use kudos_db::repositories::WinRepository;

use crate::dialog::submit_win_dialog;
use crate::gateway::SlackGateway;
use crate::proxy::{decode_form, ApiRequest, ApiResponse, DecodeError};
use crate::summary::SummaryAggregator;

/// Command text that routes to the Summary Aggregator instead of only
/// opening the dialog.
pub const SUMMARY_KEYWORD: &str = "summary";

/// Decoded slash-command form body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CommandRequest {
    pub token: String,
    pub team_id: String,
    pub team_domain: String,
    pub channel_id: String,
    pub channel_name: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    pub trigger_id: String,
    pub response_url: String,
}

impl CommandRequest {
    pub fn from_form(body: &str) -> Result<Self, DecodeError> {
        decode_form(body)
    }

    pub fn wants_summary(&self) -> bool {
        self.text.trim().eq_ignore_ascii_case(SUMMARY_KEYWORD)
    }
}

/// Command Intake: verifies the shared token, optionally runs the summary
/// flow, then opens the WIN dialog.
pub struct CommandIntake<R, G> {
    verification_token: String,
    gateway: Arc<G>,
    summary: SummaryAggregator<R, G>,
}

impl<R, G> CommandIntake<R, G>
where
    R: WinRepository,
    G: SlackGateway,
{
    pub fn new(verification_token: impl Into<String>, store: Arc<R>, gateway: Arc<G>) -> Self {
        Self {
            verification_token: verification_token.into(),
            summary: SummaryAggregator::new(store, gateway.clone()),
            gateway,
        }
    }

    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let command = match CommandRequest::from_form(&request.body) {
            Ok(command) => command,
            Err(error) => {
                warn!(
                    event_name = "wins.command.decode_failed",
                    error = %error,
                    "rejecting malformed command body"
                );
                return ApiResponse::bad_request(format!("command intake - error: {error}"));
            }
        };

        if command.token != self.verification_token {
            warn!(
                event_name = "wins.command.bad_token",
                user_id = %command.user_id,
                "rejecting command with invalid verification token"
            );
            return ApiResponse::bad_request(
                "command intake - error: invalid verification token",
            );
        }

        if command.wants_summary() {
            if let Err(error) = self.summary.deliver(&command).await {
                warn!(
                    event_name = "wins.command.summary_failed",
                    user_id = %command.user_id,
                    error = %error,
                    "summary flow failed; dialog will not be opened"
                );
                return ApiResponse::bad_request(format!("summary - error: {error}"));
            }
        }

        let dialog = submit_win_dialog(&command.trigger_id, &command.text);
        match self.gateway.open_dialog(&dialog).await {
            Ok(ack) if ack.ok => {
                info!(
                    event_name = "wins.command.dialog_opened",
                    user_id = %command.user_id,
                    trigger_id = %command.trigger_id,
                    "dialog open accepted"
                );
            }
            Ok(ack) => {
                warn!(
                    event_name = "wins.command.dialog_rejected",
                    user_id = %command.user_id,
                    error = ack.error.as_deref().unwrap_or("unknown"),
                    "platform rejected the dialog open"
                );
            }
            Err(error) => {
                warn!(
                    event_name = "wins.command.dialog_failed",
                    user_id = %command.user_id,
                    error = %error,
                    "dialog open call failed"
                );
            }
        }

        ApiResponse::ok("")
    }
}
