use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use kudos_core::domain::{Win, WinSubmission};
use kudos_db::repositories::WinRepository;

use crate::proxy::{decode_form, ApiRequest, ApiResponse, DecodeError};

/// JSON payload Slack wraps in the `payload` form field of a dialog
/// submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct InteractionPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub submission: Submission,
    pub callback_id: String,
    pub user: UserRef,
    #[serde(default)]
    pub action_ts: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub response_url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub who: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct InteractionForm {
    payload: String,
}

impl InteractionPayload {
    pub fn from_form(body: &str) -> Result<Self, DecodeError> {
        let form: InteractionForm = decode_form(body)?;
        serde_json::from_str(&form.payload)
            .map_err(|error| DecodeError::Payload(error.to_string()))
    }
}

/// Dialog Capture: maps a submitted dialog onto a win and persists it.
/// Persistence is best-effort; a write failure is logged and the platform
/// still gets its empty 200 acknowledgement.
pub struct DialogCapture<R> {
    store: Arc<R>,
}

impl<R> DialogCapture<R>
where
    R: WinRepository,
{
    pub fn new(store: Arc<R>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let payload = match InteractionPayload::from_form(&request.body) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(
                    event_name = "wins.capture.decode_failed",
                    error = %error,
                    "rejecting malformed dialog submission"
                );
                return ApiResponse::bad_request(format!("dialog capture - error: {error}"));
            }
        };

        let win = match Win::submit(
            WinSubmission {
                user_id: payload.user.id,
                user_name: payload.user.name,
                who: payload.submission.who,
                title: payload.submission.title,
                description: payload.submission.description,
            },
            Utc::now(),
        ) {
            Ok(win) => win,
            Err(error) => {
                warn!(
                    event_name = "wins.capture.invalid_submission",
                    error = %error,
                    "rejecting submission that fails win invariants"
                );
                return ApiResponse::bad_request(format!("dialog capture - error: {error}"));
            }
        };

        match self.store.save(win.clone()).await {
            Ok(()) => {
                info!(
                    event_name = "wins.capture.persisted",
                    win_id = %win.id.0,
                    user_id = %win.user_id,
                    user_name = %win.user_name,
                    who = %win.who,
                    title = %win.title,
                    "win persisted"
                );
            }
            Err(error) => {
                warn!(
                    event_name = "wins.capture.persist_failed",
                    user_id = %win.user_id,
                    error = %error,
                    "win write failed; acknowledging anyway"
                );
            }
        }

        ApiResponse::ok("")
    }
}
