use serde::Deserialize;
use tracing::warn;

use crate::proxy::{decode_form, ApiRequest, ApiResponse};

pub const USAGE_BODY: &str =
    "<h2>Invoke /wins Command to enter a new WIN for your team!</h2>";
pub const INVALID_TOKEN_BODY: &str = "<h2>Invalid token</h2>";

/// Help form: the command shape minus `trigger_id`. Only the token is
/// inspected, so every field tolerates being absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HelpRequest {
    pub token: String,
    pub team_id: String,
    pub team_domain: String,
    pub channel_id: String,
    pub channel_name: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    pub response_url: String,
}

/// Help Responder: token check, fixed usage snippet. The bodies are HTML
/// under the JSON content-type header the envelope always carries.
pub struct HelpResponder {
    verification_token: String,
}

impl HelpResponder {
    pub fn new(verification_token: impl Into<String>) -> Self {
        Self { verification_token: verification_token.into() }
    }

    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let help = decode_form::<HelpRequest>(&request.body).unwrap_or_default();

        if help.token != self.verification_token {
            warn!(
                event_name = "wins.help.bad_token",
                user_id = %help.user_id,
                "rejecting help request with invalid token"
            );
            return ApiResponse::bad_request(INVALID_TOKEN_BODY);
        }

        ApiResponse::ok(USAGE_BODY)
    }
}
