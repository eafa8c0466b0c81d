use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dialog::DialogOpenRequest;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("slack call failed to send: {0}")]
    Send(String),
    #[error("slack response decode failed: {0}")]
    Decode(String),
}

/// The `{ok, error}` envelope Slack wraps every Web API response in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SlackAck {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body POSTed to a command's callback URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CallbackMessage {
    pub text: String,
}

/// Outbound-call seam. Both calls are single-attempt; retries would risk
/// duplicate dialogs and duplicate summary posts.
#[async_trait]
pub trait SlackGateway: Send + Sync {
    /// POST the dialog descriptor to the platform's dialog-open endpoint.
    async fn open_dialog(&self, request: &DialogOpenRequest) -> Result<SlackAck, GatewayError>;

    /// POST a message to a command's callback URL, returning the
    /// platform's decoded acknowledgement (used for logging only).
    async fn post_response(
        &self,
        response_url: &str,
        message: &CallbackMessage,
    ) -> Result<serde_json::Value, GatewayError>;
}

#[derive(Default)]
pub struct NoopSlackGateway;

#[async_trait]
impl SlackGateway for NoopSlackGateway {
    async fn open_dialog(&self, _request: &DialogOpenRequest) -> Result<SlackAck, GatewayError> {
        Ok(SlackAck { ok: true, error: None })
    }

    async fn post_response(
        &self,
        _response_url: &str,
        _message: &CallbackMessage,
    ) -> Result<serde_json::Value, GatewayError> {
        Ok(serde_json::json!({ "ok": true }))
    }
}

#[cfg(test)]
mod tests {
    use super::SlackAck;

    #[test]
    fn ack_decodes_both_success_and_failure_shapes() {
        let ok: SlackAck = serde_json::from_str(r#"{"ok":true}"#).expect("ok ack");
        assert!(ok.ok);
        assert_eq!(ok.error, None);

        let failed: SlackAck =
            serde_json::from_str(r#"{"ok":false,"error":"invalid_trigger_id"}"#).expect("err ack");
        assert!(!failed.ok);
        assert_eq!(failed.error.as_deref(), Some("invalid_trigger_id"));
    }
}
