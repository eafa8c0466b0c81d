use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use kudos_slack::dialog::DialogOpenRequest;
use kudos_slack::gateway::{CallbackMessage, GatewayError, SlackAck, SlackGateway};

pub const DIALOG_OPEN_ENDPOINT: &str = "https://slack.com/api/dialog.open";

/// reqwest-backed gateway: one attempt per call, transport-default
/// timeouts, bearer auth from configuration.
pub struct HttpSlackGateway {
    client: Client,
    access_token: SecretString,
    dialog_open_url: String,
}

impl HttpSlackGateway {
    pub fn new(access_token: SecretString) -> Self {
        Self::with_dialog_endpoint(access_token, DIALOG_OPEN_ENDPOINT)
    }

    /// Endpoint override used by tests pointed at a local fixture server.
    pub fn with_dialog_endpoint(
        access_token: SecretString,
        dialog_open_url: impl Into<String>,
    ) -> Self {
        Self { client: Client::new(), access_token, dialog_open_url: dialog_open_url.into() }
    }
}

#[async_trait]
impl SlackGateway for HttpSlackGateway {
    async fn open_dialog(&self, request: &DialogOpenRequest) -> Result<SlackAck, GatewayError> {
        let response = self
            .client
            .post(&self.dialog_open_url)
            .bearer_auth(self.access_token.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|error| GatewayError::Send(error.to_string()))?;

        response
            .json::<SlackAck>()
            .await
            .map_err(|error| GatewayError::Decode(error.to_string()))
    }

    async fn post_response(
        &self,
        response_url: &str,
        message: &CallbackMessage,
    ) -> Result<serde_json::Value, GatewayError> {
        let response = self
            .client
            .post(response_url)
            .bearer_auth(self.access_token.expose_secret())
            .json(message)
            .send()
            .await
            .map_err(|error| GatewayError::Send(error.to_string()))?;

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|error| GatewayError::Decode(error.to_string()))
    }
}
