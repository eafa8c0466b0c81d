//! Hosting-layer routing: each Slack entry point gets its raw form body
//! wrapped in an `ApiRequest`, and the handler's `ApiResponse` is mapped
//! back onto the HTTP response verbatim.
//!
//! Endpoints:
//! - `POST /slack/command`     — Command Intake (`/wins`)
//! - `POST /slack/interactive` — Dialog Capture
//! - `POST /slack/help`        — Help Responder

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

use kudos_db::repositories::WinRepository;
use kudos_slack::commands::CommandIntake;
use kudos_slack::gateway::SlackGateway;
use kudos_slack::help::HelpResponder;
use kudos_slack::interaction::DialogCapture;
use kudos_slack::proxy::{ApiRequest, ApiResponse};

pub struct AppState<R, G> {
    pub command_intake: Arc<CommandIntake<R, G>>,
    pub dialog_capture: Arc<DialogCapture<R>>,
    pub help_responder: Arc<HelpResponder>,
}

impl<R, G> Clone for AppState<R, G> {
    fn clone(&self) -> Self {
        Self {
            command_intake: self.command_intake.clone(),
            dialog_capture: self.dialog_capture.clone(),
            help_responder: self.help_responder.clone(),
        }
    }
}

pub fn router<R, G>(state: AppState<R, G>) -> Router
where
    R: WinRepository + 'static,
    G: SlackGateway + 'static,
{
    Router::new()
        .route("/slack/command", post(command::<R, G>))
        .route("/slack/interactive", post(interactive::<R, G>))
        .route("/slack/help", post(help::<R, G>))
        .with_state(state)
}

async fn command<R, G>(State(state): State<AppState<R, G>>, body: String) -> Response
where
    R: WinRepository + 'static,
    G: SlackGateway + 'static,
{
    into_http(state.command_intake.handle(&ApiRequest::new(body)).await)
}

async fn interactive<R, G>(State(state): State<AppState<R, G>>, body: String) -> Response
where
    R: WinRepository + 'static,
    G: SlackGateway + 'static,
{
    into_http(state.dialog_capture.handle(&ApiRequest::new(body)).await)
}

async fn help<R, G>(State(state): State<AppState<R, G>>, body: String) -> Response
where
    R: WinRepository + 'static,
    G: SlackGateway + 'static,
{
    into_http(state.help_responder.handle(&ApiRequest::new(body)))
}

fn into_http(response: ApiResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder().status(status);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder
        .body(Body::from(response.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
