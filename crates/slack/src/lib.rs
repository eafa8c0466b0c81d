//! Slack Integration - the WINS interaction protocol
//!
//! This crate implements the three entry points the chat platform invokes:
//! - **Command Intake** (`commands`) - `/wins` verification, summary
//!   routing, dialog open
//! - **Dialog Capture** (`interaction`) - submitted dialog → persisted win
//! - **Summary Aggregator** (`summary`) - store scan → report → callback
//!   delivery
//! - **Help Responder** (`help`) - static usage message
//!
//! Supporting modules:
//! - `proxy` - the HTTP-shaped request/response envelope exchanged with
//!   the hosting layer
//! - `dialog` - `dialog.open` wire descriptors
//! - `gateway` - outbound-call seam; the real HTTP client is injected by
//!   the server
//!
//! # Architecture
//!
//! ```text
//! hosting layer → ApiRequest → handler → store / SlackGateway
//!                                  ↓
//!                            ApiResponse
//! ```
//!
//! Handlers are stateless; every invocation runs decode → validate →
//! store call → outbound call → respond, strictly in that order.

pub mod commands;
pub mod dialog;
pub mod gateway;
pub mod help;
pub mod interaction;
pub mod proxy;
pub mod summary;
