pub mod config;
pub mod domain;
pub mod errors;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use domain::{Win, WinId, WinSubmission, DEFAULT_DESCRIPTION, WIN_TTL_SECONDS};
pub use errors::DomainError;
