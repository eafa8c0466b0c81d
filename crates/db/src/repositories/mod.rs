use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use kudos_core::domain::Win;

pub mod memory;
pub mod win;

pub use memory::InMemoryWinRepository;
pub use win::SqlWinRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Store access for win records. Reads never return rows whose expiry
/// instant has elapsed, whether or not the sweeper has removed them yet.
#[async_trait]
pub trait WinRepository: Send + Sync {
    async fn save(&self, win: Win) -> Result<(), RepositoryError>;
    async fn scan_all(&self) -> Result<Vec<Win>, RepositoryError>;
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError>;
}
