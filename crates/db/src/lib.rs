pub mod connection;
pub mod expiry;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use repositories::{InMemoryWinRepository, RepositoryError, SqlWinRepository, WinRepository};
