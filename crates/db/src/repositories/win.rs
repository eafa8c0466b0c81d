use chrono::{DateTime, Utc};
use sqlx::Row;

use kudos_core::domain::{Win, WinId};

use super::{RepositoryError, WinRepository};
use crate::DbPool;

/// sqlx-backed win store. The table name comes from configuration and has
/// been validated to a plain identifier before it reaches this type.
pub struct SqlWinRepository {
    pool: DbPool,
    table: String,
}

impl SqlWinRepository {
    pub fn new(pool: DbPool, table: impl Into<String>) -> Self {
        Self { pool, table: table.into() }
    }
}

#[async_trait::async_trait]
impl WinRepository for SqlWinRepository {
    async fn save(&self, win: Win) -> Result<(), RepositoryError> {
        let sql = format!(
            "INSERT INTO {} \
             (id, user_id, user_name, who, title, description, created_at, updated_at, expires_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.table
        );

        sqlx::query(&sql)
            .bind(&win.id.0)
            .bind(&win.user_id)
            .bind(&win.user_name)
            .bind(&win.who)
            .bind(&win.title)
            .bind(&win.description)
            .bind(win.created_at.to_rfc3339())
            .bind(win.updated_at.to_rfc3339())
            .bind(win.expires_at.timestamp())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn scan_all(&self) -> Result<Vec<Win>, RepositoryError> {
        let sql = format!(
            "SELECT id, user_id, user_name, who, title, description, \
             created_at, updated_at, expires_at \
             FROM {} WHERE expires_at > ?",
            self.table
        );

        let rows = sqlx::query(&sql).bind(Utc::now().timestamp()).fetch_all(&self.pool).await?;
        rows.iter().map(decode_win).collect()
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let sql = format!("DELETE FROM {} WHERE expires_at <= ?", self.table);
        let result = sqlx::query(&sql).bind(now.timestamp()).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

fn decode_win(row: &sqlx::sqlite::SqliteRow) -> Result<Win, RepositoryError> {
    let expires_at_epoch = row.try_get::<i64, _>("expires_at")?;
    let expires_at = DateTime::<Utc>::from_timestamp(expires_at_epoch, 0)
        .ok_or_else(|| RepositoryError::Decode(format!("expires_at `{expires_at_epoch}`")))?;

    Ok(Win {
        id: WinId(row.try_get::<String, _>("id")?),
        user_id: row.try_get::<String, _>("user_id")?,
        user_name: row.try_get::<String, _>("user_name")?,
        who: row.try_get::<String, _>("who")?,
        title: row.try_get::<String, _>("title")?,
        description: row.try_get::<String, _>("description")?,
        created_at: decode_timestamp(row, "created_at")?,
        updated_at: decode_timestamp(row, "updated_at")?,
        expires_at,
    })
}

fn decode_timestamp(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<DateTime<Utc>, RepositoryError> {
    let raw = row.try_get::<String, _>(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("{column} `{raw}`: {error}")))
}
