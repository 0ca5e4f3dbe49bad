use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::StoreError;
use crate::models::PendingChange;

/// Durable queue of local mutations not yet confirmed synced.
///
/// Entries are appended alongside every local write and removed only by
/// `clear`, which the sync engine calls after a fully successful cycle.
pub struct QueueRepository {
    pool: SqlitePool,
}

impl QueueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a pending change. Entry ids are unique, so a replayed append
    /// of the same entry overwrites rather than duplicating.
    pub async fn append(&self, change: &PendingChange) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&change.payload)?;
        sqlx::query(
            r#"
            INSERT INTO sync_queue (id, action, collection, payload, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                action = excluded.action,
                payload = excluded.payload
            "#,
        )
        .bind(&change.id)
        .bind(change.action.to_string())
        .bind(change.collection.name())
        .bind(payload)
        .bind(change.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// All pending changes, oldest first.
    pub async fn all(&self) -> Result<Vec<PendingChange>, StoreError> {
        let rows: Vec<(String, String, String, String, String)> = sqlx::query_as(
            "SELECT id, action, collection, payload, created_at FROM sync_queue ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, action, collection, payload, created_at)| {
                Ok(PendingChange {
                    id,
                    action: action.parse().map_err(StoreError::Corrupt)?,
                    collection: collection.parse().map_err(StoreError::Corrupt)?,
                    payload: serde_json::from_str(&payload)?,
                    created_at: DateTime::parse_from_rfc3339(&created_at)
                        .map_err(|e| StoreError::Corrupt(format!("bad queue timestamp: {}", e)))?
                        .with_timezone(&Utc),
                })
            })
            .collect()
    }

    /// Number of unconfirmed entries.
    pub async fn depth(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sync_queue")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Drop every entry. Called by the sync engine once a cycle has fully
    /// succeeded, and by explicit data reset.
    pub async fn clear(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sync_queue")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
