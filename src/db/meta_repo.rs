use sqlx::SqlitePool;

use super::StoreError;

/// Key under which the sync cursor is persisted.
pub const LAST_SYNC_KEY: &str = "lastSync";

/// Small key-value slots persisted outside the record collections.
///
/// Holds the sync cursor; the sync engine is the only writer of that slot.
pub struct MetaRepository {
    pool: SqlitePool,
}

impl MetaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM sync_meta WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT OR REPLACE INTO sync_meta (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove a slot if present. Only the explicit data-reset path removes
    /// the sync cursor.
    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sync_meta WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
