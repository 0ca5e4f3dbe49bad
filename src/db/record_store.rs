use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::SqlitePool;

use super::StoreError;
use crate::models::{Collection, Record};

/// Durable keyed storage for the tracked collections.
///
/// Records are stored as JSON text keyed by `(collection, id)`. All
/// operations are idempotent: `put` overwrites silently, `delete` of a
/// missing id is a no-op, `get_all` of an empty collection returns an empty
/// vec. That is what lets an aborted sync cycle be retried from scratch.
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert a typed record into its collection.
    pub async fn put<T: Record>(&self, record: &T) -> Result<(), StoreError> {
        let payload = serde_json::to_value(record)?;
        self.put_raw(T::COLLECTION, record.id(), &payload).await
    }

    /// Upsert an opaque record under an explicit collection and id.
    ///
    /// This is the merge path: pulled server records are applied without
    /// ever deserializing into a model.
    pub async fn put_raw(
        &self,
        collection: Collection,
        id: &str,
        payload: &Value,
    ) -> Result<(), StoreError> {
        let text = serde_json::to_string(payload)?;
        sqlx::query(
            r#"
            INSERT INTO records (collection, id, payload)
            VALUES (?, ?, ?)
            ON CONFLICT (collection, id) DO UPDATE SET payload = excluded.payload
            "#,
        )
        .bind(collection.name())
        .bind(id)
        .bind(text)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// All records of a collection as raw JSON. Ordering is unspecified.
    pub async fn get_all_raw(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT payload FROM records WHERE collection = ?")
            .bind(collection.name())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(payload,)| serde_json::from_str(&payload).map_err(StoreError::from))
            .collect()
    }

    /// All records of a collection, deserialized into their model type.
    pub async fn get_all<T>(&self) -> Result<Vec<T>, StoreError>
    where
        T: Record + DeserializeOwned,
    {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT payload FROM records WHERE collection = ?")
            .bind(T::COLLECTION.name())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(payload,)| serde_json::from_str(&payload).map_err(StoreError::from))
            .collect()
    }

    /// Remove a record if present; absent ids are not an error.
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM records WHERE collection = ? AND id = ?")
            .bind(collection.name())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every record in a collection. Only the explicit data-reset
    /// path does this to domain collections.
    pub async fn clear(&self, collection: Collection) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM records WHERE collection = ?")
            .bind(collection.name())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
