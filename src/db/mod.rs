mod meta_repo;
mod queue_repo;
mod record_store;

pub use meta_repo::{MetaRepository, LAST_SYNC_KEY};
pub use queue_repo::QueueRepository;
pub use record_store::RecordStore;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use std::str::FromStr;

/// Errors from the local record store.
///
/// Storage failures are reported to the caller and logged; they abort at
/// most the current command or sync cycle, never the process.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/sqlx failure (store unavailable, disk full, ...)
    Database(sqlx::Error),
    /// Record payload could not be serialized or deserialized
    Serialize(serde_json::Error),
    /// Filesystem failure while preparing the database location
    Io(std::io::Error),
    /// Stored row no longer parses into its model
    Corrupt(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Storage error: {}", e),
            StoreError::Serialize(e) => write!(f, "Record serialization error: {}", e),
            StoreError::Io(e) => write!(f, "Storage I/O error: {}", e),
            StoreError::Corrupt(msg) => write!(f, "Corrupt stored data: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            StoreError::Serialize(e) => Some(e),
            StoreError::Io(e) => Some(e),
            StoreError::Corrupt(_) => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialize(e)
    }
}

/// Initialize the database connection pool and run migrations.
pub async fn init_db(db_path: PathBuf) -> Result<SqlitePool, StoreError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(StoreError::Io)?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StoreError::Database(e.into()))?;

    Ok(pool)
}

#[cfg(test)]
pub(crate) async fn test_pool(dir: &std::path::Path) -> SqlitePool {
    init_db(dir.join("test.db")).await.unwrap()
}
