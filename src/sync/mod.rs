//! Offline-first synchronization with the remote sync endpoint.
//!
//! The local record store is the source of truth while offline; this module
//! reconciles it with the server once connectivity returns. One cycle pushes
//! the full local state, pulls server-side changes since the persisted
//! cursor, merges them by overwrite-by-id, then advances the cursor and
//! drains the pending-change queue.

mod engine;
mod monitor;
mod remote;

#[cfg(test)]
pub(crate) mod testserver;

pub use engine::{SyncEngine, SyncError, SyncOutcome, SyncReport};
pub use monitor::{ConnectivityHandle, ConnectivityMonitor, MonitorSubscription};
pub use remote::{CollectionSet, PullResponse, RemoteClient, RemoteError};

use sqlx::SqlitePool;
use tokio::sync::watch;

use crate::config::Config;
use crate::db::{MetaRepository, QueueRepository, RecordStore};

/// Run a sync cycle after a mutation if `auto_sync` is enabled.
///
/// Failures degrade gracefully: the mutation already succeeded locally and
/// stays queued, so an unreachable server only means the work syncs later.
pub async fn try_auto_sync(config: &Config, pool: &SqlitePool) {
    if !config.sync.auto_sync || !config.sync.is_configured() {
        return;
    }

    let remote = match RemoteClient::from_config(&config.sync) {
        Ok(remote) => remote,
        Err(_) => return,
    };

    // Being able to attempt the request counts as online here; a refused
    // connection is just a failed cycle.
    let (_online, online_rx) = watch::channel(true);
    let engine = SyncEngine::new(
        RecordStore::new(pool.clone()),
        QueueRepository::new(pool.clone()),
        MetaRepository::new(pool.clone()),
        remote,
        online_rx,
    );

    if let SyncOutcome::Failed = engine.try_sync().await {
        eprintln!("Auto-sync failed; changes remain queued");
    }
}
