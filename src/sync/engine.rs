//! The sync engine: one push-then-pull cycle at a time.
//!
//! A cycle snapshots every local collection, pushes the snapshot in one
//! request, pulls server-side changes since the persisted cursor, merges
//! them by unconditional upsert, advances the cursor, and drains the queue.
//! Any failure aborts the remaining steps without touching cursor or queue;
//! the next trigger retries from scratch, which is safe because push and
//! merge are both idempotent.

use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::db::{MetaRepository, QueueRepository, RecordStore, StoreError, LAST_SYNC_KEY};
use crate::models::Collection;

use super::remote::{CollectionSet, RemoteClient, RemoteError};

/// Result of asking the engine for a cycle.
#[derive(Debug)]
pub enum SyncOutcome {
    /// A full cycle ran and succeeded.
    Completed(SyncReport),
    /// A cycle was already in flight; this trigger was dropped.
    AlreadySyncing,
    /// Connectivity was offline at trigger time; no cycle started.
    Offline,
    /// The cycle started but aborted part-way. Details are logged, never
    /// propagated; cursor and queue are untouched.
    Failed,
}

/// What a completed cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    /// Records pushed across all collections.
    pub pushed: usize,
    /// Records merged from the pull response.
    pub merged: usize,
    /// The new sync cursor.
    pub cursor: String,
    /// Queue entries drained.
    pub drained: u64,
}

#[derive(Debug)]
pub enum SyncError {
    Store(StoreError),
    Remote(RemoteError),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Store(e) => write!(f, "{}", e),
            SyncError::Remote(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Store(e) => Some(e),
            SyncError::Remote(e) => Some(e),
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        SyncError::Store(e)
    }
}

impl From<RemoteError> for SyncError {
    fn from(e: RemoteError) -> Self {
        SyncError::Remote(e)
    }
}

/// Owns the cursor and queue lifecycle and the Idle/Syncing gate.
///
/// All state is per-instance; two engines (e.g. in tests) never interfere.
pub struct SyncEngine {
    store: RecordStore,
    queue: QueueRepository,
    meta: MetaRepository,
    remote: RemoteClient,
    online: watch::Receiver<bool>,
    syncing: AtomicBool,
}

impl SyncEngine {
    pub fn new(
        store: RecordStore,
        queue: QueueRepository,
        meta: MetaRepository,
        remote: RemoteClient,
        online: watch::Receiver<bool>,
    ) -> Self {
        Self {
            store,
            queue,
            meta,
            remote,
            online,
            syncing: AtomicBool::new(false),
        }
    }

    /// Request one cycle. Errors are handled here: logged, swallowed, and
    /// reported only as `SyncOutcome::Failed`.
    pub async fn try_sync(&self) -> SyncOutcome {
        if !*self.online.borrow() {
            debug!("sync requested while offline, skipping");
            return SyncOutcome::Offline;
        }

        // Idle -> Syncing; a trigger that loses the race is dropped, the
        // next natural trigger starts a fresh cycle.
        if self.syncing.swap(true, Ordering::SeqCst) {
            debug!("sync already in progress, dropping trigger");
            return SyncOutcome::AlreadySyncing;
        }

        let result = self.run_cycle().await;
        self.syncing.store(false, Ordering::SeqCst);

        match result {
            Ok(report) => {
                info!(
                    pushed = report.pushed,
                    merged = report.merged,
                    drained = report.drained,
                    cursor = %report.cursor,
                    "sync cycle complete"
                );
                SyncOutcome::Completed(report)
            }
            Err(e) => {
                warn!(error = %e, "sync cycle aborted");
                SyncOutcome::Failed
            }
        }
    }

    async fn run_cycle(&self) -> Result<SyncReport, SyncError> {
        // Snapshot all collections.
        let mut snapshot = CollectionSet::default();
        for collection in Collection::ALL {
            *snapshot.records_mut(collection) = self.store.get_all_raw(collection).await?;
        }
        let pushed = snapshot.total();

        // Push the full snapshot; the server upserts by id, so a re-push
        // after a later failure is harmless.
        self.remote.push(&snapshot).await?;

        // Pull changes since the persisted cursor, or everything on the
        // first-ever sync.
        let since = self.meta.get(LAST_SYNC_KEY).await?;
        let response = self.remote.pull(since.as_deref()).await?;

        // Merge: the server's copy wins for every id it returned. It is
        // assumed to have already reconciled concurrent writes from other
        // devices; a record edited offline on two devices loses one side
        // here with no audit trail.
        let mut merged = 0;
        for collection in Collection::ALL {
            for record in response.collections.records(collection) {
                match record.get("id").and_then(Value::as_str) {
                    Some(id) => {
                        self.store.put_raw(collection, id, record).await?;
                        merged += 1;
                    }
                    None => {
                        warn!(collection = %collection, "pulled record has no string id, skipping");
                    }
                }
            }
        }

        // Cursor advance and queue drain happen only after everything else
        // succeeded; an abort above leaves both exactly as they were.
        self.meta.set(LAST_SYNC_KEY, &response.timestamp).await?;
        let drained = self.queue.clear().await?;

        Ok(SyncReport {
            pushed,
            merged,
            cursor: response.timestamp,
            drained,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::{PendingChange, SyncAction};
    use crate::sync::testserver::TestServer;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    struct TestContext {
        engine: Arc<SyncEngine>,
        store: RecordStore,
        queue: QueueRepository,
        meta: MetaRepository,
        online: watch::Sender<bool>,
        _temp_dir: TempDir,
    }

    async fn setup_engine(server_url: &str) -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let pool = test_pool(temp_dir.path()).await;
        let (online, online_rx) = watch::channel(true);

        let engine = Arc::new(SyncEngine::new(
            RecordStore::new(pool.clone()),
            QueueRepository::new(pool.clone()),
            MetaRepository::new(pool.clone()),
            RemoteClient::new(server_url, None),
            online_rx,
        ));

        TestContext {
            engine,
            store: RecordStore::new(pool.clone()),
            queue: QueueRepository::new(pool.clone()),
            meta: MetaRepository::new(pool),
            online,
            _temp_dir: temp_dir,
        }
    }

    async fn seed_queued_alcohol_log(ctx: &TestContext) {
        ctx.store
            .put_raw(
                Collection::AlcoholLogs,
                "a1",
                &json!({"id": "a1", "standard_drinks": 1.5}),
            )
            .await
            .unwrap();
        ctx.queue
            .append(&PendingChange::new(
                SyncAction::Create,
                Collection::AlcoholLogs,
                json!({"id": "a1", "standard_drinks": 1.5}),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_full_cycle_merges_and_drains() {
        let server = TestServer::start().await;
        let ctx = setup_engine(&server.url).await;
        seed_queued_alcohol_log(&ctx).await;

        server.state.lock().unwrap().pull_body = json!({
            "alcohol_logs": [
                {"id": "a1", "standard_drinks": 1.5},
                {"id": "a2", "standard_drinks": 2.0},
            ],
            "timestamp": "2025-01-01T00:00:00Z",
        });

        let outcome = ctx.engine.try_sync().await;
        let report = match outcome {
            SyncOutcome::Completed(report) => report,
            other => panic!("expected completed cycle, got {:?}", other),
        };
        assert_eq!(report.pushed, 1);
        assert_eq!(report.merged, 2);
        assert_eq!(report.drained, 1);

        let alcohol = ctx.store.get_all_raw(Collection::AlcoholLogs).await.unwrap();
        let mut ids: Vec<&str> = alcohol.iter().map(|r| r["id"].as_str().unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, ["a1", "a2"]);

        assert_eq!(
            ctx.meta.get(LAST_SYNC_KEY).await.unwrap().as_deref(),
            Some("2025-01-01T00:00:00Z")
        );
        assert_eq!(ctx.queue.depth().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_push_snapshot_carries_all_collections() {
        let server = TestServer::start().await;
        let ctx = setup_engine(&server.url).await;
        ctx.store
            .put_raw(Collection::SleepLogs, "s1", &json!({"id": "s1"}))
            .await
            .unwrap();
        ctx.store
            .put_raw(Collection::SpendingLogs, "sp1", &json!({"id": "sp1"}))
            .await
            .unwrap();

        ctx.engine.try_sync().await;

        let pushes = server.state.lock().unwrap().pushes.clone();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].sleep_logs.len(), 1);
        assert_eq!(pushes[0].spending_logs.len(), 1);
        assert!(pushes[0].alcohol_logs.is_empty());
    }

    #[tokio::test]
    async fn test_first_sync_omits_since_then_sends_cursor() {
        let server = TestServer::start().await;
        let ctx = setup_engine(&server.url).await;

        ctx.engine.try_sync().await;
        ctx.engine.try_sync().await;

        let pulls = server.state.lock().unwrap().pulls.clone();
        assert_eq!(pulls.len(), 2);
        assert_eq!(pulls[0], None);
        assert_eq!(pulls[1].as_deref(), Some("2025-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn test_push_failure_aborts_before_pull() {
        let server = TestServer::start().await;
        let ctx = setup_engine(&server.url).await;
        seed_queued_alcohol_log(&ctx).await;
        ctx.meta.set(LAST_SYNC_KEY, "2024-12-31T00:00:00Z").await.unwrap();
        server.state.lock().unwrap().push_status = 500;

        let outcome = ctx.engine.try_sync().await;
        assert!(matches!(outcome, SyncOutcome::Failed));

        // No pull was issued, nothing was mutated.
        assert_eq!(server.pull_count(), 0);
        assert_eq!(
            ctx.meta.get(LAST_SYNC_KEY).await.unwrap().as_deref(),
            Some("2024-12-31T00:00:00Z")
        );
        assert_eq!(ctx.queue.depth().await.unwrap(), 1);

        // The gate is back at Idle: a later trigger runs a fresh cycle.
        server.state.lock().unwrap().push_status = 200;
        assert!(matches!(
            ctx.engine.try_sync().await,
            SyncOutcome::Completed(_)
        ));
    }

    #[tokio::test]
    async fn test_pull_failure_leaves_cursor_and_queue() {
        let server = TestServer::start().await;
        let ctx = setup_engine(&server.url).await;
        seed_queued_alcohol_log(&ctx).await;
        server.state.lock().unwrap().pull_status = 503;

        let outcome = ctx.engine.try_sync().await;
        assert!(matches!(outcome, SyncOutcome::Failed));

        // Push already happened; the retry re-pushing is harmless.
        assert_eq!(server.push_count(), 1);
        assert_eq!(ctx.meta.get(LAST_SYNC_KEY).await.unwrap(), None);
        assert_eq!(ctx.queue.depth().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_offline_skips_cycle() {
        let server = TestServer::start().await;
        let ctx = setup_engine(&server.url).await;
        ctx.online.send_replace(false);

        let outcome = ctx.engine.try_sync().await;
        assert!(matches!(outcome, SyncOutcome::Offline));
        assert_eq!(server.push_count(), 0);
        assert_eq!(server.pull_count(), 0);
    }

    #[tokio::test]
    async fn test_second_trigger_during_cycle_is_dropped() {
        let server = TestServer::start().await;
        let ctx = setup_engine(&server.url).await;
        server.state.lock().unwrap().push_delay = Duration::from_millis(300);

        let engine = ctx.engine.clone();
        let first = tokio::spawn(async move { engine.try_sync().await });

        // Let the first cycle reach its in-flight push, then trigger again.
        tokio::time::sleep(Duration::from_millis(80)).await;
        let second = ctx.engine.try_sync().await;
        assert!(matches!(second, SyncOutcome::AlreadySyncing));

        let first = first.await.unwrap();
        assert!(matches!(first, SyncOutcome::Completed(_)));

        // Exactly one push/pull sequence was observed.
        assert_eq!(server.push_count(), 1);
        assert_eq!(server.pull_count(), 1);
    }

    #[tokio::test]
    async fn test_merge_is_idempotent() {
        let server = TestServer::start().await;
        let ctx = setup_engine(&server.url).await;
        server.state.lock().unwrap().pull_body = json!({
            "nutrition_logs": [{"id": "n1", "calories": 400}],
            "timestamp": "2025-01-01T00:00:00Z",
        });

        ctx.engine.try_sync().await;
        let after_first = ctx.store.get_all_raw(Collection::NutritionLogs).await.unwrap();
        ctx.engine.try_sync().await;
        let after_second = ctx.store.get_all_raw(Collection::NutritionLogs).await.unwrap();

        assert_eq!(after_first, after_second);
        assert_eq!(after_second.len(), 1);
        assert_eq!(after_second[0]["calories"], 400);
    }

    #[tokio::test]
    async fn test_pulled_record_without_id_is_skipped() {
        let server = TestServer::start().await;
        let ctx = setup_engine(&server.url).await;
        server.state.lock().unwrap().pull_body = json!({
            "exercise_logs": [
                {"id": "e1", "exercise_type": "Running"},
                {"exercise_type": "no id on this one"},
            ],
            "timestamp": "2025-01-01T00:00:00Z",
        });

        let outcome = ctx.engine.try_sync().await;
        let report = match outcome {
            SyncOutcome::Completed(report) => report,
            other => panic!("expected completed cycle, got {:?}", other),
        };

        // The malformed record is dropped; the cycle still completes and
        // advances the cursor.
        assert_eq!(report.merged, 1);
        assert_eq!(
            ctx.store
                .get_all_raw(Collection::ExerciseLogs)
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(ctx.meta.get(LAST_SYNC_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_server_copy_wins_on_merge() {
        let server = TestServer::start().await;
        let ctx = setup_engine(&server.url).await;
        ctx.store
            .put_raw(
                Collection::SpendingLogs,
                "sp1",
                &json!({"id": "sp1", "amount": 5.0}),
            )
            .await
            .unwrap();
        server.state.lock().unwrap().pull_body = json!({
            "spending_logs": [{"id": "sp1", "amount": 12.0}],
            "timestamp": "2025-01-01T00:00:00Z",
        });

        ctx.engine.try_sync().await;

        let spending = ctx.store.get_all_raw(Collection::SpendingLogs).await.unwrap();
        assert_eq!(spending.len(), 1);
        assert_eq!(spending[0]["amount"], 12.0);
    }
}
