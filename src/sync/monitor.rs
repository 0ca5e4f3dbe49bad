//! Decides when to ask the sync engine for a cycle.
//!
//! Two triggers: an offline-to-online transition on the connectivity
//! channel, and explicit "sync required" signals (e.g. from a background
//! update notification). The monitor itself does no debouncing; the
//! engine's Idle/Syncing gate deduplicates overlapping triggers.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use super::engine::SyncEngine;

/// Cloneable handle for feeding the monitor.
///
/// `set_online` stands in for the platform's network-status signal;
/// `request_sync` for a push-style "server has new data" message.
#[derive(Clone)]
pub struct ConnectivityHandle {
    online: Arc<watch::Sender<bool>>,
    sync_tx: mpsc::UnboundedSender<()>,
}

impl ConnectivityHandle {
    pub fn set_online(&self, online: bool) {
        self.online.send_replace(online);
    }

    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    pub fn request_sync(&self) {
        let _ = self.sync_tx.send(());
    }
}

/// Watches connectivity and sync-required signals until started, then
/// turns into a listener task.
pub struct ConnectivityMonitor {
    handle: ConnectivityHandle,
    online_rx: watch::Receiver<bool>,
    sync_rx: mpsc::UnboundedReceiver<()>,
}

impl ConnectivityMonitor {
    /// Create a monitor that starts out offline.
    pub fn new() -> Self {
        let (online_tx, online_rx) = watch::channel(false);
        let (sync_tx, sync_rx) = mpsc::unbounded_channel();
        Self {
            handle: ConnectivityHandle {
                online: Arc::new(online_tx),
                sync_tx,
            },
            online_rx,
            sync_rx,
        }
    }

    pub fn handle(&self) -> ConnectivityHandle {
        self.handle.clone()
    }

    /// The receiver the engine checks at trigger time.
    pub fn online_receiver(&self) -> watch::Receiver<bool> {
        self.online_rx.clone()
    }

    /// Spawn the listener task. The returned subscription stops it on
    /// `shutdown` or drop, so no listener outlives its owner.
    pub fn start(mut self, engine: Arc<SyncEngine>) -> MonitorSubscription {
        let task = tokio::spawn(async move {
            let mut was_online = *self.online_rx.borrow();
            loop {
                tokio::select! {
                    changed = self.online_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let now_online = *self.online_rx.borrow();
                        if now_online && !was_online {
                            debug!("connectivity restored, requesting sync");
                            let _ = engine.try_sync().await;
                        }
                        was_online = now_online;
                    }
                    signal = self.sync_rx.recv() => {
                        match signal {
                            Some(()) => {
                                debug!("sync requested by external signal");
                                let _ = engine.try_sync().await;
                            }
                            None => break,
                        }
                    }
                }
            }
        });

        MonitorSubscription { task }
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the listener task alive; aborting it is the teardown.
pub struct MonitorSubscription {
    task: JoinHandle<()>,
}

impl MonitorSubscription {
    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for MonitorSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, MetaRepository, QueueRepository, RecordStore};
    use crate::sync::remote::RemoteClient;
    use crate::sync::testserver::TestServer;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn setup_engine(server_url: &str, monitor: &ConnectivityMonitor) -> (Arc<SyncEngine>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = test_pool(temp_dir.path()).await;
        let engine = Arc::new(SyncEngine::new(
            RecordStore::new(pool.clone()),
            QueueRepository::new(pool.clone()),
            MetaRepository::new(pool),
            RemoteClient::new(server_url, None),
            monitor.online_receiver(),
        ));
        (engine, temp_dir)
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        for _ in 0..100 {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        condition()
    }

    #[tokio::test]
    async fn test_going_online_triggers_cycle() {
        let server = TestServer::start().await;
        let monitor = ConnectivityMonitor::new();
        let handle = monitor.handle();
        let (engine, _dir) = setup_engine(&server.url, &monitor).await;
        let _subscription = monitor.start(engine);

        assert!(!handle.is_online());
        handle.set_online(true);

        assert!(wait_until(|| server.push_count() == 1).await);
        assert_eq!(server.pull_count(), 1);
    }

    #[tokio::test]
    async fn test_staying_online_does_not_retrigger() {
        let server = TestServer::start().await;
        let monitor = ConnectivityMonitor::new();
        let handle = monitor.handle();
        let (engine, _dir) = setup_engine(&server.url, &monitor).await;
        let _subscription = monitor.start(engine);

        handle.set_online(true);
        assert!(wait_until(|| server.push_count() == 1).await);

        // Repeated online reports are not offline->online edges.
        handle.set_online(true);
        handle.set_online(true);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(server.push_count(), 1);

        // A real reconnect triggers again.
        handle.set_online(false);
        handle.set_online(true);
        assert!(wait_until(|| server.push_count() == 2).await);
    }

    #[tokio::test]
    async fn test_request_sync_triggers_cycle() {
        let server = TestServer::start().await;
        let monitor = ConnectivityMonitor::new();
        let handle = monitor.handle();
        let (engine, _dir) = setup_engine(&server.url, &monitor).await;
        let _subscription = monitor.start(engine);

        handle.set_online(true);
        assert!(wait_until(|| server.push_count() == 1).await);

        handle.request_sync();
        assert!(wait_until(|| server.push_count() == 2).await);
    }

    #[tokio::test]
    async fn test_request_sync_while_offline_is_dropped() {
        let server = TestServer::start().await;
        let monitor = ConnectivityMonitor::new();
        let handle = monitor.handle();
        let (engine, _dir) = setup_engine(&server.url, &monitor).await;
        let _subscription = monitor.start(engine);

        handle.request_sync();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(server.push_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_stops_triggering() {
        let server = TestServer::start().await;
        let monitor = ConnectivityMonitor::new();
        let handle = monitor.handle();
        let (engine, _dir) = setup_engine(&server.url, &monitor).await;
        let subscription = monitor.start(engine);

        handle.set_online(true);
        assert!(wait_until(|| server.push_count() == 1).await);

        subscription.shutdown();
        handle.set_online(false);
        handle.set_online(true);
        handle.request_sync();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(server.push_count(), 1);
    }
}
