//! Sync CLI commands for synchronizing with the server.

use clap::{Args, Subcommand};
use sqlx::SqlitePool;
use tokio::sync::watch;

use crate::config::Config;
use crate::db::{MetaRepository, QueueRepository, RecordStore, LAST_SYNC_KEY};
use crate::sync::{RemoteClient, SyncEngine, SyncOutcome};

/// Sync with remote server
#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Subcommand)]
enum SyncSubcommand {
    /// Show sync configuration, cursor, and queued changes
    Status,
}

impl SyncCommand {
    pub async fn run(
        &self,
        pool: &SqlitePool,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            None => self.sync(pool, config).await,
            Some(SyncSubcommand::Status) => self.status(pool, config).await,
        }
    }

    async fn sync(
        &self,
        pool: &SqlitePool,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let remote = RemoteClient::from_config(&config.sync)?;
        println!("Syncing with {}...", remote.server_url());

        // An explicit `sync` invocation means the user believes we are
        // online; a dead connection just fails the cycle.
        let (_online, online_rx) = watch::channel(true);
        let engine = SyncEngine::new(
            RecordStore::new(pool.clone()),
            QueueRepository::new(pool.clone()),
            MetaRepository::new(pool.clone()),
            remote,
            online_rx,
        );

        match engine.try_sync().await {
            SyncOutcome::Completed(report) => {
                println!();
                println!("  ✓ pushed {} record(s)", report.pushed);
                println!("  ✓ merged {} change(s) from server", report.merged);
                println!("  ✓ drained {} queued change(s)", report.drained);
                println!();
                println!("Sync complete (cursor {}).", report.cursor);
                Ok(())
            }
            SyncOutcome::Failed => {
                Err("Sync failed; local changes remain queued. See log for details.".into())
            }
            SyncOutcome::AlreadySyncing | SyncOutcome::Offline => {
                println!("Sync skipped.");
                Ok(())
            }
        }
    }

    async fn status(
        &self,
        pool: &SqlitePool,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        println!("Sync Configuration");
        println!("==================");
        println!();

        if !config.sync.is_configured() {
            println!("Status: Not configured");
            println!();
            println!("To enable sync, add to your config file:");
            println!();
            println!("  sync:");
            println!("    server_url: \"https://sync.example.com\"");
            println!("    api_key: \"your-api-key\"");
            println!("    auto_sync: false");
            println!();
            println!("Or set environment variables:");
            println!("  LIFETILES_SYNC_URL");
            println!("  LIFETILES_SYNC_API_KEY");
            return Ok(());
        }

        let server_url = config.sync.server_url.as_ref().unwrap();
        println!("Server:    {}", server_url);
        if let Some(api_key) = &config.sync.api_key {
            println!("API Key:   {}...", &api_key[..api_key.len().min(8)]);
        }
        println!(
            "Auto-sync: {}",
            if config.sync.auto_sync {
                "enabled"
            } else {
                "disabled"
            }
        );
        println!();

        let meta = MetaRepository::new(pool.clone());
        match meta.get(LAST_SYNC_KEY).await? {
            Some(cursor) => println!("Last sync: {}", cursor),
            None => println!("Last sync: never"),
        }

        let queue = QueueRepository::new(pool.clone());
        let depth = queue.depth().await?;
        if depth == 0 {
            println!("Queued changes: none");
        } else {
            println!("Queued changes: {} awaiting sync", depth);
        }

        Ok(())
    }
}
