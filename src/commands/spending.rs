use clap::{Args, Subcommand};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::{QueueRepository, RecordStore};
use crate::models::{
    resolve_category, Collection, PendingChange, SpendingLog, SyncAction, SPENDING_CATEGORIES,
};
use crate::sync;

use super::{parse_date_or_today, DateFilter, OutputFormat};

/// Track spending
#[derive(Args)]
pub struct SpendingCommand {
    #[command(subcommand)]
    pub command: SpendingSubcommand,
}

#[derive(Subcommand)]
pub enum SpendingSubcommand {
    /// Log an expense
    Add {
        /// Amount spent
        amount: f64,

        /// Category (see `spending categories`)
        category: String,

        /// Optional note
        #[arg(long, short)]
        notes: Option<String>,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// List expenses
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only show this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Delete an expense by id
    Delete { id: String },

    /// Show the fixed category list
    Categories,
}

impl SpendingCommand {
    pub async fn run(
        &self,
        pool: &SqlitePool,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let store = RecordStore::new(pool.clone());
        let queue = QueueRepository::new(pool.clone());

        match &self.command {
            SpendingSubcommand::Add {
                amount,
                category,
                notes,
                date,
            } => {
                let date = parse_date_or_today(date)?;
                let category = resolve_category(category).ok_or_else(|| {
                    format!(
                        "Unknown category '{}'. Valid options: {}",
                        category,
                        SPENDING_CATEGORIES.join(", ")
                    )
                })?;

                let mut log = SpendingLog::new(*amount, category, date);
                if let Some(n) = notes {
                    log = log.with_notes(n);
                }
                store.put(&log).await?;
                queue
                    .append(&PendingChange::new(
                        SyncAction::Create,
                        Collection::SpendingLogs,
                        serde_json::to_value(&log)?,
                    ))
                    .await?;

                println!("Logged {:.2} on {}", log.amount, log.category);
                println!("Log ID: {}", log.id);

                sync::try_auto_sync(config, pool).await;
                Ok(())
            }

            SpendingSubcommand::List {
                format,
                date,
                from,
                to,
            } => {
                let filter = DateFilter::parse(date, from, to)?;
                let mut logs: Vec<SpendingLog> = store.get_all().await?;
                logs.retain(|l| filter.contains(l.date));
                logs.sort_by(|a, b| a.logged_at.cmp(&b.logged_at));

                if logs.is_empty() {
                    println!("No spending logs found.");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&logs)?);
                    }
                    OutputFormat::Text => {
                        for log in &logs {
                            println!("{}  {}", log.id, log);
                        }
                        let total: f64 = logs.iter().map(|l| l.amount).sum();
                        println!("\nTotal: {} expense(s), {:.2}", logs.len(), total);
                    }
                }
                Ok(())
            }

            SpendingSubcommand::Delete { id } => {
                let removed = store.delete(Collection::SpendingLogs, id).await?;
                if !removed {
                    return Err(format!("Spending log not found: {}", id).into());
                }
                queue
                    .append(&PendingChange::delete(Collection::SpendingLogs, id))
                    .await?;
                println!("Deleted spending log {}", id);

                sync::try_auto_sync(config, pool).await;
                Ok(())
            }

            SpendingSubcommand::Categories => {
                for category in SPENDING_CATEGORIES {
                    println!("  {}", category);
                }
                Ok(())
            }
        }
    }
}
