use chrono::NaiveTime;
use clap::{Args, Subcommand};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::{QueueRepository, RecordStore};
use crate::models::{Collection, PendingChange, SleepLog, SyncAction};
use crate::sync;

use super::{parse_date_or_today, DateFilter, OutputFormat};

/// Track sleep
#[derive(Args)]
pub struct SleepCommand {
    #[command(subcommand)]
    pub command: SleepSubcommand,
}

#[derive(Subcommand)]
pub enum SleepSubcommand {
    /// Log a night of sleep
    Add {
        /// Time you went to bed (HH:MM, 24h)
        #[arg(long)]
        bed: String,

        /// Time you woke up (HH:MM, 24h); at or before bed time means the
        /// next day
        #[arg(long)]
        wake: String,

        /// Date of the night (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// List sleep logs
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

    /// Delete a sleep log by id
    Delete { id: String },
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| format!("Invalid time '{}'. Use HH:MM (24h).", value))
}

impl SleepCommand {
    pub async fn run(
        &self,
        pool: &SqlitePool,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let store = RecordStore::new(pool.clone());
        let queue = QueueRepository::new(pool.clone());

        match &self.command {
            SleepSubcommand::Add { bed, wake, date } => {
                let date = parse_date_or_today(date)?;
                let bed_time = date.and_time(parse_time(bed)?).and_utc();
                let wake_time = date.and_time(parse_time(wake)?).and_utc();

                let log = SleepLog::new(bed_time, wake_time, date);
                store.put(&log).await?;
                queue
                    .append(&PendingChange::new(
                        SyncAction::Create,
                        Collection::SleepLogs,
                        serde_json::to_value(&log)?,
                    ))
                    .await?;

                println!("Logged {:.2} hours of sleep", log.hours_slept);
                println!("Log ID: {}", log.id);

                sync::try_auto_sync(config, pool).await;
                Ok(())
            }

            SleepSubcommand::List {
                format,
                date,
                from,
                to,
            } => {
                let filter = DateFilter::parse(date, from, to)?;
                let mut logs: Vec<SleepLog> = store.get_all().await?;
                logs.retain(|l| filter.contains(l.date));
                logs.sort_by(|a, b| a.sleep_time.cmp(&b.sleep_time));

                if logs.is_empty() {
                    println!("No sleep logs found.");
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
                        let total: f64 = logs.iter().map(|l| l.hours_slept).sum();
                        println!(
                            "\nTotal: {} night(s), average {:.2}h",
                            logs.len(),
                            total / logs.len() as f64
                        );
                    }
                }
                Ok(())
            }

            SleepSubcommand::Delete { id } => {
                let removed = store.delete(Collection::SleepLogs, id).await?;
                if !removed {
                    return Err(format!("Sleep log not found: {}", id).into());
                }
                queue
                    .append(&PendingChange::delete(Collection::SleepLogs, id))
                    .await?;
                println!("Deleted sleep log {}", id);

                sync::try_auto_sync(config, pool).await;
                Ok(())
            }
        }
    }
}
