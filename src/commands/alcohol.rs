use clap::{Args, Subcommand};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::{QueueRepository, RecordStore};
use crate::models::{
    find_drink, AlcoholLog, Collection, PendingChange, SyncAction, DRINK_CATALOG,
};
use crate::sync;

use super::{parse_date_or_today, DateFilter, OutputFormat};

/// Track alcohol consumption
#[derive(Args)]
pub struct AlcoholCommand {
    #[command(subcommand)]
    pub command: AlcoholSubcommand,
}

#[derive(Subcommand)]
pub enum AlcoholSubcommand {
    /// Log a drink from the built-in catalog
    Add {
        /// Catalog drink id or name (see `alcohol drinks`)
        drink: String,

        /// Number of servings
        #[arg(long, short, default_value_t = 1.0)]
        servings: f64,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// List logged drinks
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

    /// Delete a logged drink by id
    Delete { id: String },

    /// Show the built-in drink catalog
    Drinks,
}

impl AlcoholCommand {
    pub async fn run(
        &self,
        pool: &SqlitePool,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let store = RecordStore::new(pool.clone());
        let queue = QueueRepository::new(pool.clone());

        match &self.command {
            AlcoholSubcommand::Add {
                drink,
                servings,
                date,
            } => {
                let date = parse_date_or_today(date)?;
                let drink = find_drink(drink).ok_or_else(|| {
                    format!("Unknown drink '{}'. See `alcohol drinks`.", drink)
                })?;

                let log = AlcoholLog::new(drink, *servings, date);
                store.put(&log).await?;
                queue
                    .append(&PendingChange::new(
                        SyncAction::Create,
                        Collection::AlcoholLogs,
                        serde_json::to_value(&log)?,
                    ))
                    .await?;

                println!(
                    "Logged {}x {} ({} std drinks)",
                    log.servings, log.drink_name, log.standard_drinks
                );
                println!("Log ID: {}", log.id);

                sync::try_auto_sync(config, pool).await;
                Ok(())
            }

            AlcoholSubcommand::List {
                format,
                date,
                from,
                to,
            } => {
                let filter = DateFilter::parse(date, from, to)?;
                let mut logs: Vec<AlcoholLog> = store.get_all().await?;
                logs.retain(|l| filter.contains(l.date));
                logs.sort_by(|a, b| a.logged_at.cmp(&b.logged_at));

                if logs.is_empty() {
                    println!("No alcohol logs found.");
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
                        let total: f64 = logs.iter().map(|l| l.standard_drinks).sum();
                        println!(
                            "\nTotal: {} log(s), {:.1} standard drinks",
                            logs.len(),
                            total
                        );
                    }
                }
                Ok(())
            }

            AlcoholSubcommand::Delete { id } => {
                let removed = store.delete(Collection::AlcoholLogs, id).await?;
                if !removed {
                    return Err(format!("Alcohol log not found: {}", id).into());
                }
                queue
                    .append(&PendingChange::delete(Collection::AlcoholLogs, id))
                    .await?;
                println!("Deleted alcohol log {}", id);

                sync::try_auto_sync(config, pool).await;
                Ok(())
            }

            AlcoholSubcommand::Drinks => {
                let mut current_category = "";
                for drink in DRINK_CATALOG {
                    if drink.category != current_category {
                        if !current_category.is_empty() {
                            println!();
                        }
                        println!("{}", drink.category);
                        println!("{}", "-".repeat(drink.category.len()));
                        current_category = drink.category;
                    }
                    println!(
                        "  {:24} {:22} {:4.1}% ABV, {} std drink(s)/serving",
                        drink.catalog_id(),
                        drink.name,
                        drink.alcohol_percentage,
                        drink.standard_drinks_per_serving
                    );
                }
                Ok(())
            }
        }
    }
}
