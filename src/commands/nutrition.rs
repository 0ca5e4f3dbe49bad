use clap::{Args, Subcommand};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::{QueueRepository, RecordStore};
use crate::models::{Collection, MealType, NutritionLog, PendingChange, SyncAction};
use crate::sync;

use super::{parse_date_or_today, DateFilter, OutputFormat};

/// Track meals and nutrition
#[derive(Args)]
pub struct NutritionCommand {
    #[command(subcommand)]
    pub command: NutritionSubcommand,
}

#[derive(Subcommand)]
pub enum NutritionSubcommand {
    /// Log a meal
    Add {
        /// What you ate
        description: String,

        /// Meal type (breakfast, lunch, dinner, snack)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        meal_type: String,

        /// Estimated calories
        #[arg(long, default_value_t = 0)]
        calories: i64,

        /// Estimated protein in grams
        #[arg(long, default_value_t = 0.0)]
        protein: f64,

        /// Mark the meal as healthy
        #[arg(long)]
        healthy: bool,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// List logged meals
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

    /// Delete a logged meal by id
    Delete { id: String },
}

impl NutritionCommand {
    pub async fn run(
        &self,
        pool: &SqlitePool,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let store = RecordStore::new(pool.clone());
        let queue = QueueRepository::new(pool.clone());

        match &self.command {
            NutritionSubcommand::Add {
                description,
                meal_type,
                calories,
                protein,
                healthy,
                date,
            } => {
                let date = parse_date_or_today(date)?;
                let meal_type: MealType = meal_type.parse().map_err(|e: String| e)?;

                let log = NutritionLog::new(description.clone(), meal_type, date)
                    .with_nutrition(*calories, *protein, *healthy);
                store.put(&log).await?;
                queue
                    .append(&PendingChange::new(
                        SyncAction::Create,
                        Collection::NutritionLogs,
                        serde_json::to_value(&log)?,
                    ))
                    .await?;

                println!(
                    "Logged {}: \"{}\" ({} kcal)",
                    log.meal_type, log.meal_description, log.calories
                );
                println!("Log ID: {}", log.id);

                sync::try_auto_sync(config, pool).await;
                Ok(())
            }

            NutritionSubcommand::List {
                format,
                date,
                from,
                to,
            } => {
                let filter = DateFilter::parse(date, from, to)?;
                let mut logs: Vec<NutritionLog> = store.get_all().await?;
                logs.retain(|l| filter.contains(l.date));
                logs.sort_by(|a, b| a.logged_at.cmp(&b.logged_at));

                if logs.is_empty() {
                    println!("No nutrition logs found.");
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
                        let calories: i64 = logs.iter().map(|l| l.calories).sum();
                        let protein: f64 = logs.iter().map(|l| l.protein).sum();
                        println!(
                            "\nTotal: {} meal(s), {} kcal, {:.0}g protein",
                            logs.len(),
                            calories,
                            protein
                        );
                    }
                }
                Ok(())
            }

            NutritionSubcommand::Delete { id } => {
                let removed = store.delete(Collection::NutritionLogs, id).await?;
                if !removed {
                    return Err(format!("Nutrition log not found: {}", id).into());
                }
                queue
                    .append(&PendingChange::delete(Collection::NutritionLogs, id))
                    .await?;
                println!("Deleted nutrition log {}", id);

                sync::try_auto_sync(config, pool).await;
                Ok(())
            }
        }
    }
}
