use clap::{Args, Subcommand};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::{QueueRepository, RecordStore};
use crate::models::{
    resolve_exercise_type, Collection, ExerciseLog, PendingChange, SyncAction, EXERCISE_TYPES,
};
use crate::sync;

use super::{parse_date_or_today, DateFilter, OutputFormat};

/// Track exercise
#[derive(Args)]
pub struct ExerciseCommand {
    #[command(subcommand)]
    pub command: ExerciseSubcommand,
}

#[derive(Subcommand)]
pub enum ExerciseSubcommand {
    /// Log a workout
    Add {
        /// Exercise type (see `exercise types`)
        exercise_type: String,

        /// Duration in minutes
        #[arg(long, short)]
        minutes: i64,

        /// Optional note
        #[arg(long, short)]
        notes: Option<String>,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// List workouts
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

    /// Delete a workout by id
    Delete { id: String },

    /// Show the fixed exercise-type list
    Types,
}

impl ExerciseCommand {
    pub async fn run(
        &self,
        pool: &SqlitePool,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let store = RecordStore::new(pool.clone());
        let queue = QueueRepository::new(pool.clone());

        match &self.command {
            ExerciseSubcommand::Add {
                exercise_type,
                minutes,
                notes,
                date,
            } => {
                let date = parse_date_or_today(date)?;
                let exercise_type = resolve_exercise_type(exercise_type).ok_or_else(|| {
                    format!(
                        "Unknown exercise type '{}'. Valid options: {}",
                        exercise_type,
                        EXERCISE_TYPES.join(", ")
                    )
                })?;

                let mut log = ExerciseLog::new(exercise_type, *minutes, date);
                if let Some(n) = notes {
                    log = log.with_notes(n);
                }
                store.put(&log).await?;
                queue
                    .append(&PendingChange::new(
                        SyncAction::Create,
                        Collection::ExerciseLogs,
                        serde_json::to_value(&log)?,
                    ))
                    .await?;

                println!("Logged {} min of {}", log.duration_minutes, log.exercise_type);
                println!("Log ID: {}", log.id);

                sync::try_auto_sync(config, pool).await;
                Ok(())
            }

            ExerciseSubcommand::List {
                format,
                date,
                from,
                to,
            } => {
                let filter = DateFilter::parse(date, from, to)?;
                let mut logs: Vec<ExerciseLog> = store.get_all().await?;
                logs.retain(|l| filter.contains(l.date));
                logs.sort_by(|a, b| a.logged_at.cmp(&b.logged_at));

                if logs.is_empty() {
                    println!("No exercise logs found.");
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
                        let total: i64 = logs.iter().map(|l| l.duration_minutes).sum();
                        println!("\nTotal: {} workout(s), {} minutes", logs.len(), total);
                    }
                }
                Ok(())
            }

            ExerciseSubcommand::Delete { id } => {
                let removed = store.delete(Collection::ExerciseLogs, id).await?;
                if !removed {
                    return Err(format!("Exercise log not found: {}", id).into());
                }
                queue
                    .append(&PendingChange::delete(Collection::ExerciseLogs, id))
                    .await?;
                println!("Deleted exercise log {}", id);

                sync::try_auto_sync(config, pool).await;
                Ok(())
            }

            ExerciseSubcommand::Types => {
                for exercise_type in EXERCISE_TYPES {
                    println!("  {}", exercise_type);
                }
                Ok(())
            }
        }
    }
}
