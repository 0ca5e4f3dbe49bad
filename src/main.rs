use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lifetiles::commands::{
    AlcoholCommand, ConfigCommand, ExerciseCommand, NutritionCommand, SleepCommand,
    SpendingCommand, SyncCommand,
};
use lifetiles::config::Config;
use lifetiles::db::init_db;

#[derive(Parser)]
#[command(name = "lifetiles")]
#[command(version)]
#[command(about = "An offline-first habit tracking CLI", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Track alcohol consumption
    Alcohol(AlcoholCommand),

    /// Track sleep
    Sleep(SleepCommand),

    /// Track meals and nutrition
    Nutrition(NutritionCommand),

    /// Track spending
    Spending(SpendingCommand),

    /// Track exercise
    Exercise(ExerciseCommand),

    /// Sync with remote server
    Sync(SyncCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lifetiles=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Alcohol(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            cmd.run(&pool, &config).await?;
        }
        Some(Commands::Sleep(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            cmd.run(&pool, &config).await?;
        }
        Some(Commands::Nutrition(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            cmd.run(&pool, &config).await?;
        }
        Some(Commands::Spending(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            cmd.run(&pool, &config).await?;
        }
        Some(Commands::Exercise(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            cmd.run(&pool, &config).await?;
        }
        Some(Commands::Sync(cmd)) => {
            let pool = init_db(config.database_path.clone()).await?;
            cmd.run(&pool, &config).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
