use clap::{Args, Subcommand};

use crate::config::Config;

use super::OutputFormat;

/// Manage configuration
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        println!("database_path: {}", config.database_path.display());
                        println!();

                        match &config.sync.server_url {
                            Some(url) => println!("sync.server_url: {}", url),
                            None => println!("sync.server_url: (not set)"),
                        }
                        match &config.sync.api_key {
                            Some(key) => println!(
                                "sync.api_key: {}...",
                                &key[..key.len().min(8)]
                            ),
                            None => println!("sync.api_key: (not set)"),
                        }
                        println!("sync.auto_sync: {}", config.sync.auto_sync);
                    }
                }
                Ok(())
            }
        }
    }
}
