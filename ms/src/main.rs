use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use memorystore::MemoryStore;
use memorystore::cli::{Cli, Command};
use memorystore::config::Config;

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
    Ok(())
}

fn parse_object(raw: &str, what: &str) -> Result<serde_json::Value> {
    let value: serde_json::Value = serde_json::from_str(raw).context(format!("{} is not valid JSON", what))?;
    if !value.is_object() {
        return Err(eyre::eyre!("{} must be a JSON object", what));
    }
    Ok(value)
}

fn format_timestamp(timestamp: f64) -> String {
    chrono::DateTime::from_timestamp_micros((timestamp * 1_000_000.0) as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("memorystore starting (db: {})", config.db_path.display());

    let store = MemoryStore::open(&config.db_path)?;

    match cli.command {
        Command::Record {
            interaction_type,
            data,
            context,
        } => {
            let data = parse_object(&data, "data")?;
            let context = context.as_deref().map(|c| parse_object(c, "context")).transpose()?;
            store.store_interaction(&interaction_type, &data, context.as_ref())?;
            println!("{} Stored interaction: {}", "✓".green(), interaction_type.cyan());
        }
        Command::Recent { limit, json } => {
            let interactions = store.get_recent_interactions(limit.unwrap_or(config.recent_limit))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&interactions)?);
            } else if interactions.is_empty() {
                println!("No interactions found");
            } else {
                for interaction in interactions {
                    let context = interaction
                        .context
                        .map(|c| format!(" {}", c.to_string().dimmed()))
                        .unwrap_or_default();
                    println!(
                        "{} {} {}{}",
                        format_timestamp(interaction.timestamp).yellow(),
                        interaction.interaction_type.cyan(),
                        interaction.data,
                        context
                    );
                }
            }
        }
        Command::Stats => {
            println!("Database: {}", store.location().cyan());
            println!("  Interactions: {}", store.interaction_count()?);
        }
    }

    Ok(())
}
