//! JarvisCore - CLI entry point
//!
//! Runs the builtin components until interrupted and inspects the memory store.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use eyre::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use jarviscore::cli::{Cli, Command, OutputFormat, get_log_path};
use jarviscore::components;
use jarviscore::config::Config;
use jarviscore::controller::{Controller, ControllerError, RunReport};
use jarviscore::{Interaction, MemoryStore};

/// How long components get after the bus is closed before their tasks are abandoned
const CLOSE_GRACE: Duration = Duration::from_secs(1);

fn setup_logging(verbose: bool) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(db = %config.memory.db_path.display(), "JarvisCore loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Run => cmd_run(&config).await,
        Command::History { limit, format } => cmd_history(&config, limit, format),
        Command::Send { interaction_type, data } => cmd_send(&config, &interaction_type, &data),
    }
}

fn open_memory(path: &Path) -> Result<MemoryStore> {
    MemoryStore::open(path).context(format!("Failed to open memory store at {}", path.display()))
}

async fn cmd_run(config: &Config) -> Result<()> {
    let memory = Arc::new(open_memory(&config.memory.db_path)?);

    let mut controller = Controller::new(config.controller.clone(), memory.clone());
    for component in components::builtin(&config.components, memory) {
        controller.register_boxed(component);
    }

    let names = controller.component_names();
    if names.is_empty() {
        println!("No components enabled; nothing to run.");
        return Ok(());
    }
    println!("Running components: {}", names.join(", "));
    println!("Press Ctrl+C to stop.");

    let handle = controller.handle();
    let timeout = config.controller.shutdown_timeout();
    let mut run = tokio::spawn(async move { controller.start().await });

    let joined = tokio::select! {
        joined = &mut run => joined,
        signal = wait_for_signal() => {
            signal?;
            info!("Shutdown requested");
            println!("Shutting down...");
            handle.shutdown().context("Failed to request shutdown")?;

            match tokio::time::timeout(timeout, &mut run).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(?timeout, "Components did not stop in time, closing bus");
                    handle.bus().close();
                    match tokio::time::timeout(CLOSE_GRACE, &mut run).await {
                        Ok(joined) => joined,
                        Err(_) => {
                            run.abort();
                            eyre::bail!("Components did not stop within {:?}", timeout);
                        }
                    }
                }
            }
        }
    };

    let result = joined.context("Controller task failed")?;
    report_run(result)
}

fn report_run(result: Result<RunReport, ControllerError>) -> Result<()> {
    match result {
        Ok(report) => {
            println!("Stopped: {}", report.stopped().join(", "));
            Ok(())
        }
        Err(err) => {
            if let Some(report) = err.report() {
                for name in report.faulted() {
                    if let Some(cause) = report.error(&name) {
                        eprintln!("Faulted: {}", cause);
                    }
                }
            }
            Err(err.into())
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => info!("SIGINT received"),
        _ = sigterm.recv() => info!("SIGTERM received"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl+C received");
    Ok(())
}

fn cmd_history(config: &Config, limit: usize, format: OutputFormat) -> Result<()> {
    let memory = open_memory(&config.memory.db_path)?;
    let interactions = memory.get_recent_interactions(limit)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&interactions)?);
        }
        OutputFormat::Text => {
            if interactions.is_empty() {
                println!("No interactions recorded.");
            }
            for interaction in &interactions {
                print_interaction(interaction);
            }
        }
    }
    Ok(())
}

fn print_interaction(interaction: &Interaction) {
    let when = chrono::DateTime::from_timestamp_micros((interaction.timestamp * 1_000_000.0) as i64)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| interaction.timestamp.to_string());
    println!("[{}] {}: {}", when, interaction.interaction_type, interaction.data);
}

fn cmd_send(config: &Config, interaction_type: &str, data: &str) -> Result<()> {
    let data: Value = serde_json::from_str(data).context("Data must be valid JSON")?;
    if !data.is_object() {
        eyre::bail!("Data must be a JSON object");
    }

    let memory = open_memory(&config.memory.db_path)?;
    memory.store_interaction(interaction_type, &data, None)?;
    println!("Stored interaction: {}", interaction_type);
    Ok(())
}
