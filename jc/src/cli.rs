//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// JarvisCore - component runtime over a shared message bus
#[derive(Parser)]
#[command(
    name = "jc",
    about = "Run JarvisCore components and inspect their memory",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log at DEBUG instead of INFO
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the builtin components and run until interrupted
    Run,

    /// Show recent interactions from the memory store
    History {
        /// Number of interactions to show
        #[arg(short = 'n', long, default_value_t = memorystore::DEFAULT_RECENT_LIMIT)]
        limit: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Append an interaction to the memory store
    Send {
        /// Interaction type
        #[arg(value_name = "TYPE")]
        interaction_type: String,

        /// Interaction data as a JSON object
        #[arg(default_value = "{}")]
        data: String,
    },
}

/// Output format for the history command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Log file written by `jc`
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jarviscore")
        .join("logs")
        .join("jarviscore.log");
    debug!(?path, "get_log_path: returning path");
    path
}
