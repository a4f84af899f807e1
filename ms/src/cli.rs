//! CLI argument parsing for memorystore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ms")]
#[command(author, version, about = "Inspect and append to the JarvisCore interaction log", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Append an interaction
    Record {
        /// Interaction type
        #[arg(required = true)]
        interaction_type: String,

        /// Payload as a JSON object
        #[arg(required = true)]
        data: String,

        /// Optional context as a JSON object
        #[arg(short = 'x', long)]
        context: Option<String>,
    },

    /// Show the most recent interactions, newest first
    Recent {
        /// Number of interactions to show (default from config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show database statistics
    Stats,
}
