//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Preview recurring schedules.
///
/// Reads a schedule definition (sunsets, jittered random times, daily
/// cutoffs) from configuration and lists its upcoming occurrences.
#[derive(Debug, Parser)]
#[command(name = "recur", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the next occurrences of the configured schedule.
    Preview {
        /// Number of occurrences to list (defaults to the configured count).
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Anchor time: ISO 8601 or relative ("2 hours ago"). Defaults to now.
        #[arg(long)]
        from: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate the configured schedule and print a summary.
    Check,
}
