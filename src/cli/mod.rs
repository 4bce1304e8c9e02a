//! CLI interface for tofkeys

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Key-press depth from time-of-flight sensors (diagnostic harness)
#[derive(Parser)]
#[command(name = "tofkeys")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the simulated keyboard and print each level vector
    Monitor {
        /// Configuration file path
        #[arg(short, long, default_value = "tofkeys.yaml")]
        config: PathBuf,

        /// Stop after this many polls (default: run until Ctrl-C)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Print one JSON object per poll
        #[arg(long)]
        json: bool,
    },

    /// Live level meter in the terminal
    Meter {
        /// Configuration file path
        #[arg(short, long, default_value = "tofkeys.yaml")]
        config: PathBuf,
    },

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "tofkeys.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}
