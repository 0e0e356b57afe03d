//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Subscan - Find subscriptions in SMS and notification text
#[derive(Parser)]
#[command(name = "subscan")]
#[command(about = "Extract subscription details from SMS and notification text", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Extractor config file (defaults to the data dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract subscription details from one message
    Extract {
        /// Message text
        text: String,

        /// Sender address, email, or SMS sender ID
        #[arg(short, long)]
        sender: Option<String>,

        /// Reference date for relative dates (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        now: Option<String>,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Scan an exported SMS CSV (address,body,date) for subscriptions
    Scan {
        /// CSV file to scan
        #[arg(short, long)]
        file: PathBuf,

        /// Drop detections below this confidence (defaults to the config value)
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Reference date for messages without a date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        now: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the effective extractor configuration
    Config,
}
