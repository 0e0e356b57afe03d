//! Subscan CLI - Subscription message extractor
//!
//! Usage:
//!   subscan extract "TEXT" --sender S      Extract one message
//!   subscan scan --file messages.csv       Scan an SMS export
//!   subscan config                         Show effective configuration

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Extract {
            text,
            sender,
            now,
            json,
        } => commands::cmd_extract(config, &text, sender.as_deref(), now.as_deref(), json),
        Commands::Scan {
            file,
            min_confidence,
            now,
            json,
        } => commands::cmd_scan(config, &file, min_confidence, now.as_deref(), json),
        Commands::Config => commands::cmd_config(config),
    }
}
