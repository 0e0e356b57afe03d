//! Shared utilities for commands
//!
//! - `load_extractor` - Build an extractor from the resolved config
//! - `parse_reference_date` - Parse the `--now` flag

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use subscan_core::config::{load_config, ConfigSource};
use subscan_core::extract::{today, SubscriptionExtractor};
use tracing::debug;

/// Load the config (explicit path, override, or defaults) into an extractor
pub fn load_extractor(config_path: Option<&Path>) -> Result<(SubscriptionExtractor, ConfigSource)> {
    let (config, source) = load_config(config_path).context("Failed to load extractor config")?;
    debug!("Using config from {}", source);
    Ok((SubscriptionExtractor::with_config(config), source))
}

/// Parse `--now`, defaulting to today's local date
pub fn parse_reference_date(now: Option<&str>) -> Result<NaiveDate> {
    match now {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid --now date '{}' (use YYYY-MM-DD)", s)),
        None => Ok(today()),
    }
}
