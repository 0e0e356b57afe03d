//! Effective configuration display

use std::path::Path;

use anyhow::{Context, Result};
use subscan_core::config::default_config_path;

use super::load_extractor;

pub fn cmd_config(config_path: Option<&Path>) -> Result<()> {
    let (extractor, source) = load_extractor(config_path)?;

    println!("⚙️  Extractor config: {}", source);
    if let Some(path) = default_config_path() {
        println!("   Override path: {}", path.display());
    }
    println!();

    let rendered =
        toml::to_string_pretty(extractor.config()).context("Failed to render config as TOML")?;
    print!("{}", rendered);

    Ok(())
}
