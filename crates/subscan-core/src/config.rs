//! Extractor configuration
//!
//! Holds the tunable constants: the fallback currency, the scoring weights
//! and boosts, and the batch acceptance threshold.
//!
//! ## Configuration Resolution
//!
//! 1. An explicit path (the CLI's `--config`)
//! 2. An override in the data dir (~/.local/share/subscan/config/extractor.toml)
//! 3. The embedded default (compiled into the binary)
//!
//! Keys missing from a file keep their default values.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../../config/extractor.toml");

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractorConfig {
    pub amount: AmountConfig,
    pub scoring: ScoringConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountConfig {
    /// Currency for amounts with no symbol, code, or name
    pub default_currency: String,
}

impl Default for AmountConfig {
    fn default() -> Self {
        Self {
            default_currency: crate::extract::amount::DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Weights and boosts for the overall confidence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringConfig {
    pub amount_weight: f64,
    pub service_weight: f64,
    pub billing_weight: f64,
    pub date_weight: f64,
    /// Share of the remaining headroom added when amount and service are both present
    pub critical_boost: f64,
    /// Share of the remaining headroom added when the sender confirms the service
    pub sender_boost: f64,
    /// Lowest scale applied to the mean when amount and service are not both found
    pub coverage_floor: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            amount_weight: 0.35,
            service_weight: 0.35,
            billing_weight: 0.15,
            date_weight: 0.15,
            critical_boost: 0.15,
            sender_boost: 0.10,
            coverage_floor: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanConfig {
    /// Batch scans drop extractions below this overall confidence
    pub min_confidence: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
        }
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Override(PathBuf),
    Embedded,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(path) => write!(f, "{}", path.display()),
            Self::Override(path) => write!(f, "{} (override)", path.display()),
            Self::Embedded => write!(f, "embedded defaults"),
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("subscan").join("config").join("extractor.toml"))
}

/// Load configuration (explicit path, then override, then embedded default)
///
/// An explicit path that does not exist is an error; a missing override is not.
pub fn load_config(explicit: Option<&Path>) -> Result<(ExtractorConfig, ConfigSource)> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        let config = parse_config(&content)?;
        debug!("Loaded config from {}", path.display());
        return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
    }

    if let Some(path) = default_config_path() {
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config = parse_config(&content)?;
            debug!("Loaded config override from {}", path.display());
            return Ok((config, ConfigSource::Override(path)));
        }
    }

    Ok((parse_config(DEFAULT_CONFIG)?, ConfigSource::Embedded))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    amount: Option<RawAmount>,
    scoring: Option<RawScoring>,
    scan: Option<RawScan>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAmount {
    default_currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScoring {
    amount_weight: Option<f64>,
    service_weight: Option<f64>,
    billing_weight: Option<f64>,
    date_weight: Option<f64>,
    critical_boost: Option<f64>,
    sender_boost: Option<f64>,
    coverage_floor: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScan {
    min_confidence: Option<f64>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<ExtractorConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = ExtractorConfig::default();

    if let Some(amount) = raw.amount {
        if let Some(currency) = amount.default_currency {
            config.amount.default_currency = currency.trim().to_uppercase();
        }
    }

    if let Some(scoring) = raw.scoring {
        let s = &mut config.scoring;
        if let Some(v) = scoring.amount_weight {
            s.amount_weight = v;
        }
        if let Some(v) = scoring.service_weight {
            s.service_weight = v;
        }
        if let Some(v) = scoring.billing_weight {
            s.billing_weight = v;
        }
        if let Some(v) = scoring.date_weight {
            s.date_weight = v;
        }
        if let Some(v) = scoring.critical_boost {
            s.critical_boost = v;
        }
        if let Some(v) = scoring.sender_boost {
            s.sender_boost = v;
        }
        if let Some(v) = scoring.coverage_floor {
            s.coverage_floor = v;
        }
    }

    if let Some(scan) = raw.scan {
        if let Some(v) = scan.min_confidence {
            config.scan.min_confidence = v;
        }
    }

    config.validate()?;
    Ok(config)
}

impl ExtractorConfig {
    /// Check every value is usable
    pub fn validate(&self) -> Result<()> {
        let currency = &self.amount.default_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::Config(format!(
                "default_currency must be a 3-letter code, got '{}'",
                currency
            )));
        }

        let s = &self.scoring;
        let unit_values = [
            ("scoring.amount_weight", s.amount_weight),
            ("scoring.service_weight", s.service_weight),
            ("scoring.billing_weight", s.billing_weight),
            ("scoring.date_weight", s.date_weight),
            ("scoring.critical_boost", s.critical_boost),
            ("scoring.sender_boost", s.sender_boost),
            ("scoring.coverage_floor", s.coverage_floor),
            ("scan.min_confidence", self.scan.min_confidence),
        ];
        for (key, value) in unit_values {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    key, value
                )));
            }
        }

        if s.total_weight() <= 0.0 {
            return Err(Error::Config(
                "At least one scoring weight must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl ScoringConfig {
    pub fn total_weight(&self) -> f64 {
        self.amount_weight + self.service_weight + self.billing_weight + self.date_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, ExtractorConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config(
            r#"
            [amount]
            default_currency = "eur"

            [scoring]
            critical_boost = 0.2
            "#,
        )
        .unwrap();
        assert_eq!(config.amount.default_currency, "EUR");
        assert_eq!(config.scoring.critical_boost, 0.2);
        assert_eq!(config.scoring.amount_weight, 0.35);
        assert_eq!(config.scan.min_confidence, 0.6);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), ExtractorConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = parse_config("[scoring\namount_weight = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse_config("[scoring]\namount_wieght = 0.3\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = parse_config("[scoring]\nsender_boost = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("sender_boost"));

        let err = parse_config("[scan]\nmin_confidence = -0.1\n").unwrap_err();
        assert!(err.to_string().contains("min_confidence"));
    }

    #[test]
    fn test_zero_weights_rejected() {
        let content = "[scoring]\namount_weight = 0\nservice_weight = 0\nbilling_weight = 0\ndate_weight = 0\n";
        assert!(parse_config(content).is_err());
    }

    #[test]
    fn test_bad_currency_rejected() {
        assert!(parse_config("[amount]\ndefault_currency = \"DOLLARS\"\n").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[scan]\nmin_confidence = 0.75").unwrap();

        let (config, source) = load_config(Some(file.path())).unwrap();
        assert_eq!(config.scan.min_confidence, 0.75);
        assert_eq!(source, ConfigSource::Explicit(file.path().to_path_buf()));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_config(Some(&missing)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
