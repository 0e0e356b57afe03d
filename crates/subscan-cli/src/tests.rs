//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use chrono::NaiveDate;
use clap::Parser;
use subscan_core::{parse_messages_csv, scan_messages, SubscriptionExtractor};
use tempfile::NamedTempFile;

use crate::cli::{Cli, Commands};
use crate::commands::{self, truncate};

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()
}

const SMS_CSV: &str = "address,body,date\n\
billing@netflix.com,Your Netflix monthly subscription payment of $15.49 was processed,2023-04-15\n\
+15551234567,On my way,2023-04-16\n";

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_extract_args() {
    let cli = Cli::try_parse_from([
        "subscan",
        "extract",
        "Netflix $9.99",
        "--sender",
        "billing@netflix.com",
        "--now",
        "2023-05-01",
        "--json",
    ])
    .unwrap();

    match cli.command {
        Commands::Extract {
            text,
            sender,
            now,
            json,
        } => {
            assert_eq!(text, "Netflix $9.99");
            assert_eq!(sender.as_deref(), Some("billing@netflix.com"));
            assert_eq!(now.as_deref(), Some("2023-05-01"));
            assert!(json);
        }
        _ => panic!("expected extract command"),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["subscan", "config", "--verbose", "--config", "x.toml"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.config.unwrap().to_str(), Some("x.toml"));
}

#[test]
fn test_scan_requires_file() {
    assert!(Cli::try_parse_from(["subscan", "scan"]).is_err());
}

// ========== Core Utility Tests ==========

#[test]
fn test_parse_reference_date() {
    assert_eq!(
        commands::parse_reference_date(Some("2023-05-01")).unwrap(),
        reference()
    );
    assert!(commands::parse_reference_date(Some("05/01/2023")).is_err());
    assert!(commands::parse_reference_date(None).is_ok());
}

#[test]
fn test_load_extractor_from_file() {
    let config = write_temp("[amount]\ndefault_currency = \"EUR\"\n");
    let (extractor, _) = commands::load_extractor(Some(config.path())).unwrap();
    assert_eq!(extractor.config().amount.default_currency, "EUR");
}

#[test]
fn test_load_extractor_bad_config() {
    let config = write_temp("[scoring]\namount_weight = 3.0\n");
    assert!(commands::load_extractor(Some(config.path())).is_err());
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("Netflix", 20), "Netflix");
    assert_eq!(truncate("A very long service name", 10), "A very ...");
    // Multi-byte characters are not split
    assert_eq!(truncate("Crème Brûlée Club", 8), "Crème...");
}

#[test]
fn test_percent() {
    assert_eq!(commands::percent(0.923), "92%");
    assert_eq!(commands::percent(1.0), "100%");
}

// ========== Extract Command Tests ==========

#[test]
fn test_cmd_extract() {
    let result = commands::cmd_extract(
        None,
        "Your Netflix payment of $9.99 was processed",
        Some("billing@netflix.com"),
        Some("2023-05-01"),
        false,
    );
    assert!(result.is_ok());
}

#[test]
fn test_cmd_extract_json() {
    let result = commands::cmd_extract(None, "hello", None, Some("2023-05-01"), true);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_extract_bad_date() {
    let result = commands::cmd_extract(None, "hello", None, Some("tomorrow"), false);
    assert!(result.is_err());
}

#[test]
fn test_summary_lines() {
    let extraction = SubscriptionExtractor::new().extract(
        "$19.99 every 2 months for Hulu, renews in 7 days",
        None,
        reference(),
    );
    let lines = commands::summary_lines(&extraction, reference());
    let text = lines.join("\n");

    assert!(text.contains("Hulu"));
    assert!(text.contains("19.99 USD"));
    assert!(text.contains("every 2 months"));
    assert!(text.contains("2023-05-08 (relative"));
}

#[test]
fn test_summary_lines_empty() {
    let extraction = SubscriptionExtractor::new().extract("hello", None, reference());
    let text = commands::summary_lines(&extraction, reference()).join("\n");
    assert_eq!(text.matches("not found").count(), 4);
    assert!(text.contains("Overall 0% (low)"));
}

// ========== Scan Command Tests ==========

#[test]
fn test_cmd_scan() {
    let csv = write_temp(SMS_CSV);
    let result = commands::cmd_scan(None, csv.path(), None, Some("2023-05-01"), false);
    assert!(result.is_ok());

    let result = commands::cmd_scan(None, csv.path(), Some(0.9), Some("2023-05-01"), true);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_scan_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = commands::cmd_scan(None, &dir.path().join("none.csv"), None, None, false);
    assert!(result.is_err());
}

#[test]
fn test_cmd_scan_bad_threshold() {
    let csv = write_temp(SMS_CSV);
    let result = commands::cmd_scan(None, csv.path(), Some(1.5), None, false);
    assert!(result.is_err());
}

#[test]
fn test_detection_lines() {
    let messages = parse_messages_csv(SMS_CSV.as_bytes()).unwrap();
    let report = scan_messages(&SubscriptionExtractor::new(), &messages, reference(), 0.6);
    let lines = commands::detection_lines(&report);

    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Netflix"));
    assert!(lines[0].contains("15.49 USD"));
    assert!(lines[0].contains("monthly"));
}

// ========== Config Command Tests ==========

#[test]
fn test_cmd_config() {
    let config = write_temp("[scan]\nmin_confidence = 0.7\n");
    assert!(commands::cmd_config(Some(config.path())).is_ok());
}

#[test]
fn test_cmd_config_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(commands::cmd_config(Some(&dir.path().join("missing.toml"))).is_err());
}
