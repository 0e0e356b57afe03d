//! SMS export scan command

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use subscan_core::{parse_messages_csv, scan_messages, ScanReport};

use super::{level_icon, load_extractor, parse_reference_date, percent, truncate};

pub fn cmd_scan(
    config_path: Option<&Path>,
    file: &Path,
    min_confidence: Option<f64>,
    now: Option<&str>,
    json: bool,
) -> Result<()> {
    let (extractor, _) = load_extractor(config_path)?;
    let reference = parse_reference_date(now)?;

    let min_confidence = min_confidence.unwrap_or(extractor.config().scan.min_confidence);
    if !(0.0..=1.0).contains(&min_confidence) {
        bail!("--min-confidence must be between 0 and 1, got {}", min_confidence);
    }

    let reader =
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let messages = parse_messages_csv(reader)
        .with_context(|| format!("Failed to parse messages from {}", file.display()))?;

    let report = scan_messages(&extractor, &messages, reference, min_confidence);

    if json {
        let out =
            serde_json::to_string_pretty(&report).context("Failed to serialize scan report")?;
        println!("{}", out);
        return Ok(());
    }

    print_report(&report, min_confidence);
    Ok(())
}

fn print_report(report: &ScanReport, min_confidence: f64) {
    println!();
    println!("📱 Scanned {} messages", report.total);
    println!(
        "   {} filtered │ {} duplicate │ {} below {} │ {} merged",
        report.filtered,
        report.duplicates,
        report.below_threshold,
        percent(min_confidence),
        report.merged
    );

    if report.detections.is_empty() {
        println!();
        println!("No subscriptions found.");
        return;
    }

    println!();
    println!("📋 Detected Subscriptions");
    println!("   ─────────────────────────────────────────────────────────────");

    for line in detection_lines(report) {
        println!("{}", line);
    }
}

/// One table row per detection
pub fn detection_lines(report: &ScanReport) -> Vec<String> {
    report
        .detections
        .iter()
        .map(|detection| {
            let extraction = &detection.extraction;
            let (name, amount, cycle, next) = match &detection.draft {
                Some(draft) => (
                    draft.name.clone().unwrap_or_else(|| "?".to_string()),
                    draft
                        .amount
                        .map(|a| format!("{:.2} {}", a, draft.currency))
                        .unwrap_or_else(|| "?".to_string()),
                    draft.billing_cycle.as_str().to_string(),
                    draft
                        .next_billing_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "?".to_string()),
                ),
                None => ("?".into(), "?".into(), "?".into(), "?".into()),
            };

            format!(
                "   {} {:20} │ {:>12} │ {:<9} │ next {:10} │ {}",
                level_icon(extraction.level()),
                truncate(&name, 20),
                amount,
                cycle,
                next,
                percent(extraction.overall_confidence)
            )
        })
        .collect()
}
