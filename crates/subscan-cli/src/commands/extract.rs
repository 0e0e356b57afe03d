//! Single-message extraction command

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use subscan_core::SubscriptionExtraction;

use super::{level_icon, load_extractor, parse_reference_date, percent};

pub fn cmd_extract(
    config_path: Option<&Path>,
    text: &str,
    sender: Option<&str>,
    now: Option<&str>,
    json: bool,
) -> Result<()> {
    let (extractor, _) = load_extractor(config_path)?;
    let reference = parse_reference_date(now)?;

    let extraction = extractor.extract(text, sender, reference);

    if json {
        let out = serde_json::to_string_pretty(&extraction)
            .context("Failed to serialize extraction to JSON")?;
        println!("{}", out);
        return Ok(());
    }

    for line in summary_lines(&extraction, reference) {
        println!("{}", line);
    }

    if let Some(draft) = extractor.draft(&extraction) {
        let amount = draft
            .amount
            .map(|a| format!("{:.2} {}", a, draft.currency))
            .unwrap_or_else(|| "?".to_string());
        println!();
        println!(
            "   Suggested: {} │ {} / {}",
            draft.name.as_deref().unwrap_or("?"),
            amount,
            draft.billing_cycle
        );
    }

    Ok(())
}

/// Human-readable summary, one field per line
pub fn summary_lines(extraction: &SubscriptionExtraction, reference: NaiveDate) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!("🔎 Extraction (reference date {})", reference),
        "   ─────────────────────────────────────────────".to_string(),
    ];

    let missing = || "not found".to_string();

    lines.push(format!(
        "   Service   {}",
        extraction
            .service
            .as_ref()
            .map(|s| {
                let confirmed = if s.sender_confirmed { ", sender confirmed" } else { "" };
                format!(
                    "{} ({}{}, {})",
                    s.normalized_name,
                    s.source.as_str(),
                    confirmed,
                    percent(s.confidence)
                )
            })
            .unwrap_or_else(missing)
    ));
    lines.push(format!(
        "   Amount    {}",
        extraction
            .amount
            .as_ref()
            .map(|a| format!("{:.2} {} ({})", a.value, a.currency, percent(a.confidence)))
            .unwrap_or_else(missing)
    ));
    lines.push(format!(
        "   Cycle     {}",
        extraction
            .billing_cycle
            .as_ref()
            .map(|b| match b.interval_count {
                Some(n) => format!("every {} months ({})", n, percent(b.confidence)),
                None => format!("{} ({})", b.cycle, percent(b.confidence)),
            })
            .unwrap_or_else(missing)
    ));
    lines.push(format!(
        "   Date      {}",
        extraction
            .date
            .as_ref()
            .map(|d| {
                let kind = if d.is_relative { "relative, " } else { "" };
                format!("{} ({}{})", d.date, kind, percent(d.confidence))
            })
            .unwrap_or_else(missing)
    ));

    let level = extraction.level();
    lines.push("   ─────────────────────────────────────────────".to_string());
    lines.push(format!(
        "   {} Overall {} ({})",
        level_icon(level),
        percent(extraction.overall_confidence),
        level
    ));
    lines
}
