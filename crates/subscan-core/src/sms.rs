//! SMS batch scanning
//!
//! Reads exported messages from CSV and runs the extractor over every one
//! that looks billing-related. Results below the confidence threshold are
//! dropped, and repeat notices for the same service collapse into the single
//! most confident detection.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use chrono::{DateTime, NaiveDate};
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::extract::SubscriptionExtractor;
use crate::models::{SubscriptionDraft, SubscriptionExtraction};

/// One exported text message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmsMessage {
    /// Sender address, email, or alphanumeric sender ID
    pub address: Option<String>,
    pub body: String,
    /// Day the message arrived; relative dates in the body count from here
    pub received: Option<NaiveDate>,
}

impl SmsMessage {
    pub fn new(address: Option<&str>, body: &str) -> Self {
        Self {
            address: address.map(str::to_string),
            body: body.to_string(),
            received: None,
        }
    }
}

/// A message that passed every filter
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub fingerprint: String,
    pub address: Option<String>,
    pub received: Option<NaiveDate>,
    pub extraction: SubscriptionExtraction,
    /// Pre-filled form values for the confirm step
    pub draft: Option<SubscriptionDraft>,
}

/// Outcome of a batch scan
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub total: usize,
    /// Skipped by the keyword pre-filter
    pub filtered: usize,
    /// Exact repeats of an earlier message
    pub duplicates: usize,
    pub below_threshold: usize,
    /// Detections folded into a more confident one for the same service
    pub merged: usize,
    /// Most confident first
    pub detections: Vec<Detection>,
}

const HEADER_ADDRESS: &[&str] = &["address", "sender", "from", "number"];
const HEADER_BODY: &[&str] = &["body", "message", "text", "content"];
const HEADER_DATE: &[&str] = &["date", "received", "timestamp", "time"];

/// Parse an `address,body,date` CSV export
///
/// Columns are found by header name in any order. Only the body column is
/// required. Dates may be `YYYY-MM-DD`, `MM/DD/YYYY`, or epoch milliseconds,
/// optionally followed by a time.
pub fn parse_messages_csv<R: Read>(reader: R) -> Result<Vec<SmsMessage>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let body_col = find_column(&headers, HEADER_BODY)
        .ok_or_else(|| Error::Import("Missing body column".into()))?;
    let address_col = find_column(&headers, HEADER_ADDRESS);
    let date_col = find_column(&headers, HEADER_DATE);

    let mut messages = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = index + 2;

        let body = record.get(body_col).unwrap_or_default().trim();
        if body.is_empty() {
            debug!("Skipping line {} with empty body", line);
            continue;
        }

        let address = address_col
            .and_then(|col| record.get(col))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let received = match date_col.and_then(|col| record.get(col)).map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_received(raw).ok_or_else(|| {
                Error::Import(format!("Invalid date '{}' on line {}", raw, line))
            })?),
            _ => None,
        };

        messages.push(SmsMessage {
            address,
            body: body.to_string(),
            received,
        });
    }

    debug!("Parsed {} messages", messages.len());
    Ok(messages)
}

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
}

fn parse_received(raw: &str) -> Option<NaiveDate> {
    if raw.len() >= 12 && raw.chars().all(|c| c.is_ascii_digit()) {
        let millis: i64 = raw.parse().ok()?;
        return DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive());
    }

    // Drop a trailing time ("2023-05-01 10:15:00", "2023-05-01T10:15:00Z")
    let day = raw.split([' ', 'T']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(day, "%m/%d/%Y"))
        .ok()
}

const SUBSCRIPTION_KEYWORDS: &[&str] = &[
    "subscription",
    "subscribe",
    "renew",
    "membership",
    "member",
    "billed",
    "billing",
    "charged",
    "payment",
    "debited",
    "auto-pay",
    "autopay",
    "recurring",
    "trial",
    "plan",
    "premium",
    "invoice",
    "receipt",
    "/mo",
    "per month",
    "/yr",
    "per year",
];

/// Cheap check for billing-related wording before running the extractors
pub fn looks_like_subscription(body: &str) -> bool {
    let lower = body.to_lowercase();
    SUBSCRIPTION_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Stable SHA-256 hex digest of a message's sender and body
pub fn message_fingerprint(message: &SmsMessage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(
        message
            .address
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
            .as_bytes(),
    );
    hasher.update(b"|");
    hasher.update(message.body.trim().as_bytes());
    hex::encode(hasher.finalize())
}

/// Extract every message and keep the confident, distinct detections
///
/// Each message uses its received date as the reference date, falling back to
/// `reference` when it has none.
pub fn scan_messages(
    extractor: &SubscriptionExtractor,
    messages: &[SmsMessage],
    reference: NaiveDate,
    min_confidence: f64,
) -> ScanReport {
    let mut report = ScanReport {
        total: messages.len(),
        ..Default::default()
    };
    let mut seen = HashSet::new();
    let mut by_service: HashMap<String, usize> = HashMap::new();

    for message in messages {
        if !looks_like_subscription(&message.body) {
            report.filtered += 1;
            continue;
        }

        let fingerprint = message_fingerprint(message);
        if !seen.insert(fingerprint.clone()) {
            report.duplicates += 1;
            continue;
        }

        let extraction = extractor.extract(
            &message.body,
            message.address.as_deref(),
            message.received.unwrap_or(reference),
        );
        if extraction.overall_confidence < min_confidence {
            debug!(
                "Dropping message {} at confidence {:.2}",
                &fingerprint[..12],
                extraction.overall_confidence
            );
            report.below_threshold += 1;
            continue;
        }

        let detection = Detection {
            fingerprint,
            address: message.address.clone(),
            received: message.received,
            draft: extractor.draft(&extraction),
            extraction,
        };

        let service_key = detection
            .extraction
            .service
            .as_ref()
            .map(|s| s.normalized_name.to_lowercase());

        let existing = service_key
            .as_ref()
            .and_then(|key| by_service.get(key).copied());

        match (existing, service_key) {
            (Some(index), _) => {
                report.merged += 1;
                let kept = &mut report.detections[index];
                if detection.extraction.overall_confidence > kept.extraction.overall_confidence {
                    *kept = detection;
                }
            }
            (None, Some(key)) => {
                by_service.insert(key, report.detections.len());
                report.detections.push(detection);
            }
            (None, None) => report.detections.push(detection),
        }
    }

    report.detections.sort_by(|a, b| {
        b.extraction
            .overall_confidence
            .total_cmp(&a.extraction.overall_confidence)
    });

    info!(
        "Scanned {} messages: {} detected, {} filtered, {} duplicate, {} below threshold",
        report.total,
        report.detections.len(),
        report.filtered,
        report.duplicates,
        report.below_threshold
    );
    report
}
