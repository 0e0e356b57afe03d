//! Subscription data extraction
//!
//! Four independent extractors each look for one field in the message text:
//! - `amount`: monetary amount and currency
//! - `service`: the subscribed-to service, using the sender as a hint
//! - `billing`: the recurring billing cycle
//! - `date`: a billing, renewal, or expiry date
//!
//! `SubscriptionExtractor` runs all four and scores the combined result.
//! Every extractor returns `None` when nothing is found; extraction never fails.

pub mod amount;
pub mod billing;
pub mod date;
pub mod service;
mod tables;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::ExtractorConfig;
use crate::models::{SubscriptionDraft, SubscriptionExtraction};
use crate::score::{overall_confidence, ConfidenceInputs};

pub use amount::{extract_amount, extract_amount_with_default, parse_amount};
pub use billing::extract_billing_cycle;
pub use date::extract_date;
pub use service::extract_service_name;

/// Runs every field extractor with one configuration
#[derive(Debug, Clone, Default)]
pub struct SubscriptionExtractor {
    config: ExtractorConfig,
}

impl SubscriptionExtractor {
    /// Extractor with the built-in defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract every field from one message
    ///
    /// `reference` is the date relative phrases ("in 7 days") count from.
    /// The same inputs always give the same result.
    pub fn extract(
        &self,
        text: &str,
        sender: Option<&str>,
        reference: NaiveDate,
    ) -> SubscriptionExtraction {
        let sender = sender.map(str::trim).filter(|s| !s.is_empty());

        let mut extraction = SubscriptionExtraction {
            amount: extract_amount_with_default(text, &self.config.amount.default_currency),
            service: extract_service_name(text, sender),
            billing_cycle: extract_billing_cycle(text),
            date: extract_date(text, reference),
            overall_confidence: 0.0,
        };

        let inputs = ConfidenceInputs::from_extraction(&extraction, sender.is_some());
        extraction.overall_confidence = overall_confidence(&inputs, &self.config.scoring);

        debug!(
            "Extracted amount: {}, service: {}, cycle: {}, date: {}, overall {:.2}",
            extraction.amount.is_some(),
            extraction.service.is_some(),
            extraction.billing_cycle.is_some(),
            extraction.date.is_some(),
            extraction.overall_confidence
        );
        extraction
    }

    /// Form values for the user to confirm, using the configured default currency
    pub fn draft(&self, extraction: &SubscriptionExtraction) -> Option<SubscriptionDraft> {
        SubscriptionDraft::from_extraction(extraction, &self.config.amount.default_currency)
    }
}

/// Extract with the default configuration
pub fn extract_subscription_data(
    text: &str,
    sender: Option<&str>,
    reference: NaiveDate,
) -> SubscriptionExtraction {
    SubscriptionExtractor::new().extract(text, sender, reference)
}

/// Today's local date, for callers that want "now" as the reference
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
