//! Subscan Core Library
//!
//! Pulls subscription details out of free-form SMS and notification text:
//! - Amount and currency extraction with locale-aware number parsing
//! - Service name resolution from text, aliases, and sender metadata
//! - Billing cycle inference from keywords, shorthand, and intervals
//! - Absolute and relative date parsing against an explicit reference date
//! - Overall confidence scoring with configurable weights and boosts
//! - Batch scanning of exported SMS messages

pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod score;
pub mod sms;

pub use config::{load_config, parse_config, ConfigSource, ExtractorConfig, ScoringConfig};
pub use error::{Error, Result};
pub use extract::{extract_subscription_data, SubscriptionExtractor};
pub use models::{
    AmountMatch, BillingCycle, BillingCycleMatch, ConfidenceLevel, DateMatch, ServiceCategory,
    ServiceMatch, ServiceSource, SubscriptionDraft, SubscriptionExtraction,
};
pub use score::{overall_confidence, ConfidenceInputs};
pub use sms::{parse_messages_csv, scan_messages, ScanReport, SmsMessage};
