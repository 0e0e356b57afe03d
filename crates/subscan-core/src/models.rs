//! Domain models for Subscan
//!
//! Every extraction result is a plain value created fresh per call.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A monetary amount found in message text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountMatch {
    /// Always positive and finite
    pub value: f64,
    /// Three-letter currency code (e.g., "USD")
    pub currency: String,
    pub confidence: f64,
}

/// Which resolution step produced a service name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceSource {
    /// Canonical service name appeared verbatim in the text
    Direct,
    /// A known alias or variant appeared in the text
    Alias,
    /// Sender domain or sender ID matched a known service
    SenderDomain,
    /// Captured from a phrase like "welcome to X"
    Pattern,
    /// Cleaned-up sender string, nothing else matched
    SenderCleanup,
}

impl ServiceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Alias => "alias",
            Self::SenderDomain => "sender_domain",
            Self::Pattern => "pattern",
            Self::SenderCleanup => "sender_cleanup",
        }
    }
}

/// Broad service category, used to pre-select a category in the confirm form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Streaming,
    Music,
    CloudStorage,
    Software,
    Gaming,
    News,
    Fitness,
    Education,
    Social,
    Delivery,
    Other,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Streaming => "streaming",
            Self::Music => "music",
            Self::CloudStorage => "cloud_storage",
            Self::Software => "software",
            Self::Gaming => "gaming",
            Self::News => "news",
            Self::Fitness => "fitness",
            Self::Education => "education",
            Self::Social => "social",
            Self::Delivery => "delivery",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Streaming => "Streaming",
            Self::Music => "Music",
            Self::CloudStorage => "Cloud Storage",
            Self::Software => "Software",
            Self::Gaming => "Gaming",
            Self::News => "News",
            Self::Fitness => "Fitness",
            Self::Education => "Education",
            Self::Social => "Social",
            Self::Delivery => "Delivery",
            Self::Other => "Other",
        }
    }
}

/// The subscribed-to service identified in a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMatch {
    /// Raw text that matched (or the raw sender for sender-based matches)
    pub name: String,
    /// Canonical display name, never empty
    pub normalized_name: String,
    pub confidence: f64,
    pub source: ServiceSource,
    /// Sender address agrees with the detected service
    pub sender_confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ServiceCategory>,
}

/// Recurring billing interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Weekly,
    Monthly,
    Quarterly,
    Biannual,
    Yearly,
    /// Every N months, where N has no named cycle
    Custom,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Biannual => "biannual",
            Self::Yearly => "yearly",
            Self::Custom => "custom",
        }
    }

    /// Named cycle for an "every N months" interval, or `Custom`
    pub fn from_months(months: u32) -> Self {
        match months {
            1 => Self::Monthly,
            3 => Self::Quarterly,
            6 => Self::Biannual,
            12 => Self::Yearly,
            _ => Self::Custom,
        }
    }
}

impl std::str::FromStr for BillingCycle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "biannual" | "semiannual" | "semi-annual" => Ok(Self::Biannual),
            "yearly" | "annual" | "annually" => Ok(Self::Yearly),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("Unknown billing cycle: {}", s)),
        }
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A billing cycle found in message text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingCycleMatch {
    pub cycle: BillingCycle,
    /// Months between charges; set only when `cycle` is `Custom`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_count: Option<u32>,
    pub confidence: f64,
}

impl BillingCycleMatch {
    pub fn named(cycle: BillingCycle, confidence: f64) -> Self {
        Self {
            cycle,
            interval_count: None,
            confidence,
        }
    }

    /// Build from a month count, keeping `interval_count` only for custom cycles
    pub fn every_months(months: u32, confidence: f64) -> Self {
        let cycle = BillingCycle::from_months(months);
        Self {
            cycle,
            interval_count: (cycle == BillingCycle::Custom).then_some(months),
            confidence,
        }
    }
}

/// A date found in message text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateMatch {
    pub date: NaiveDate,
    /// Computed from an offset ("in 7 days", "next month") against the reference date
    pub is_relative: bool,
    pub confidence: f64,
}

impl DateMatch {
    /// Zero-indexed month (January = 0)
    pub fn month0(&self) -> u32 {
        self.date.month0()
    }
}

/// Confidence band used to color-code an extraction for the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub const HIGH_THRESHOLD: f64 = 0.85;
    pub const MEDIUM_THRESHOLD: f64 = 0.60;

    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= Self::HIGH_THRESHOLD {
            Self::High
        } else if confidence >= Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Combined result of running every extractor over one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionExtraction {
    pub amount: Option<AmountMatch>,
    pub service: Option<ServiceMatch>,
    pub billing_cycle: Option<BillingCycleMatch>,
    pub date: Option<DateMatch>,
    /// Always within [0, 1]
    pub overall_confidence: f64,
}

impl SubscriptionExtraction {
    pub fn level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.overall_confidence)
    }

    /// True when amount and service were both found
    pub fn has_critical_fields(&self) -> bool {
        self.amount.is_some() && self.service.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.service.is_none()
            && self.billing_cycle.is_none()
            && self.date.is_none()
    }
}

/// Editable subscription form values pre-filled from an extraction
///
/// Callers show this to the user for confirmation; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionDraft {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_count: Option<u32>,
    pub next_billing_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ServiceCategory>,
    pub confidence: f64,
    pub level: ConfidenceLevel,
}

impl SubscriptionDraft {
    /// Returns None when there is neither a service nor an amount to build on
    pub fn from_extraction(extraction: &SubscriptionExtraction, default_currency: &str) -> Option<Self> {
        if extraction.service.is_none() && extraction.amount.is_none() {
            return None;
        }

        let (billing_cycle, interval_count) = extraction
            .billing_cycle
            .as_ref()
            .map(|b| (b.cycle, b.interval_count))
            .unwrap_or((BillingCycle::Monthly, None));

        Some(Self {
            name: extraction.service.as_ref().map(|s| s.normalized_name.clone()),
            amount: extraction.amount.as_ref().map(|a| a.value),
            currency: extraction
                .amount
                .as_ref()
                .map(|a| a.currency.clone())
                .unwrap_or_else(|| default_currency.to_string()),
            billing_cycle,
            interval_count,
            next_billing_date: extraction.date.as_ref().map(|d| d.date),
            category: extraction.service.as_ref().and_then(|s| s.category),
            confidence: extraction.overall_confidence,
            level: extraction.level(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_cycle_from_months() {
        assert_eq!(BillingCycle::from_months(1), BillingCycle::Monthly);
        assert_eq!(BillingCycle::from_months(3), BillingCycle::Quarterly);
        assert_eq!(BillingCycle::from_months(6), BillingCycle::Biannual);
        assert_eq!(BillingCycle::from_months(12), BillingCycle::Yearly);
        assert_eq!(BillingCycle::from_months(2), BillingCycle::Custom);
    }

    #[test]
    fn test_every_months_interval_only_for_custom() {
        let quarterly = BillingCycleMatch::every_months(3, 0.9);
        assert_eq!(quarterly.cycle, BillingCycle::Quarterly);
        assert_eq!(quarterly.interval_count, None);

        let custom = BillingCycleMatch::every_months(2, 0.9);
        assert_eq!(custom.cycle, BillingCycle::Custom);
        assert_eq!(custom.interval_count, Some(2));
    }

    #[test]
    fn test_billing_cycle_parse() {
        assert_eq!("Annual".parse::<BillingCycle>(), Ok(BillingCycle::Yearly));
        assert_eq!("semi-annual".parse::<BillingCycle>(), Ok(BillingCycle::Biannual));
        assert!("fortnightly".parse::<BillingCycle>().is_err());
    }

    #[test]
    fn test_confidence_level_bands() {
        assert_eq!(ConfidenceLevel::from_confidence(0.92), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(0.85), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(0.84), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.60), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.59), ConfidenceLevel::Low);
    }

    #[test]
    fn test_month0() {
        let m = DateMatch {
            date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            is_relative: true,
            confidence: 0.8,
        };
        assert_eq!(m.month0(), 5);
    }

    #[test]
    fn test_draft_defaults() {
        let extraction = SubscriptionExtraction {
            amount: None,
            service: Some(ServiceMatch {
                name: "Netflix".to_string(),
                normalized_name: "Netflix".to_string(),
                confidence: 0.95,
                source: ServiceSource::Direct,
                sender_confirmed: false,
                category: Some(ServiceCategory::Streaming),
            }),
            billing_cycle: None,
            date: None,
            overall_confidence: 0.5,
        };

        let draft = SubscriptionDraft::from_extraction(&extraction, "EUR").unwrap();
        assert_eq!(draft.name.as_deref(), Some("Netflix"));
        assert_eq!(draft.currency, "EUR");
        assert_eq!(draft.billing_cycle, BillingCycle::Monthly);
        assert_eq!(draft.category, Some(ServiceCategory::Streaming));
        assert_eq!(draft.level, ConfidenceLevel::Low);
    }

    #[test]
    fn test_draft_requires_service_or_amount() {
        let extraction = SubscriptionExtraction {
            amount: None,
            service: None,
            billing_cycle: Some(BillingCycleMatch::named(BillingCycle::Monthly, 0.9)),
            date: None,
            overall_confidence: 0.3,
        };
        assert!(SubscriptionDraft::from_extraction(&extraction, "USD").is_none());
    }
}
