//! Overall confidence scoring
//!
//! The overall confidence is the weighted mean of whichever field
//! confidences are present. When amount and service were both found, the
//! critical boost closes that share of the gap between the mean and 1.0.
//! Otherwise the mean is scaled down by how much of the total weight the
//! found fields cover, so a lone weak field cannot look like a confident
//! detection. A sender that confirmed the service then closes its own share
//! of the gap that remains, so it still counts when the score is already
//! high. The result is clamped to [0, 1].

use crate::config::ScoringConfig;
use crate::models::SubscriptionExtraction;

/// Per-field confidences fed into the overall score
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfidenceInputs {
    pub amount: Option<f64>,
    pub service: Option<f64>,
    pub billing: Option<f64>,
    pub date: Option<f64>,
    /// Sender was supplied and confirmed the detected service
    pub sender_confirmed: bool,
}

impl ConfidenceInputs {
    /// Collect the inputs from an extraction's fields
    pub fn from_extraction(extraction: &SubscriptionExtraction, sender_given: bool) -> Self {
        Self {
            amount: extraction.amount.as_ref().map(|a| a.confidence),
            service: extraction.service.as_ref().map(|s| s.confidence),
            billing: extraction.billing_cycle.as_ref().map(|b| b.confidence),
            date: extraction.date.as_ref().map(|d| d.confidence),
            sender_confirmed: sender_given
                && extraction
                    .service
                    .as_ref()
                    .is_some_and(|s| s.sender_confirmed),
        }
    }

    fn has_critical_fields(&self) -> bool {
        self.amount.is_some() && self.service.is_some()
    }
}

/// Combine field confidences into one score in [0, 1]
pub fn overall_confidence(inputs: &ConfidenceInputs, scoring: &ScoringConfig) -> f64 {
    let fields = [
        (inputs.amount, scoring.amount_weight),
        (inputs.service, scoring.service_weight),
        (inputs.billing, scoring.billing_weight),
        (inputs.date, scoring.date_weight),
    ];

    let (weighted, present_weight) = fields
        .iter()
        .filter_map(|(confidence, weight)| confidence.map(|c| (c.clamp(0.0, 1.0), *weight)))
        .fold((0.0, 0.0), |(sum, total), (c, w)| (sum + c * w, total + w));

    if present_weight <= 0.0 {
        return 0.0;
    }
    let mean = weighted / present_weight;

    let mut score = if inputs.has_critical_fields() {
        raise(mean, scoring.critical_boost)
    } else {
        let total = scoring.total_weight();
        let coverage = if total > 0.0 { present_weight / total } else { 0.0 };
        mean * (scoring.coverage_floor + (1.0 - scoring.coverage_floor) * coverage)
    };

    if inputs.sender_confirmed {
        score = raise(score, scoring.sender_boost);
    }

    score.clamp(0.0, 1.0)
}

/// Move `score` toward 1.0 by `boost` of the distance left
fn raise(score: f64, boost: f64) -> f64 {
    score + boost * (1.0 - score)
}
