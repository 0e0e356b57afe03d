//! Billing cycle extraction
//!
//! Explicit intervals ("every 2 months") are checked first, then cycle
//! keywords, then price shorthand ("/mo", "per year"). A bare "subscription
//! payment" with no interval marker is read as monthly at low confidence.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::models::{BillingCycle, BillingCycleMatch};
use crate::models::BillingCycle::{Biannual, Monthly, Quarterly, Weekly, Yearly};

/// How a rule turns its match into a cycle
#[derive(Debug, Clone, Copy)]
enum CycleFrom {
    Fixed(BillingCycle),
    /// Read `n` and `unit` captures ("every 2 months")
    Interval,
}

struct CycleRule {
    name: &'static str,
    regex: Regex,
    confidence: f64,
    cycle: CycleFrom,
}

impl CycleRule {
    fn new(name: &'static str, pattern: &str, confidence: f64, cycle: CycleFrom) -> Self {
        let regex = Regex::new(pattern).expect("valid regex");
        Self {
            name,
            regex,
            confidence,
            cycle,
        }
    }

    fn build(&self, caps: &Captures) -> Option<BillingCycleMatch> {
        match self.cycle {
            CycleFrom::Fixed(cycle) => Some(BillingCycleMatch::named(cycle, self.confidence)),
            CycleFrom::Interval => every_n(caps, self.confidence),
        }
    }
}

/// "every N months" / "every N years" / "every week"
fn every_n(caps: &Captures, confidence: f64) -> Option<BillingCycleMatch> {
    let n: u32 = match caps.name("n") {
        Some(m) => parse_count(m.as_str())?,
        None => 1,
    };
    if n == 0 {
        return None;
    }

    let unit = caps.name("unit")?.as_str().to_lowercase();
    let months = if unit.starts_with("month") {
        n
    } else if unit.starts_with("year") {
        n.checked_mul(12)?
    } else if unit.starts_with("quarter") {
        n.checked_mul(3)?
    } else if unit.starts_with("week") {
        // Only a single week has a named cycle
        return (n == 1).then(|| BillingCycleMatch::named(Weekly, confidence));
    } else {
        return None;
    };

    Some(BillingCycleMatch::every_months(months, confidence))
}

/// Number written as digits or a small English word
fn parse_count(raw: &str) -> Option<u32> {
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let n = match raw.to_lowercase().as_str() {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    };
    Some(n)
}

const COUNT: &str = r"(?P<n>\d{1,3}|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)";

static RULES: Lazy<Vec<CycleRule>> = Lazy::new(|| {
    vec![
        CycleRule::new(
            "every_n_units",
            &format!(r"(?i)\bevery\s+{}\s+(?P<unit>months?|years?|quarters?|weeks?)\b", COUNT),
            0.92,
            CycleFrom::Interval,
        ),
        CycleRule::new(
            "every_unit",
            r"(?i)\bevery\s+(?P<unit>month|year|quarter|week)\b",
            0.9,
            CycleFrom::Interval,
        ),
        CycleRule::new(
            "biannual",
            r"(?i)\b(?:bi-?annual(?:ly)?|semi-?annual(?:ly)?|half-?yearly|twice\s+a\s+year)\b",
            0.9,
            CycleFrom::Fixed(Biannual),
        ),
        CycleRule::new("quarterly", r"(?i)\bquarterly\b", 0.9, CycleFrom::Fixed(Quarterly)),
        CycleRule::new("monthly", r"(?i)\bmonthly\b", 0.9, CycleFrom::Fixed(Monthly)),
        CycleRule::new(
            "yearly",
            r"(?i)\b(?:yearly|annual|annually)\b",
            0.9,
            CycleFrom::Fixed(Yearly),
        ),
        CycleRule::new(
            "weekly",
            r"(?i)(?:^|[^\w-])weekly\b",
            0.9,
            CycleFrom::Fixed(Weekly),
        ),
        CycleRule::new(
            "month_shorthand",
            r"(?i)(?:/\s?(?:mo|mth|month)\b|\b(?:per|a|each)\s+month\b|\bp/m\b)",
            0.85,
            CycleFrom::Fixed(Monthly),
        ),
        CycleRule::new(
            "year_shorthand",
            r"(?i)(?:/\s?(?:yr|year)\b|\b(?:per|a|each)\s+year\b|\bp/a\b)",
            0.85,
            CycleFrom::Fixed(Yearly),
        ),
        CycleRule::new(
            "week_shorthand",
            r"(?i)(?:/\s?(?:wk|week)\b|\b(?:per|a|each)\s+week\b)",
            0.85,
            CycleFrom::Fixed(Weekly),
        ),
        CycleRule::new(
            "quarter_shorthand",
            r"(?i)(?:/\s?(?:qtr|quarter)\b|\b(?:per|a|each)\s+quarter\b)",
            0.85,
            CycleFrom::Fixed(Quarterly),
        ),
        CycleRule::new(
            "subscription_context",
            r"(?i)\b(?:subscription|membership)\s+(?:payment|renewal|fee|charge)\b|\b(?:subscription|membership)\b.{0,40}\brenew(?:s|ed|al)?\b",
            0.5,
            CycleFrom::Fixed(Monthly),
        ),
    ]
});

/// Infer the recurring billing interval from message text
pub fn extract_billing_cycle(text: &str) -> Option<BillingCycleMatch> {
    for rule in RULES.iter() {
        let found = rule
            .regex
            .captures_iter(text)
            .find_map(|caps| rule.build(&caps));

        if let Some(found) = found {
            debug!(
                "Billing cycle {} via {} (confidence {:.2})",
                found.cycle, rule.name, found.confidence
            );
            return Some(found);
        }
    }
    None
}
