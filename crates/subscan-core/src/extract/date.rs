//! Date extraction
//!
//! Absolute formats have a fixed field order chosen by separator: slashes are
//! month/day/year, dots are day.month.year, dashes are ISO year-month-day.
//! Relative expressions are resolved against an explicit reference date so
//! extraction stays deterministic.
//!
//! When several dates appear, one wrapped in billing context ("renews on",
//! "ends in", "... is your next billing date") is preferred over a bare one,
//! then the higher-confidence format wins, then the earlier rule, then the
//! earlier position.

use chrono::{Datelike, Days, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::models::DateMatch;

/// Added to a candidate's confidence when billing context surrounds it
const CONTEXT_BOOST: f64 = 0.05;
const MAX_CONFIDENCE: f64 = 0.99;

const MONTH_NAMES: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

const COUNT: &str = r"(?P<n>\d{1,3}|an?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateFrom {
    Iso,
    MonthDayYear,
    DayMonthYear,
    /// MM/DD/YYYY or MM/DD/YY
    Slash,
    /// DD.MM.YYYY
    Dot,
    /// "June 5" with the year taken from the reference date
    MonthDay,
    Today,
    Tomorrow,
    InDays,
    InWeeks,
    InMonths,
    NextWeek,
    NextMonth,
}

impl DateFrom {
    fn is_relative(&self) -> bool {
        matches!(
            self,
            Self::Today
                | Self::Tomorrow
                | Self::InDays
                | Self::InWeeks
                | Self::InMonths
                | Self::NextWeek
                | Self::NextMonth
        )
    }
}

struct DateRule {
    name: &'static str,
    regex: Regex,
    confidence: f64,
    kind: DateFrom,
}

impl DateRule {
    fn new(name: &'static str, pattern: &str, confidence: f64, kind: DateFrom) -> Self {
        let regex = Regex::new(pattern).expect("valid regex");
        Self {
            name,
            regex,
            confidence,
            kind,
        }
    }

    fn resolve(&self, caps: &Captures, reference: NaiveDate) -> Option<NaiveDate> {
        match self.kind {
            DateFrom::Iso | DateFrom::Slash | DateFrom::Dot => {
                let year = expand_year(caps.name("y")?.as_str(), reference)?;
                let month = caps.name("m")?.as_str().parse().ok()?;
                let day = caps.name("d")?.as_str().parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, day)
            }
            DateFrom::MonthDayYear | DateFrom::DayMonthYear => {
                let year = caps.name("y")?.as_str().parse().ok()?;
                let month = month_from_name(caps.name("mon")?.as_str())?;
                let day = caps.name("d")?.as_str().parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, day)
            }
            DateFrom::MonthDay => {
                let month = month_from_name(caps.name("mon")?.as_str())?;
                let day = caps.name("d")?.as_str().parse().ok()?;
                let this_year = NaiveDate::from_ymd_opt(reference.year(), month, day)?;
                if this_year >= reference {
                    Some(this_year)
                } else {
                    NaiveDate::from_ymd_opt(reference.year() + 1, month, day)
                }
            }
            DateFrom::Today => Some(reference),
            DateFrom::Tomorrow => reference.checked_add_days(Days::new(1)),
            DateFrom::InDays => reference.checked_add_days(Days::new(count(caps)?)),
            DateFrom::InWeeks => reference.checked_add_days(Days::new(count(caps)?.checked_mul(7)?)),
            DateFrom::InMonths => {
                let n = u32::try_from(count(caps)?).ok()?;
                reference.checked_add_months(Months::new(n))
            }
            DateFrom::NextWeek => reference.checked_add_days(Days::new(7)),
            DateFrom::NextMonth => reference.checked_add_months(Months::new(1)),
        }
    }
}

static RULES: Lazy<Vec<DateRule>> = Lazy::new(|| {
    vec![
        DateRule::new(
            "iso",
            r"\b(?P<y>\d{4})-(?P<m>\d{1,2})-(?P<d>\d{1,2})\b",
            0.95,
            DateFrom::Iso,
        ),
        DateRule::new(
            "month_day_year",
            &format!(
                r"(?i)\b(?P<mon>{})\.?\s+(?P<d>\d{{1,2}})(?:st|nd|rd|th)?,?\s+(?P<y>\d{{4}})\b",
                MONTH_NAMES
            ),
            0.9,
            DateFrom::MonthDayYear,
        ),
        DateRule::new(
            "day_month_year",
            &format!(
                r"(?i)\b(?P<d>\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?(?P<mon>{})\.?,?\s+(?P<y>\d{{4}})\b",
                MONTH_NAMES
            ),
            0.9,
            DateFrom::DayMonthYear,
        ),
        DateRule::new(
            "slash_mdy",
            r"\b(?P<m>\d{1,2})/(?P<d>\d{1,2})/(?P<y>\d{4}|\d{2})\b",
            0.85,
            DateFrom::Slash,
        ),
        DateRule::new(
            "dot_dmy",
            r"\b(?P<d>\d{1,2})\.(?P<m>\d{1,2})\.(?P<y>\d{4})\b",
            0.85,
            DateFrom::Dot,
        ),
        DateRule::new(
            "tomorrow",
            r"(?i)\btomorrow\b",
            0.85,
            DateFrom::Tomorrow,
        ),
        DateRule::new(
            "in_days",
            &format!(r"(?i)\bin\s+{}\s+days?\b", COUNT),
            0.85,
            DateFrom::InDays,
        ),
        DateRule::new(
            "in_weeks",
            &format!(r"(?i)\bin\s+{}\s+weeks?\b", COUNT),
            0.85,
            DateFrom::InWeeks,
        ),
        DateRule::new(
            "in_months",
            &format!(r"(?i)\bin\s+{}\s+months?\b", COUNT),
            0.8,
            DateFrom::InMonths,
        ),
        DateRule::new("next_week", r"(?i)\bnext\s+week\b", 0.8, DateFrom::NextWeek),
        DateRule::new("next_month", r"(?i)\bnext\s+month\b", 0.8, DateFrom::NextMonth),
        DateRule::new(
            "month_day",
            &format!(
                r"(?i)\b(?P<mon>{})\.?\s+(?P<d>\d{{1,2}})(?:st|nd|rd|th)?\b",
                MONTH_NAMES
            ),
            0.7,
            DateFrom::MonthDay,
        ),
        DateRule::new("today", r"(?i)\btoday\b", 0.75, DateFrom::Today),
    ]
});

/// Billing verb or label right before a date
static CONTEXT_BEFORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:ends?|ending|expires?|expiring|expiry|renews?|renewing|renewal(?:\s+date)?|due|billed|charged|scheduled\s+for|valid\s+(?:until|till|through)|next\s+(?:billing|payment|charge|renewal)(?:\s+date)?|billing\s+date|starts?|starting|until|by)(?:\s+(?:on|at|in|is|date))?\s*:?\s*$",
    )
    .expect("valid regex")
});

/// "... is your next billing date" right after a date
static CONTEXT_AFTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:is|will\s+be)\s+(?:your|the)\s+(?:next\s+)?(?:billing|payment|renewal|charge|due|expiry|expiration)",
    )
    .expect("valid regex")
});

struct Candidate {
    date: NaiveDate,
    is_relative: bool,
    confidence: f64,
    has_context: bool,
    rule: &'static str,
}

/// Find the best date in the text, resolving relative phrases against `reference`
pub fn extract_date(text: &str, reference: NaiveDate) -> Option<DateMatch> {
    let mut best: Option<Candidate> = None;

    for rule in RULES.iter() {
        for caps in rule.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let Some(date) = rule.resolve(&caps, reference) else {
                continue;
            };

            let has_context = CONTEXT_BEFORE.is_match(&text[..whole.start()])
                || CONTEXT_AFTER.is_match(&text[whole.end()..]);
            let confidence = if has_context {
                (rule.confidence + CONTEXT_BOOST).min(MAX_CONFIDENCE)
            } else {
                rule.confidence
            };

            let better = match &best {
                None => true,
                Some(current) => {
                    (has_context, confidence) > (current.has_context, current.confidence)
                }
            };
            if better {
                best = Some(Candidate {
                    date,
                    is_relative: rule.kind.is_relative(),
                    confidence,
                    has_context,
                    rule: rule.name,
                });
            }
        }
    }

    let best = best?;
    debug!(
        "Date {} via {} (relative: {}, context: {}, confidence {:.2})",
        best.date, best.rule, best.is_relative, best.has_context, best.confidence
    );
    Some(DateMatch {
        date: best.date,
        is_relative: best.is_relative,
        confidence: best.confidence,
    })
}

/// Four-digit years pass through; two-digit years land in the reference century
fn expand_year(raw: &str, reference: NaiveDate) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    if raw.len() == 2 {
        Some(reference.year() / 100 * 100 + year)
    } else {
        Some(year)
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn count(caps: &Captures) -> Option<u64> {
    let raw = caps.name("n")?.as_str();
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n);
    }
    let n = match raw.to_lowercase().as_str() {
        "a" | "an" | "one" => 1,
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
