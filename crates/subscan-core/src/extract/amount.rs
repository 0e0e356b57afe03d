//! Amount and currency extraction
//!
//! Rules run in priority order. A later rule only replaces an earlier match
//! when its confidence is strictly higher, so ties go to the more specific
//! rule regardless of where the amounts sit in the text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use super::tables::{CURRENCY_CODES, CURRENCY_NAMES, CURRENCY_NAME_MAP, CURRENCY_SYMBOLS};
use crate::models::AmountMatch;

/// Currency used when the text names none
pub const DEFAULT_CURRENCY: &str = "USD";

/// Grouped ("1.299,00", "1,299.00") or plain ("9.99", "9,99", "15") number
const NUMBER: &str = r"(?P<amount>\d{1,3}(?:[.,]\d{3})+(?:[.,]\d{1,2})?|\d+(?:[.,]\d{1,2})?)";

/// Words that turn a number into a quantity rather than a price
const UNIT_WORDS: &[&str] = &[
    "day", "days", "week", "weeks", "month", "months", "mo", "year", "years", "yr", "yrs",
    "hour", "hours", "hr", "hrs", "minute", "minutes", "min", "mins", "gb", "mb", "tb",
    "percent", "device", "devices", "screen", "screens", "user", "users", "profile",
    "profiles", "times", "am", "pm",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurrencyFrom {
    Symbol,
    Code,
    Name,
    Default,
}

struct AmountRule {
    name: &'static str,
    regex: Regex,
    confidence: f64,
    currency: CurrencyFrom,
    /// Skip numbers followed by a unit word ("3 months", "4 screens")
    reject_units: bool,
}

impl AmountRule {
    fn new(name: &'static str, pattern: &str, confidence: f64, currency: CurrencyFrom) -> Self {
        let regex = Regex::new(pattern).expect("valid regex");
        Self {
            name,
            regex,
            confidence,
            currency,
            reject_units: currency == CurrencyFrom::Default,
        }
    }

    /// First acceptable candidate in the text for this rule
    fn find(&self, text: &str, default_currency: &str) -> Option<AmountMatch> {
        self.regex
            .captures_iter(text)
            .find_map(|caps| self.candidate(text, &caps, default_currency))
    }

    fn candidate(&self, text: &str, caps: &Captures, default_currency: &str) -> Option<AmountMatch> {
        let whole = caps.get(0)?;
        let amount = caps.name("amount")?;

        if starts_mid_token(text, whole.start()) {
            return None;
        }
        let rest = &text[amount.end()..];
        if continues_as_date_or_time(rest) {
            return None;
        }
        if self.reject_units && followed_by_unit(rest) {
            return None;
        }

        let value = parse_amount(amount.as_str()).filter(|v| *v > 0.0)?;
        let currency = self.resolve_currency(caps, default_currency)?;

        Some(AmountMatch {
            value,
            currency,
            confidence: self.confidence,
        })
    }

    fn resolve_currency(&self, caps: &Captures, default_currency: &str) -> Option<String> {
        let raw = caps.name("cur").map(|m| m.as_str());
        match self.currency {
            CurrencyFrom::Symbol => raw.and_then(symbol_to_code).map(str::to_string),
            CurrencyFrom::Code => raw
                .map(|c| c.to_uppercase())
                .filter(|c| CURRENCY_CODES.contains(c.as_str())),
            CurrencyFrom::Name => raw.and_then(|n| {
                CURRENCY_NAME_MAP
                    .get(n.to_lowercase().as_str())
                    .map(|c| c.to_string())
            }),
            CurrencyFrom::Default => Some(default_currency.to_uppercase()),
        }
    }
}

/// Letter-led symbols that are written after the amount
const SUFFIX_LETTER_SYMBOLS: &[&str] = &["zł"];

static RULES: Lazy<Vec<AmountRule>> = Lazy::new(|| {
    let prefix_symbols = alternation(CURRENCY_SYMBOLS.iter().map(|(s, _)| *s));
    let suffix_symbols = alternation(
        CURRENCY_SYMBOLS
            .iter()
            .map(|(s, _)| *s)
            .filter(|s| {
                SUFFIX_LETTER_SYMBOLS.contains(s) || !s.starts_with(|c: char| c.is_ascii_alphabetic())
            }),
    );
    let names = alternation(CURRENCY_NAMES.iter().map(|(n, _)| *n));

    vec![
        AmountRule::new(
            "symbol_prefix",
            &format!(r"(?P<cur>{})\s?{}", prefix_symbols, NUMBER),
            0.92,
            CurrencyFrom::Symbol,
        ),
        AmountRule::new(
            "code_prefix",
            &format!(r"\b(?P<cur>[A-Z]{{3}})\s?{}", NUMBER),
            0.9,
            CurrencyFrom::Code,
        ),
        AmountRule::new(
            "code_suffix",
            &format!(r"{}\s?(?P<cur>[A-Z]{{3}})\b", NUMBER),
            0.9,
            CurrencyFrom::Code,
        ),
        AmountRule::new(
            "symbol_suffix",
            &format!(r"{}\s?(?P<cur>{})", NUMBER, suffix_symbols),
            0.88,
            CurrencyFrom::Symbol,
        ),
        AmountRule::new(
            "currency_name",
            &format!(r"(?i){}\s?(?P<cur>{})\b", NUMBER, names),
            0.85,
            CurrencyFrom::Name,
        ),
        AmountRule::new(
            "label",
            &format!(
                r"(?i)\b(?:price|fee|amount|total|cost|charge|amount due|total due|plan price)\s*[:=]\s*{}",
                NUMBER
            ),
            0.75,
            CurrencyFrom::Default,
        ),
        AmountRule::new(
            "preposition",
            &format!(
                r"(?i)\b(?:payment|charged?|billed|debited|paid|renewal|renewed|fee)\s+(?:of|for|with|at)\s+{}",
                NUMBER
            ),
            0.7,
            CurrencyFrom::Default,
        ),
        AmountRule::new(
            "subscription_context",
            &format!(
                r"(?i)\b(?:subscription|membership|plan|renewal)\b[^\d\n]{{0,40}}?{}",
                NUMBER
            ),
            0.5,
            CurrencyFrom::Default,
        ),
    ]
});

/// Extract the most confident amount, assuming USD when no currency is named
pub fn extract_amount(text: &str) -> Option<AmountMatch> {
    extract_amount_with_default(text, DEFAULT_CURRENCY)
}

/// Extract the most confident amount, using `default_currency` for bare numbers
pub fn extract_amount_with_default(text: &str, default_currency: &str) -> Option<AmountMatch> {
    let mut best: Option<(AmountMatch, &'static str)> = None;

    for rule in RULES.iter() {
        if best
            .as_ref()
            .is_some_and(|(m, _)| m.confidence >= rule.confidence)
        {
            continue;
        }
        if let Some(found) = rule.find(text, default_currency) {
            best = Some((found, rule.name));
        }
    }

    if let Some((m, rule)) = &best {
        debug!(
            "Amount {} {} via {} (confidence {:.2})",
            m.value, m.currency, rule, m.confidence
        );
    }

    best.map(|(m, _)| m)
}

/// Parse a number using either `.` or `,` as the decimal separator
///
/// - Both present: whichever comes last is the decimal point ("1.299,00", "1,299.00")
/// - Only commas: a single comma followed by 1-2 digits is decimal ("9,99"),
///   anything else is grouping ("1,299")
/// - Only periods: more than one means grouping ("1.299.000")
pub fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let has_dot = raw.contains('.');
    let has_comma = raw.contains(',');

    let normalized = match (has_dot, has_comma) {
        (true, true) => {
            let last_dot = raw.rfind('.')?;
            let last_comma = raw.rfind(',')?;
            if last_comma > last_dot {
                raw.replace('.', "").replace(',', ".")
            } else {
                raw.replace(',', "")
            }
        }
        (false, true) => {
            if raw.matches(',').count() == 1 && has_decimal_tail(raw, ',') {
                raw.replace(',', ".")
            } else {
                raw.replace(',', "")
            }
        }
        (true, false) => {
            if raw.matches('.').count() > 1 {
                raw.replace('.', "")
            } else {
                raw.to_string()
            }
        }
        (false, false) => raw.to_string(),
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn has_decimal_tail(raw: &str, separator: char) -> bool {
    raw.rsplit(separator)
        .next()
        .is_some_and(|tail| (1..=2).contains(&tail.len()) && tail.chars().all(|c| c.is_ascii_digit()))
}

fn symbol_to_code(symbol: &str) -> Option<&'static str> {
    CURRENCY_SYMBOLS
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, code)| *code)
}

fn alternation<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.map(regex::escape).collect::<Vec<_>>().join("|")
}

/// Match begins inside a word or inside a longer number
fn starts_mid_token(text: &str, start: usize) -> bool {
    let first = text[start..].chars().next();
    let prev = text[..start].chars().next_back();
    match (prev, first) {
        (Some(p), Some(f)) if f.is_alphanumeric() && p.is_alphanumeric() => true,
        (Some(p), Some(f)) if f.is_ascii_digit() && (p == '.' || p == ',') => true,
        _ => false,
    }
}

/// "05/15/2023", "2023-05-15", "10:30" after the leading number
fn continues_as_date_or_time(rest: &str) -> bool {
    let mut chars = rest.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('/' | '-' | ':' | '.'), Some(d)) if d.is_ascii_digit()
    )
}

fn followed_by_unit(rest: &str) -> bool {
    let trimmed = rest.trim_start();
    if trimmed.starts_with('%') {
        return true;
    }
    let word: String = trimmed
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect::<String>()
        .to_lowercase();
    UNIT_WORDS.contains(&word.as_str())
}
