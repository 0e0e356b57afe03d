//! Service name resolution
//!
//! Resolution order, first success wins:
//! 1. Canonical service name in the text
//! 2. Known alias in the text
//! 3. Sender domain / sender ID lookup
//! 4. Phrase capture ("subscription to X", "welcome to X")
//! 5. Cleaned-up sender string
//!
//! A text match that the sender agrees with is marked `sender_confirmed` and
//! scores above either signal alone.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::tables::{
    KnownService, ServiceTerm, COMMON_WORD_TERMS, MULTI_LABEL_SUFFIXES, SENDER_NOISE,
    SERVICE_BY_SENDER_KEY, SERVICE_TERMS,
};
use crate::models::{ServiceMatch, ServiceSource};

const DIRECT_CONFIDENCE: f64 = 0.95;
const ALIAS_CONFIDENCE: f64 = 0.9;
const CORROBORATED_CONFIDENCE: f64 = 0.98;
const SENDER_DOMAIN_CONFIDENCE: f64 = 0.8;
const PATTERN_CORROBORATED_CONFIDENCE: f64 = 0.85;
const SENDER_CLEANUP_CONFIDENCE: f64 = 0.4;

/// Minimum sender key length for prefix matching ("netflixin" -> "netflix")
const MIN_PREFIX_KEY_LEN: usize = 5;

/// Leading words that mean the capture grabbed a sentence start, not a name
const NAME_STOPWORDS: &[&str] = &[
    "your", "our", "this", "that", "a", "an", "my", "we", "you", "it", "please", "dear",
    "thank", "thanks", "hi", "hello", "the",
];

/// Trailing words dropped from a captured name
const GENERIC_TRAILERS: &[&str] = &[
    "subscription", "subscriptions", "membership", "plan", "monthly", "yearly", "annual",
    "weekly", "account", "payment", "renewal", "service", "services", "team", "billing",
];

/// Capitalized run of up to three words
const NAME: &str = r"(?P<name>[A-Z][\w&'+.-]*(?:[ \t]+[A-Z0-9][\w&'+.-]*){0,2})";

struct PhraseRule {
    name: &'static str,
    regex: Regex,
    confidence: f64,
}

impl PhraseRule {
    fn new(name: &'static str, prefix: &str, suffix: &str, confidence: f64) -> Self {
        let pattern = format!(r"{}[ \t]+{}{}", prefix, NAME, suffix);
        let regex = Regex::new(&pattern).expect("valid regex");
        Self {
            name,
            regex,
            confidence,
        }
    }
}

static PHRASE_RULES: Lazy<Vec<PhraseRule>> = Lazy::new(|| {
    vec![
        PhraseRule::new(
            "subscribing_to",
            r"(?i:thank(?:s|[ \t]+you)[ \t]+for[ \t]+subscribing[ \t]+to)",
            "",
            0.7,
        ),
        PhraseRule::new(
            "subscription_to",
            r"(?i:\b(?:subscription|membership|plan)[ \t]+(?:to|for|with|at))",
            "",
            0.68,
        ),
        PhraseRule::new(
            "payment_to",
            r"(?i:\b(?:payment|charge|renewal|purchase)[ \t]+(?:to|from|at))",
            "",
            0.65,
        ),
        PhraseRule::new("welcome_to", r"(?i:\bwelcome[ \t]+to)", "", 0.65),
        PhraseRule::new(
            "your_x_subscription",
            r"(?i:\byour)",
            r"[ \t]+(?i:subscription|membership|plan|account)\b",
            0.6,
        ),
    ]
});

/// What could be learned from the sender address
#[derive(Debug, Default)]
struct SenderInfo {
    /// Lowercase identity key (registrable domain label or sender ID)
    key: Option<String>,
    /// Known service the sender resolves to
    known: Option<&'static KnownService>,
    /// Presentable fallback name
    display: Option<String>,
}

/// Identify the subscribed-to service from message text and optional sender
pub fn extract_service_name(text: &str, sender: Option<&str>) -> Option<ServiceMatch> {
    let sender_info = sender.map(parse_sender).unwrap_or_default();

    for alias_pass in [false, true] {
        if let Some((matched, term)) = find_known_term(text, alias_pass) {
            let corroborated = sender_info
                .known
                .is_some_and(|known| known.name == term.service.name);
            let confidence = match (corroborated, alias_pass) {
                (true, _) => CORROBORATED_CONFIDENCE,
                (false, false) => DIRECT_CONFIDENCE,
                (false, true) => ALIAS_CONFIDENCE,
            };
            let source = if alias_pass {
                ServiceSource::Alias
            } else {
                ServiceSource::Direct
            };
            debug!(
                "Service {} via {} ({:?}, corroborated: {})",
                term.service.name,
                source.as_str(),
                matched,
                corroborated
            );
            return Some(ServiceMatch {
                name: matched.to_string(),
                normalized_name: term.service.name.to_string(),
                confidence,
                source,
                sender_confirmed: corroborated,
                category: Some(term.service.category),
            });
        }
    }

    if let (Some(known), Some(raw)) = (sender_info.known, sender) {
        debug!("Service {} via sender {}", known.name, raw);
        return Some(ServiceMatch {
            name: raw.trim().to_string(),
            normalized_name: known.name.to_string(),
            confidence: SENDER_DOMAIN_CONFIDENCE,
            source: ServiceSource::SenderDomain,
            sender_confirmed: true,
            category: Some(known.category),
        });
    }

    if let Some(found) = capture_phrase_name(text, &sender_info) {
        return Some(found);
    }

    let raw = sender?;
    let cleaned = sender_info.display?;
    debug!("Service {} from sender cleanup of {}", cleaned, raw);
    Some(ServiceMatch {
        name: raw.trim().to_string(),
        normalized_name: cleaned,
        confidence: SENDER_CLEANUP_CONFIDENCE,
        source: ServiceSource::SenderCleanup,
        sender_confirmed: false,
        category: None,
    })
}

/// Longest known name (or alias) appearing as a whole word in the text
fn find_known_term(text: &str, aliases: bool) -> Option<(&str, &'static ServiceTerm)> {
    let lower = text.to_ascii_lowercase();

    SERVICE_TERMS
        .iter()
        .filter(|t| t.is_alias == aliases)
        .find_map(|term| {
            lower
                .match_indices(term.term.as_str())
                .map(|(start, _)| (start, start + term.term.len()))
                .find(|&(start, end)| is_whole_word(text, start, end) && case_ok(text, start, term))
                .map(|(start, end)| (&text[start..end], term))
        })
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
}

/// Common-word terms ("Prime", "Calm") must be capitalized in the text
fn case_ok(text: &str, start: usize, term: &ServiceTerm) -> bool {
    if !COMMON_WORD_TERMS.contains(&term.term.as_str()) {
        return true;
    }
    text[start..].chars().next().is_some_and(|c| c.is_uppercase())
}

fn capture_phrase_name(text: &str, sender: &SenderInfo) -> Option<ServiceMatch> {
    for rule in PHRASE_RULES.iter() {
        for caps in rule.regex.captures_iter(text) {
            let Some(raw) = caps.name("name") else {
                continue;
            };
            let Some(name) = clean_captured_name(raw.as_str()) else {
                continue;
            };

            let corroborated = sender
                .key
                .as_deref()
                .is_some_and(|key| key == compact_key(&name));
            let confidence = if corroborated {
                PATTERN_CORROBORATED_CONFIDENCE
            } else {
                rule.confidence
            };

            debug!(
                "Service {} via phrase {} (corroborated: {})",
                name, rule.name, corroborated
            );
            return Some(ServiceMatch {
                name: raw.as_str().to_string(),
                normalized_name: name,
                confidence,
                source: ServiceSource::Pattern,
                sender_confirmed: corroborated,
                category: None,
            });
        }
    }
    None
}

/// Trim punctuation and generic trailing words; reject sentence-start captures
///
/// The capture stops at the first word ending a sentence or clause, so
/// "Zorbly. Enjoy" yields "Zorbly".
fn clean_captured_name(raw: &str) -> Option<String> {
    let mut words: Vec<&str> = Vec::new();
    for word in raw.split_whitespace() {
        let trimmed = word.trim_end_matches(['.', ',', '\'', '-']);
        if !trimmed.is_empty() {
            words.push(trimmed);
        }
        if word.ends_with(['.', ',']) {
            break;
        }
    }

    let first = words.first()?.to_lowercase();
    if NAME_STOPWORDS.contains(&first.as_str()) {
        return None;
    }

    while words
        .last()
        .is_some_and(|w| GENERIC_TRAILERS.contains(&w.to_lowercase().as_str()))
    {
        words.pop();
    }

    if words.is_empty() {
        return None;
    }
    Some(words.join(" "))
}

/// Lowercase alphanumerics only ("Acme Music" -> "acmemusic")
fn compact_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_sender(raw: &str) -> SenderInfo {
    let raw = raw.trim();
    if raw.is_empty() || is_phone_like(raw) {
        return SenderInfo::default();
    }

    if let Some((local, domain)) = raw.rsplit_once('@') {
        return parse_email_sender(local, domain);
    }
    if raw.contains('.') && !raw.contains(char::is_whitespace) {
        return parse_email_sender("", raw);
    }
    parse_sender_id(raw)
}

fn parse_email_sender(local: &str, domain: &str) -> SenderInfo {
    let domain = domain.trim().trim_end_matches('.').to_lowercase();
    let labels: Vec<&str> = domain.split('.').filter(|l| !l.is_empty()).collect();
    if labels.is_empty() {
        return SenderInfo::default();
    }

    let registrable_idx = registrable_label_index(&labels);
    let registrable = labels[registrable_idx];

    // Registrable label first, then subdomains, then local-part fragments
    let mut candidates: Vec<String> = vec![registrable.to_string()];
    candidates.extend(
        labels[..registrable_idx]
            .iter()
            .filter(|l| !is_noise(l))
            .map(|l| l.to_string()),
    );
    candidates.extend(
        local
            .split(['.', '_', '-', '+'])
            .map(str::to_lowercase)
            .filter(|p| !p.is_empty() && !is_noise(p)),
    );

    let known = candidates
        .iter()
        .find_map(|c| SERVICE_BY_SENDER_KEY.get(c.as_str()).copied());

    let display = (!is_noise(registrable)).then(|| title_case(registrable));

    SenderInfo {
        key: Some(compact_key(registrable)),
        known,
        display,
    }
}

/// Index of the registrable label ("company" in "a.b.company.co.uk")
fn registrable_label_index(labels: &[&str]) -> usize {
    let n = labels.len();
    if n >= 3 {
        let suffix = format!("{}.{}", labels[n - 2], labels[n - 1]);
        if MULTI_LABEL_SUFFIXES.contains(suffix.as_str()) {
            return n - 3;
        }
    }
    n.saturating_sub(2)
}

/// Alphanumeric SMS sender IDs like "VM-NETFLX" or "AD-SPOTFY-S"
fn parse_sender_id(raw: &str) -> SenderInfo {
    let mut parts: Vec<&str> = raw.split(['-', '_', ' ']).filter(|p| !p.is_empty()).collect();

    // Operator/circle prefix ("VM-", "AD-") and trailing category letter ("-S")
    if parts.len() > 1 && parts[0].len() == 2 && parts[0].chars().all(|c| c.is_ascii_alphabetic()) {
        parts.remove(0);
    }
    if parts.len() > 1 && parts.last().is_some_and(|p| p.len() == 1) {
        parts.pop();
    }

    let meaningful: Vec<&str> = parts.into_iter().filter(|p| !is_noise(p)).collect();
    if meaningful.is_empty() {
        return SenderInfo::default();
    }

    let key = compact_key(&meaningful.join(""));
    if key.is_empty() || key.chars().all(|c| c.is_ascii_digit()) {
        return SenderInfo::default();
    }

    let known = SERVICE_BY_SENDER_KEY.get(key.as_str()).copied().or_else(|| {
        SERVICE_BY_SENDER_KEY
            .iter()
            .filter(|(k, _)| k.len() >= MIN_PREFIX_KEY_LEN && key.starts_with(**k))
            .max_by_key(|(k, _)| k.len())
            .map(|(_, s)| *s)
    });

    let display = meaningful
        .iter()
        .map(|p| title_case(p))
        .collect::<Vec<_>>()
        .join(" ");

    SenderInfo {
        key: Some(key),
        known,
        display: Some(display),
    }
}

fn is_phone_like(raw: &str) -> bool {
    raw.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
}

fn is_noise(part: &str) -> bool {
    SENDER_NOISE.contains(&part.to_lowercase().as_str())
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
