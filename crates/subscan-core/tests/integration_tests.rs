//! Integration tests for subscan-core
//!
//! These tests exercise the full text → extraction → scoring flow and the
//! CSV → batch scan workflow through the public API.

use chrono::NaiveDate;
use subscan_core::{
    extract::{
        amount::extract_amount, billing::extract_billing_cycle, date::extract_date,
        service::extract_service_name,
    },
    extract_subscription_data, parse_config, parse_messages_csv, scan_messages, BillingCycle,
    ConfidenceLevel, SubscriptionExtractor,
};

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =============================================================================
// Amount Extraction
// =============================================================================

#[test]
fn test_amount_symbols() {
    let m = extract_amount("Your payment of $9.99 was processed").unwrap();
    assert_eq!(m.value, 9.99);
    assert_eq!(m.currency, "USD");

    let m = extract_amount("Charge of £7.99 to your account").unwrap();
    assert_eq!(m.value, 7.99);
    assert_eq!(m.currency, "GBP");
}

#[test]
fn test_amount_codes_and_names() {
    let m = extract_amount("Renewal: 15.99 EUR").unwrap();
    assert_eq!((m.value, m.currency.as_str()), (15.99, "EUR"));

    let m = extract_amount("Charged INR 499 for your plan").unwrap();
    assert_eq!((m.value, m.currency.as_str()), (499.0, "INR"));

    let m = extract_amount("You paid 12 dollars").unwrap();
    assert_eq!((m.value, m.currency.as_str()), (12.0, "USD"));

    for m in [
        extract_amount("Renewal: 15.99 EUR").unwrap(),
        extract_amount("You paid 12 dollars").unwrap(),
        extract_amount("Charge of £7.99").unwrap(),
    ] {
        assert!(m.confidence >= 0.8);
    }
}

#[test]
fn test_amount_european_grouping() {
    let m = extract_amount("Subscription fee of 1.299,00 EUR").unwrap();
    assert_eq!(m.value, 1299.0);
    assert_eq!(m.currency, "EUR");

    let m = extract_amount("Abo verlängert: 9,99 €").unwrap();
    assert_eq!(m.value, 9.99);
    assert_eq!(m.currency, "EUR");
}

#[test]
fn test_amount_confidence_monotonic() {
    let labeled = extract_amount("Price: $9.99").unwrap();
    let bare = extract_amount("Your subscription costs 9.99").unwrap();
    assert!(labeled.confidence >= bare.confidence);
    assert!(bare.confidence < 0.8);
}

// =============================================================================
// Service Resolution
// =============================================================================

#[test]
fn test_service_aliases() {
    let m = extract_service_name("Your Prime subscription was renewed", None).unwrap();
    assert_eq!(m.normalized_name, "Amazon Prime");

    let m = extract_service_name("Payment to Disney Plus processed", None).unwrap();
    assert_eq!(m.normalized_name, "Disney+");
}

#[test]
fn test_service_confidence_ranking() {
    let direct = extract_service_name("Netflix renewed", None).unwrap();
    let sender = extract_service_name("Payment processed", Some("billing@netflix.com")).unwrap();
    let pattern = extract_service_name("Welcome to Zorbly Pro", None).unwrap();
    let cleanup = extract_service_name("Payment processed", Some("billing@zorbly.io")).unwrap();

    assert!(direct.confidence > sender.confidence);
    assert!(sender.confidence > pattern.confidence);
    assert!(pattern.confidence > cleanup.confidence);
}

#[test]
fn test_sender_corroboration() {
    let text = "Your subscription payment of $9.99 was processed";

    let matching = extract_subscription_data(text, Some("billing@netflix.com"), reference());
    let other = extract_subscription_data(text, Some("billing@example.com"), reference());

    assert_eq!(matching.service.as_ref().unwrap().normalized_name, "Netflix");
    assert!(matching.service.as_ref().unwrap().sender_confirmed);
    assert!(matching.overall_confidence > other.overall_confidence);
}

#[test]
fn test_sender_corroboration_on_text_match() {
    let text = "Your Hulu payment of $7.99 was processed";
    let confirmed = extract_subscription_data(text, Some("no-reply@hulu.com"), reference());
    let unconfirmed = extract_subscription_data(text, Some("alerts@mybank.com"), reference());

    let service = confirmed.service.as_ref().unwrap();
    assert!(service.sender_confirmed);
    assert!(service.confidence > unconfirmed.service.as_ref().unwrap().confidence);
}

#[test]
fn test_sender_confirmation_raises_overall_when_text_names_service() {
    let text = "Your Hulu payment of $7.99 was processed";
    let confirmed = extract_subscription_data(text, Some("no-reply@hulu.com"), reference());
    let other = extract_subscription_data(text, Some("alerts@mybank.com"), reference());
    let none = extract_subscription_data(text, None, reference());

    assert!(confirmed.overall_confidence < 1.0);
    assert!(confirmed.overall_confidence > other.overall_confidence);
    assert!(confirmed.overall_confidence > none.overall_confidence);

    let text = "Your Netflix subscription payment of $9.99 was processed";
    let confirmed = extract_subscription_data(text, Some("billing@netflix.com"), reference());
    let other = extract_subscription_data(text, Some("billing@example.com"), reference());
    let none = extract_subscription_data(text, None, reference());

    assert_eq!(confirmed.service.as_ref().unwrap().normalized_name, "Netflix");
    assert!(confirmed.overall_confidence > other.overall_confidence);
    assert!(confirmed.overall_confidence > none.overall_confidence);
}

// =============================================================================
// Billing Cycle
// =============================================================================

#[test]
fn test_billing_custom_interval() {
    let m = extract_billing_cycle("$19.99 every 2 months").unwrap();
    assert_eq!(m.cycle, BillingCycle::Custom);
    assert_eq!(m.interval_count, Some(2));

    let m = extract_billing_cycle("every 3 months").unwrap();
    assert_eq!(m.cycle, BillingCycle::Quarterly);
    assert_eq!(m.interval_count, None);
}

#[test]
fn test_billing_cycle_serializes_lowercase() {
    let m = extract_billing_cycle("$19.99 every 2 months").unwrap();
    let json = serde_json::to_value(&m).unwrap();
    assert_eq!(json["cycle"], "custom");
    assert_eq!(json["interval_count"], 2);
}

// =============================================================================
// Dates
// =============================================================================

#[test]
fn test_relative_dates_deterministic() {
    let m = extract_date("ends in 7 days", reference()).unwrap();
    assert_eq!(m.date, ymd(2023, 5, 8));
    assert!(m.is_relative);

    let m = extract_date("renews next month", reference()).unwrap();
    assert_eq!(m.month0(), 5);
    assert_eq!(m.date, ymd(2023, 6, 1));
}

#[test]
fn test_contextual_date_preferred() {
    let text = "Order 2023-04-02 confirmed. Your membership ends on 06/30/2023";
    let m = extract_date(text, reference()).unwrap();
    assert_eq!(m.date, ymd(2023, 6, 30));
}

// =============================================================================
// Aggregation
// =============================================================================

#[test]
fn test_end_to_end() {
    let result = extract_subscription_data(
        "Your Netflix monthly subscription payment of $9.99 was processed on 05/15/2023",
        None,
        reference(),
    );

    assert_eq!(result.service.as_ref().unwrap().normalized_name, "Netflix");
    let amount = result.amount.as_ref().unwrap();
    assert_eq!(amount.value, 9.99);
    assert_eq!(amount.currency, "USD");
    assert_eq!(result.billing_cycle.as_ref().unwrap().cycle, BillingCycle::Monthly);
    assert_eq!(result.date.as_ref().unwrap().date, ymd(2023, 5, 15));
    assert!(result.overall_confidence >= 0.8);
    assert_eq!(result.level(), ConfidenceLevel::High);
}

#[test]
fn test_sparse_input() {
    let result = extract_subscription_data("Your payment was processed", None, reference());
    assert!(result.amount.is_none());
    assert!(result.billing_cycle.is_none());
    assert!(result.date.is_none());
    assert!(result.overall_confidence < 0.6);
    assert_eq!(result.level(), ConfidenceLevel::Low);
}

#[test]
fn test_idempotent() {
    let text = "Your Spotify Premium plan of €10.99 renews in 2 weeks";
    let first = extract_subscription_data(text, Some("AD-SPOTIFY"), reference());
    let second = extract_subscription_data(text, Some("AD-SPOTIFY"), reference());
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_confidence_always_in_range() {
    let texts = [
        "",
        "hello",
        "Netflix Netflix Netflix $9.99 monthly renews tomorrow",
        "Welcome to Zorbly",
        "1.299,00 EUR every 14 months, renews 2023-12-01",
    ];
    for text in texts {
        for sender in [None, Some("billing@netflix.com"), Some("+1 555 0100")] {
            let result = extract_subscription_data(text, sender, reference());
            assert!((0.0..=1.0).contains(&result.overall_confidence), "{}", text);
        }
    }
}

#[test]
fn test_scoring_config_changes_result() {
    let text = "Your Netflix payment of $9.99 was processed";
    let default = SubscriptionExtractor::new().extract(text, None, reference());

    let config = parse_config("[scoring]\ncritical_boost = 0.0\n").unwrap();
    let unboosted = SubscriptionExtractor::with_config(config).extract(text, None, reference());

    assert!(default.overall_confidence > unboosted.overall_confidence);
}

// =============================================================================
// Batch Scan Workflow
// =============================================================================

fn sms_export() -> &'static str {
    r#"address,body,date
billing@netflix.com,Your Netflix monthly subscription payment of $15.49 was processed,2023-04-15
billing@netflix.com,Your Netflix monthly subscription payment of $15.49 was processed,2023-04-15
AD-SPOTIFY,"Your Spotify Premium payment of $10.99 was charged, renews in 30 days",2023-04-20
+15551234567,Dinner at 7?,2023-04-21
VM-BANKSB,Your payment was processed,2023-04-22
no-reply@hulu.com,Your Hulu subscription renewed. Price: $7.99/mo,2023-04-25"#
}

#[test]
fn test_full_scan_workflow() {
    let messages = parse_messages_csv(sms_export().as_bytes()).expect("Failed to parse CSV");
    assert_eq!(messages.len(), 6);

    let report = scan_messages(&SubscriptionExtractor::new(), &messages, reference(), 0.6);

    assert_eq!(report.total, 6);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.filtered, 1);
    assert_eq!(report.detections.len(), 3);

    let names: Vec<_> = report
        .detections
        .iter()
        .filter_map(|d| d.draft.as_ref().and_then(|draft| draft.name.clone()))
        .collect();
    assert!(names.contains(&"Netflix".to_string()));
    assert!(names.contains(&"Spotify".to_string()));
    assert!(names.contains(&"Hulu".to_string()));

    // Sorted most confident first
    for pair in report.detections.windows(2) {
        assert!(pair[0].extraction.overall_confidence >= pair[1].extraction.overall_confidence);
    }

    // Relative date counted from the message's own received date
    let spotify = report
        .detections
        .iter()
        .find(|d| d.address.as_deref() == Some("AD-SPOTIFY"))
        .unwrap();
    assert_eq!(spotify.extraction.date.as_ref().unwrap().date, ymd(2023, 5, 20));
}
