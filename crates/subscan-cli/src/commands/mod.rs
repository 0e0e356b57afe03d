//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (load_extractor, parse_reference_date)
//! - `extract` - Single-message extraction
//! - `scan` - SMS export batch scan
//! - `config` - Effective configuration display

pub mod config;
pub mod core;
pub mod extract;
pub mod scan;

// Re-export command functions for main.rs
pub use config::*;
pub use self::core::*;
pub use extract::*;
pub use scan::*;

use subscan_core::ConfidenceLevel;

/// Truncate a string to at most `max` characters, with an ellipsis if cut
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Confidence as a whole percentage ("92%")
pub fn percent(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}

pub fn level_icon(level: ConfidenceLevel) -> &'static str {
    match level {
        ConfidenceLevel::High => "✅",
        ConfidenceLevel::Medium => "⚠️ ",
        ConfidenceLevel::Low => "❌",
    }
}
