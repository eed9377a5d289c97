//! Time-range label normalization
//!
//! The dashboard shows human labels; the API expects compact tokens.

/// Map a UI label to its API token. Tokens and unknown values pass through.
pub fn normalize(label: &str) -> &str {
    match label.trim() {
        "Last hour" | "Last 1 hour" => "1h",
        "Last 24 hours" => "24h",
        "Last 7 days" => "7d",
        "Last 30 days" => "30d",
        "Last 90 days" => "90d",
        "Custom range" => "custom",
        other => other,
    }
}

/// Labels offered by the time-range picker, in display order
pub const LABELS: [&str; 5] = [
    "Last hour",
    "Last 24 hours",
    "Last 7 days",
    "Last 30 days",
    "Last 90 days",
];
