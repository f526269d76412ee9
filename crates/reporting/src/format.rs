//! Display formatting shared by every dashboard surface that shows a
//! magnitude, a rate, or a month.

use chrono::{DateTime, Datelike, NaiveDate};

/// Placeholder rendered for any missing or malformed value.
pub const NO_DATA: &str = "No data";

/// Abbreviate a magnitude: `2.3M`, `1.5K`, or the plain number below 1,000.
///
/// Non-finite and negative inputs render as [`NO_DATA`].
pub fn format_magnitude(value: f64) -> String {
    if !value.is_finite() || value < 0.0 {
        return NO_DATA.to_string();
    }
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{value}")
    }
}

/// [`format_magnitude`] for a count that may be missing.
pub fn format_count(value: Option<u64>) -> String {
    match value {
        Some(v) => format_magnitude(v as f64),
        None => NO_DATA.to_string(),
    }
}

/// Percentage with one decimal, e.g. `3.0%`.
pub fn format_rate(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.1}%"),
        _ => NO_DATA.to_string(),
    }
}

/// Parse a stored month value to the first day of that month.
///
/// Accepts `2024-03`, `2024/03`, `2024-03-15`, RFC 3339 timestamps, and
/// month names (`March 2024`, `Mar 2024`).
pub fn parse_month(month: &str) -> Option<NaiveDate> {
    let month = month.trim();
    if month.is_empty() {
        return None;
    }

    let date = NaiveDate::parse_from_str(month, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(month)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").ok())
        .or_else(|| NaiveDate::parse_from_str(&format!("{month}/01"), "%Y/%m/%d").ok())
        .or_else(|| NaiveDate::parse_from_str(&format!("01 {month}"), "%d %B %Y").ok())?;

    date.with_day0(0)
}

/// Axis label for a month, e.g. `Mar 2024`. Unparseable values are shown as stored.
pub fn format_month(month: &str) -> String {
    match parse_month(month) {
        Some(date) => date.format("%b %Y").to_string(),
        None => month.to_string(),
    }
}
