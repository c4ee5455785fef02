//! Text formatting for dashboard values. Dates are rendered in UTC.

use chrono::{DateTime, Utc};

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `0x1234...abcd`; empty addresses render as a zero placeholder.
pub fn truncate_address(address: &str) -> String {
    if address.is_empty() {
        return "0x00...0000".to_string();
    }
    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(4).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{head}...{tail}")
}

/// Two decimals with thousands separators, e.g. `1,234.50`.
pub fn format_number(num: f64) -> String {
    if num.is_nan() {
        return "NaN".to_string();
    }
    if num.is_infinite() {
        return if num < 0.0 { "-∞" } else { "∞" }.to_string();
    }

    let fixed = format!("{:.2}", num.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if num < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}

/// `May 29, 2024`, or `May 29, 2024 at 4:40 PM` with `display_time`.
pub fn format_date(date: DateTime<Utc>, display_time: bool) -> String {
    if display_time {
        date.format("%B %-d, %Y at %-I:%M %p").to_string()
    } else {
        date.format("%B %-d, %Y").to_string()
    }
}

/// Auction start/end time from a unix timestamp, e.g. `May 29, 4:40:00 PM`.
pub fn format_auction_date(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|date| date.format("%b %-d, %-I:%M:%S %p").to_string())
}
