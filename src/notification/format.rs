//! Display formatting helpers shared by both controllers.

use chrono::{DateTime, Local};

/// Formats whole seconds as `MM:SS`. Minutes keep growing past 99.
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Formats a fractional second offset as `MM:SS`, flooring first.
pub fn format_offset(seconds: f64) -> String {
    format_time(seconds.max(0.0).floor() as u64)
}

/// Renders an epoch timestamp (seconds) as a local wall-clock time.
pub fn format_timestamp(timestamp: f64) -> String {
    let millis = (timestamp * 1000.0).round() as i64;
    match DateTime::from_timestamp_millis(millis) {
        Some(utc) => utc.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => String::from("--:--:--"),
    }
}

/// Human readable file size in base-1024 units with at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return String::from("0 Bytes");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{:.2}", value);
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", rendered, UNITS[unit])
}

/// Groups digits by thousands, `1234567` -> `1,234,567`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Rounds a `[0, 1]` confidence to an integer percentage.
pub fn confidence_percent(confidence: f64) -> u32 {
    (confidence * 100.0).round().max(0.0) as u32
}
