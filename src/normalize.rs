//! Conversion of messy spreadsheet cells into canonical values.
//!
//! Every function here is total: a corrupt cell degrades to zero (numbers)
//! or an empty string (text) so the rest of a row still renders.

use chrono::DateTime;
use serde_json::Value;

const BLANK_TOKENS: [&str; 3] = ["", "none", "n/a"];

/// Parses a raw cell into a non-negative, finite number.
///
/// Accepts JSON numbers directly and strings such as `"1,234"`, `"2.5K"`
/// or `"1.1M"`. Anything else (null, blanks, `"N/A"`, garbage, negatives,
/// NaN or infinities) yields `0.0`.
pub fn normalize(raw: &Value) -> f64 {
    match raw {
        Value::Number(number) => canonical(number.as_f64().unwrap_or(0.0)),
        Value::String(text) => normalize_str(text),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    }
}

pub fn normalize_opt(raw: Option<&Value>) -> f64 {
    raw.map(normalize).unwrap_or(0.0)
}

pub fn normalize_str(raw: &str) -> f64 {
    if is_blank(raw) {
        return 0.0;
    }

    let cleaned = raw.replace(',', "").trim().to_uppercase();
    let (digits, multiplier) = if let Some(prefix) = cleaned.strip_suffix('K') {
        (prefix, 1_000.0)
    } else if let Some(prefix) = cleaned.strip_suffix('M') {
        (prefix, 1_000_000.0)
    } else {
        (cleaned.as_str(), 1.0)
    };

    match digits.trim().parse::<f64>() {
        Ok(value) => canonical(value * multiplier),
        Err(_) => 0.0,
    }
}

/// True when a cell carries no usable content (`None`, `""`, `"n/a"`...).
pub fn is_blank(raw: &str) -> bool {
    let lowered = raw.trim().to_lowercase();
    BLANK_TOKENS.contains(&lowered.as_str())
}

/// True when the cell holds something other than a blank token.
pub fn is_present(raw: Option<&Value>) -> bool {
    match raw {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !is_blank(text),
        Some(_) => true,
    }
}

/// Display text for a cell; blanks become an empty string.
pub fn clean_text(raw: Option<&Value>) -> String {
    match raw {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => {
            if is_blank(text) {
                String::new()
            } else {
                text.trim().to_string()
            }
        }
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(other) => other.to_string(),
    }
}

pub fn clean_text_opt(raw: Option<&Value>) -> Option<String> {
    let text = clean_text(raw);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Formats a latest-post date for display.
///
/// ISO timestamps render as `07 Jul 2024`; other strings of ten or more
/// characters are cut to their first ten; short strings pass through.
pub fn format_post_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("n/a") {
        return String::new();
    }

    if trimmed.contains('T') {
        if let Some(formatted) = format_iso_timestamp(trimmed) {
            return formatted;
        }
        return trimmed.to_string();
    }

    match trimmed.char_indices().nth(10) {
        Some((idx, _)) => trimmed[..idx].to_string(),
        None => trimmed.to_string(),
    }
}

fn format_iso_timestamp(raw: &str) -> Option<String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.format("%d %b %Y").to_string());
    }
    let without_zone = raw.trim_end_matches('Z');
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(without_zone, fmt).ok())
        .map(|parsed| parsed.format("%d %b %Y").to_string())
}

/// Cuts a caption to `limit` characters, appending an ellipsis when cut.
pub fn truncate_caption(caption: &str, limit: usize) -> String {
    match caption.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}…", &caption[..idx]),
        None => caption.to_string(),
    }
}

fn canonical(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
