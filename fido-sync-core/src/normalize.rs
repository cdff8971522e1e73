//! Normalization helpers shared by producers and the store adapter.
//!
//! These turn source-specific values (unix birth timestamps, raw weights,
//! multi-line bios, JSON scalars) into the plain strings a [`DogRecord`] holds.
//!
//! [`DogRecord`]: crate::record::DogRecord

use chrono::{DateTime, Datelike, Months, NaiveDate};
use serde_json::Value;

/// Token joining paragraphs of multi-line text stored in a single cell.
pub const PARAGRAPH_SEPARATOR: &str = "$$";

/// Remove control and other non-printable characters, keeping line breaks, then trim.
pub fn clean_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c == '\n' || !(c.is_control() || is_invisible(*c)))
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}'
    )
}

/// Join the lines of `text` with `separator`, dropping carriage returns.
pub fn flatten_paragraphs(text: &str, separator: &str) -> String {
    text.replace('\r', "").split('\n').collect::<Vec<_>>().join(separator)
}

/// Size bucket for a weight in pounds. Empty for missing or unparsable input.
pub fn size_from_weight(pounds: &str) -> String {
    let weight: f64 = match pounds.trim().parse() {
        Ok(w) => w,
        Err(_) => return String::new(),
    };
    let bucket = if weight < 25.0 {
        "Small (0-24)"
    } else if weight < 60.0 {
        "Medium (25-59)"
    } else if weight < 100.0 {
        "Large (60-99)"
    } else {
        "X-Large 99+"
    };
    bucket.to_string()
}

/// Calendar age between `birth` and `today` as `"{years}Y/{months}M/{days}D"`.
///
/// Returns an empty string when `birth` lies after `today`.
pub fn age_from_birth(birth: NaiveDate, today: NaiveDate) -> String {
    if birth > today {
        return String::new();
    }
    let mut months =
        (today.year() - birth.year()) * 12 + today.month() as i32 - birth.month() as i32;
    let mut anchor = add_months(birth, months);
    while months > 0 && anchor.map_or(true, |a| a > today) {
        months -= 1;
        anchor = add_months(birth, months);
    }
    let days = anchor.map_or(0, |a| (today - a).num_days());
    format!("{}Y/{}M/{}D", months / 12, months % 12, days)
}

fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(u32::try_from(months).ok()?))
}

/// Age string for a unix birth timestamp. Zero or out-of-range timestamps mean "unknown".
pub fn age_from_unix(timestamp: i64, today: NaiveDate) -> String {
    if timestamp <= 0 {
        return String::new();
    }
    match DateTime::from_timestamp(timestamp, 0) {
        Some(born) => age_from_birth(born.date_naive(), today),
        None => String::new(),
    }
}

/// Display string of a JSON scalar. Integral floats drop the trailing `.0`; null is empty.
pub fn json_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
