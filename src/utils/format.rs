use chrono::{DateTime, Utc};
use serde::{self, Deserialize};

const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serialize Option<String> as empty string when None
pub fn serialize_option_string<S>(option: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match option {
        Some(value) => serializer.serialize_str(value),
        None => serializer.serialize_str(""),
    }
}

/// Deserialize empty string as None
pub fn deserialize_option_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() { Ok(None) } else { Ok(Some(s)) }
}

pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(FORMAT).to_string()
}

/// Group the integer part with commas, e.g. `1234567.891` with 2 decimals -> `1,234,567.89`
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rendered.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && rendered.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Signed percentage with two decimals, e.g. `+1.23%` or `-0.40%`
pub fn format_signed_percent(pct: f64) -> String {
    let sign = if pct >= 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, pct)
}

/// Compact money for large figures: billions, millions, otherwise grouped dollars
pub fn format_large_money(value: Option<f64>) -> String {
    let Some(num) = value else {
        return "N/A".to_string();
    };

    if num.abs() >= 1e9 {
        format!("${:.2} B", num / 1e9)
    } else if num.abs() >= 1e6 {
        format!("${:.2} M", num / 1e6)
    } else if num.fract() == 0.0 {
        format!("${}", format_thousands(num, 0))
    } else {
        format!("${}", format_thousands(num, 2))
    }
}
