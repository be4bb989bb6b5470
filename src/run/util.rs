use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::analytics::fixed;

/// Format a decimal amount with thousand separators and 2 decimal places.
/// e.g. `1234567.89` → `"$1,234,567.89"`
pub(crate) fn format_amount(val: Decimal) -> String {
    let formatted = fixed(val.abs(), 2);
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if val < Decimal::ZERO {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Like [`format_amount`] but always signed: `+$5.00` / `-$5.00`.
pub(crate) fn format_signed(val: Decimal) -> String {
    if val < Decimal::ZERO {
        format_amount(val)
    } else {
        format!("+{}", format_amount(val))
    }
}

/// Percentage with one decimal, e.g. `12.5%`.
pub(crate) fn format_percent(val: Decimal) -> String {
    format!("{}%", fixed(val, 1))
}

/// e.g. `Mar 05, 2024`
pub(crate) fn format_date(date: NaiveDateTime) -> String {
    date.format("%b %d, %Y").to_string()
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// The result is guaranteed to be at most `max` characters (counting "…" as one).
/// Safe for multi-byte UTF-8 characters.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// Value following `flag`, e.g. `--window quarter`.
pub(crate) fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Flags that take no value.
const SWITCHES: [&str; 2] = ["--asc", "--desc"];

pub(crate) fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Arguments that are neither `--flags` nor the value following one.
pub(crate) fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if SWITCHES.contains(&arg.as_str()) {
            continue;
        }
        if arg.starts_with("--") {
            iter.next();
        } else {
            out.push(arg.as_str());
        }
    }
    out
}
