#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::util::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 5), "hell…");
}

#[test]
fn test_truncate_zero_max() {
    assert_eq!(truncate("hello", 0), "");
}

#[test]
fn test_truncate_emoji() {
    assert_eq!(truncate("🍔🛍️🚗🎬", 2), "🍔…");
}

#[test]
fn test_truncate_mixed_unicode() {
    assert_eq!(truncate("café résumé", 5), "café…");
}

// ── format_amount ──────────────────────────────────────────

#[test]
fn test_format_amount_basic() {
    assert_eq!(format_amount(dec!(1234.56)), "$1,234.56");
}

#[test]
fn test_format_amount_zero() {
    assert_eq!(format_amount(dec!(0)), "$0.00");
}

#[test]
fn test_format_amount_negative() {
    assert_eq!(format_amount(dec!(-42.50)), "-$42.50");
}

#[test]
fn test_format_amount_millions() {
    assert_eq!(format_amount(dec!(10000000.00)), "$10,000,000.00");
}

#[test]
fn test_format_amount_rounds_half_up() {
    assert_eq!(format_amount(dec!(0.125)), "$0.13");
    assert_eq!(format_amount(dec!(-999.999)), "-$1,000.00");
}

#[test]
fn test_format_signed() {
    assert_eq!(format_signed(dec!(3000)), "+$3,000.00");
    assert_eq!(format_signed(dec!(-45)), "-$45.00");
    assert_eq!(format_signed(dec!(0)), "+$0.00");
}

#[test]
fn test_format_percent() {
    assert_eq!(format_percent(dec!(12.25)), "12.3%");
    assert_eq!(format_percent(dec!(100)), "100.0%");
}

#[test]
fn test_format_date() {
    let date = crate::db::parse_date("2024-03-05").unwrap();
    assert_eq!(format_date(date), "Mar 05, 2024");
}

// ── argument helpers ──────────────────────────────────────────

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_flag_value() {
    let a = args(&["--window", "quarter", "--limit", "5"]);
    assert_eq!(flag_value(&a, "--window"), Some("quarter"));
    assert_eq!(flag_value(&a, "--limit"), Some("5"));
    assert_eq!(flag_value(&a, "--category"), None);
}

#[test]
fn test_flag_without_value() {
    let a = args(&["--window"]);
    assert_eq!(flag_value(&a, "--window"), None);
}

#[test]
fn test_positional_skips_flags_and_values() {
    let a = args(&["-12.50", "Lunch", "--category", "food", "with", "team"]);
    assert_eq!(positional(&a), vec!["-12.50", "Lunch", "with", "team"]);
}

#[test]
fn test_switches_take_no_value() {
    let a = args(&["--desc", "Rent", "--sort", "amount", "--asc"]);
    assert!(has_flag(&a, "--desc"));
    assert!(has_flag(&a, "--asc"));
    assert!(!has_flag(&a, "--limit"));
    assert_eq!(positional(&a), vec!["Rent"]);
}
