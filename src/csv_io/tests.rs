#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;
use std::io::Write;

use super::*;

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

#[test]
fn test_export_then_import() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let mut coffee = Transaction::new(
        "Coffee, large".into(),
        dec!(-4.50),
        parse_date("2024-02-03T08:15:00").unwrap(),
        Some("food".into()),
    );
    coffee.notes = "said \"thanks\"".into();
    let pay = Transaction::new(
        "Paycheck".into(),
        dec!(2500),
        parse_date("2024-02-01").unwrap(),
        None,
    );
    let txns = vec![coffee, pay];

    assert_eq!(export(&path, &txns).unwrap(), 2);
    let back = import(&path).unwrap();
    assert_eq!(back, txns);
}

#[test]
fn test_export_writes_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    assert_eq!(export(&path, &[]).unwrap(), 0);
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.trim(), "id,date,description,amount,category,notes");
}

#[test]
fn test_import_generates_missing_ids() {
    let f = write_csv(
        "date,description,amount,category\n\
         2024-03-01,Groceries,-54.20,food\n\
         2024-03-02,Refund,12.00,\n",
    );
    let txns = import(f.path()).unwrap();
    assert_eq!(txns.len(), 2);
    assert!(!txns[0].id.is_empty());
    assert_ne!(txns[0].id, txns[1].id);
    assert_eq!(txns[0].category.as_deref(), Some("food"));
    assert!(txns[1].category.is_none());
    assert!(txns[1].notes.is_empty());
}

#[test]
fn test_import_header_is_case_insensitive() {
    let f = write_csv("Date,Description,Amount\n2024-03-01,Rent,\"-1,200.00\"\n");
    let txns = import(f.path()).unwrap();
    assert_eq!(txns[0].amount, dec!(-1200.00));
}

#[test]
fn test_import_missing_column() {
    let f = write_csv("date,amount\n2024-03-01,-5\n");
    let err = import(f.path()).unwrap_err();
    assert!(err.to_string().contains("description"));
}

#[test]
fn test_import_bad_date_reports_line() {
    let f = write_csv("date,description,amount\n2024-03-01,Ok,-1\nyesterday,Bad,-2\n");
    let err = import(f.path()).unwrap_err();
    assert!(err.to_string().contains("Line 3"));
}

#[test]
fn test_import_bad_amount() {
    let f = write_csv("date,description,amount\n2024-03-01,Oops,abc\n");
    assert!(import(f.path()).is_err());
}

#[test]
fn test_import_blank_description_rejected() {
    let f = write_csv("date,description,amount\n2024-03-01,,-1\n");
    assert!(import(f.path()).is_err());
}

#[test]
fn test_parse_amount_variants() {
    assert_eq!(parse_amount("42.10").unwrap(), dec!(42.10));
    assert_eq!(parse_amount("-$5.00").unwrap(), dec!(-5.00));
    assert_eq!(parse_amount(" $1,234.56 ").unwrap(), dec!(1234.56));
    assert!(parse_amount("").is_err());
    assert!(parse_amount("ten").is_err());
}
