#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn date(s: &str) -> NaiveDateTime {
    parse_date(s).unwrap()
}

fn make_txn(id: &str, description: &str, amount: Decimal, day: &str, category: Option<&str>) -> Transaction {
    Transaction {
        id: id.into(),
        description: description.into(),
        amount,
        date: date(day),
        category: category.map(str::to_string),
        notes: String::new(),
    }
}

fn setup_test_data(db: &Database) {
    let txns = vec![
        make_txn("t1", "Starbucks Coffee", dec!(-5.25), "2024-01-10", Some("food")),
        make_txn("t2", "Amazon Purchase", dec!(-42.99), "2024-01-15", Some("shopping")),
        make_txn("t3", "Salary Deposit", dec!(3000.00), "2024-01-20", Some("income")),
        make_txn("t4", "Electric Bill", dec!(-120.00), "2024-02-01", None),
    ];
    for txn in &txns {
        db.insert_transaction(txn).unwrap();
    }
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_fresh_database_is_empty() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.get_transaction_count().unwrap(), 0);
    assert!(db.get_transactions().unwrap().is_empty());
    assert!(db.get_budgets().unwrap().is_empty());
}

#[test]
fn test_reopen_file_database_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fintrack.db");
    {
        let db = Database::open(&path).unwrap();
        setup_test_data(&db);
    }
    // Second open runs the migration check against an existing schema
    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_transaction_count().unwrap(), 4);
}

// ── Transaction CRUD ──────────────────────────────────────────

#[test]
fn test_insert_and_get() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let fetched = db.get_transaction("t2").unwrap().unwrap();
    assert_eq!(fetched.description, "Amazon Purchase");
    assert_eq!(fetched.amount, dec!(-42.99));
    assert_eq!(fetched.date, date("2024-01-15"));
    assert_eq!(fetched.category.as_deref(), Some("shopping"));
}

#[test]
fn test_get_missing_is_none() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_transaction("nope").unwrap().is_none());
}

#[test]
fn test_transactions_in_insertion_order() {
    let db = Database::open_in_memory().unwrap();
    db.insert_transaction(&make_txn("b", "Later", dec!(-1), "2024-05-01", None))
        .unwrap();
    db.insert_transaction(&make_txn("a", "Earlier", dec!(-1), "2024-01-01", None))
        .unwrap();
    let ids: Vec<String> = db
        .get_transactions()
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[test]
fn test_missing_category_roundtrips_as_none() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);
    let bill = db.get_transaction("t4").unwrap().unwrap();
    assert!(bill.category.is_none());
    assert_eq!(bill.category(), Category::Other);
}

#[test]
fn test_time_of_day_preserved() {
    let db = Database::open_in_memory().unwrap();
    let mut txn = make_txn("t", "Lunch", dec!(-12), "2024-03-01", Some("food"));
    txn.date = date("2024-03-01T13:45:10");
    txn.notes = "with team".into();
    db.insert_transaction(&txn).unwrap();
    assert_eq!(db.get_transaction("t").unwrap().unwrap(), txn);
}

#[test]
fn test_duplicate_id_rejected() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);
    let dup = make_txn("t1", "Again", dec!(-1), "2024-01-01", None);
    assert!(db.insert_transaction(&dup).is_err());
    assert_eq!(db.get_transaction_count().unwrap(), 4);
}

#[test]
fn test_blank_description_rejected() {
    let db = Database::open_in_memory().unwrap();
    let txn = make_txn("t", "  ", dec!(-1), "2024-01-01", None);
    assert!(db.insert_transaction(&txn).is_err());
}

#[test]
fn test_update_replaces_whole_record() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let replacement = make_txn("t1", "Tea", dec!(-3.50), "2024-01-11", None);
    assert!(db.update_transaction(&replacement).unwrap());

    let fetched = db.get_transaction("t1").unwrap().unwrap();
    assert_eq!(fetched, replacement);
    // Position in insertion order is unchanged
    assert_eq!(db.get_transactions().unwrap()[0].id, "t1");
}

#[test]
fn test_update_missing_returns_false() {
    let db = Database::open_in_memory().unwrap();
    let txn = make_txn("ghost", "Nothing", dec!(-1), "2024-01-01", None);
    assert!(!db.update_transaction(&txn).unwrap());
    assert_eq!(db.get_transaction_count().unwrap(), 0);
}

#[test]
fn test_delete() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);
    assert!(db.delete_transaction("t3").unwrap());
    assert!(!db.delete_transaction("t3").unwrap());
    assert_eq!(db.get_transaction_count().unwrap(), 3);
}

#[test]
fn test_batch_insert_skips_existing_ids() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&db);
    let batch = vec![
        make_txn("t1", "Dup", dec!(-1), "2024-01-01", None),
        make_txn("t9", "New", dec!(-2), "2024-01-02", None),
        make_txn("t9", "Dup in batch", dec!(-3), "2024-01-03", None),
    ];
    assert_eq!(db.insert_transactions_batch(&batch).unwrap(), 1);
    assert_eq!(db.get_transaction_count().unwrap(), 5);
    assert_eq!(db.get_transaction("t9").unwrap().unwrap().description, "New");
}

#[test]
fn test_batch_insert_is_atomic_on_invalid_record() {
    let mut db = Database::open_in_memory().unwrap();
    let batch = vec![
        make_txn("ok", "Fine", dec!(-1), "2024-01-01", None),
        make_txn("bad", "", dec!(-1), "2024-01-01", None),
    ];
    assert!(db.insert_transactions_batch(&batch).is_err());
    assert_eq!(db.get_transaction_count().unwrap(), 0);
}

// ── Budgets ───────────────────────────────────────────────────

#[test]
fn test_budgets_roundtrip() {
    let mut db = Database::open_in_memory().unwrap();
    let mut budgets = Budgets::new();
    budgets.set(Category::Food, dec!(400)).unwrap();
    budgets.set(Category::Other, dec!(75.50)).unwrap();
    db.save_budgets(&budgets).unwrap();

    let loaded = db.get_budgets().unwrap();
    assert_eq!(loaded, budgets);
    assert_eq!(loaded.limit_for(Category::Shopping), Decimal::ZERO);
}

#[test]
fn test_save_budgets_replaces_previous() {
    let mut db = Database::open_in_memory().unwrap();
    let mut first = Budgets::new();
    first.set(Category::Food, dec!(400)).unwrap();
    db.save_budgets(&first).unwrap();

    let mut second = Budgets::new();
    second.set(Category::Housing, dec!(1500)).unwrap();
    db.save_budgets(&second).unwrap();

    let loaded = db.get_budgets().unwrap();
    assert_eq!(loaded.limit_for(Category::Food), Decimal::ZERO);
    assert_eq!(loaded.limit_for(Category::Housing), dec!(1500));
}

#[test]
fn test_unknown_budget_rows_are_skipped() {
    let db = Database::open_in_memory().unwrap();
    db.conn
        .execute(
            "INSERT INTO budgets (category, limit_amount) VALUES ('pets', '30'), ('food', '10')",
            [],
        )
        .unwrap();
    let loaded = db.get_budgets().unwrap();
    assert_eq!(loaded.iter().count(), 1);
    assert_eq!(loaded.limit_for(Category::Food), dec!(10));
}

// ── Dates ─────────────────────────────────────────────────────

#[test]
fn test_parse_date_formats() {
    assert_eq!(
        parse_date("2024-01-15").unwrap().to_string(),
        "2024-01-15 00:00:00"
    );
    assert_eq!(
        parse_date("2024-01-15T08:30:00").unwrap().to_string(),
        "2024-01-15 08:30:00"
    );
    assert_eq!(
        parse_date("2024-01-15 08:30:00").unwrap().to_string(),
        "2024-01-15 08:30:00"
    );
    assert!(parse_date("01/15/2024").is_none());
    assert!(parse_date("").is_none());
}
