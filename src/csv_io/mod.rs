//! CSV exchange for the transaction store.
//!
//! Columns: `id,date,description,amount,category,notes`.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::db::{parse_date, DATE_FORMAT};
use crate::models::Transaction;

const HEADER: [&str; 6] = ["id", "date", "description", "amount", "category", "notes"];

/// Write `transactions` to `path`, returning the row count.
pub(crate) fn export(path: &Path, transactions: &[Transaction]) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    wtr.write_record(HEADER)?;
    for txn in transactions {
        let date = txn.date.format(DATE_FORMAT).to_string();
        let amount = txn.amount.to_string();
        wtr.write_record([
            txn.id.as_str(),
            date.as_str(),
            txn.description.as_str(),
            amount.as_str(),
            txn.category.as_deref().unwrap_or(""),
            txn.notes.as_str(),
        ])?;
    }
    wtr.flush()?;
    tracing::info!(rows = transactions.len(), path = %path.display(), "exported transactions");
    Ok(transactions.len())
}

/// Read transactions from `path`. Rows with an empty id get a fresh one.
pub(crate) fn import(path: &Path) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow::anyhow!("CSV is missing the '{name}' column"))
    };
    let date_col = column("date")?;
    let desc_col = column("description")?;
    let amount_col = column("amount")?;
    let id_col = column("id").ok();
    let category_col = column("category").ok();
    let notes_col = column("notes").ok();

    let mut transactions = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result.context("Failed to read CSV record")?;
        // Header is line 1
        let line = i + 2;
        let field = |col: Option<usize>| {
            col.and_then(|c| record.get(c))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let date_str = field(Some(date_col));
        let date = parse_date(&date_str)
            .with_context(|| format!("Line {line}: failed to parse date '{date_str}'"))?;
        let amount_str = field(Some(amount_col));
        let amount = parse_amount(&amount_str)
            .with_context(|| format!("Line {line}: failed to parse amount '{amount_str}'"))?;
        let category = Some(field(category_col)).filter(|c| !c.is_empty());

        let mut txn = Transaction::new(field(Some(desc_col)), amount, date, category);
        let id = field(id_col);
        if !id.is_empty() {
            txn.id = id;
        }
        txn.notes = field(notes_col);
        txn.validate().with_context(|| format!("Line {line}"))?;
        transactions.push(txn);
    }

    tracing::debug!(rows = transactions.len(), path = %path.display(), "parsed CSV");
    Ok(transactions)
}

/// Parse an amount, tolerating `$` and thousands separators.
pub(crate) fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned = s.trim().replace(['$', ','], "");
    // "-$5.00" and "$-5.00" both end up as "-5.00"
    Decimal::from_str(cleaned.trim()).with_context(|| format!("Not a number: '{s}'"))
}

#[cfg(test)]
mod tests;
