mod schema;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::*;

/// Storage format for transaction dates.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const TRANSACTION_COLUMNS: &str = "id, description, amount, date, category, notes";

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        // Check if schema_version table exists
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(version = schema::CURRENT_VERSION, "created database schema");
            return Ok(());
        }

        // Existing database - check version and apply migrations
        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(
                from = current,
                to = schema::CURRENT_VERSION,
                "migrated database schema"
            );
        }

        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn insert_transaction(&self, txn: &Transaction) -> Result<()> {
        txn.validate()?;
        if self.transaction_exists(&txn.id)? {
            anyhow::bail!("Transaction {} already exists", txn.id);
        }
        self.conn.execute(
            "INSERT INTO transactions (id, description, amount, date, category, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                txn.id,
                txn.description,
                txn.amount.to_string(),
                txn.date.format(DATE_FORMAT).to_string(),
                txn.category,
                txn.notes,
            ],
        )?;
        tracing::debug!(id = %txn.id, "inserted transaction");
        Ok(())
    }

    /// Insert many records in one transaction, skipping ids already stored.
    /// Returns the number inserted.
    pub(crate) fn insert_transactions_batch(&mut self, txns: &[Transaction]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut count = 0;
        for txn in txns {
            txn.validate()
                .with_context(|| format!("Invalid transaction {}", txn.id))?;
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO transactions (id, description, amount, date, category, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    txn.id,
                    txn.description,
                    txn.amount.to_string(),
                    txn.date.format(DATE_FORMAT).to_string(),
                    txn.category,
                    txn.notes,
                ],
            )?;
            count += inserted;
        }
        tx.commit()?;
        tracing::debug!(inserted = count, skipped = txns.len() - count, "batch insert");
        Ok(count)
    }

    /// Replace the whole record with the same id, keeping its position.
    /// Returns false when no such id exists.
    pub(crate) fn update_transaction(&self, txn: &Transaction) -> Result<bool> {
        txn.validate()?;
        let changed = self.conn.execute(
            "UPDATE transactions
             SET description = ?2, amount = ?3, date = ?4, category = ?5, notes = ?6
             WHERE id = ?1",
            params![
                txn.id,
                txn.description,
                txn.amount.to_string(),
                txn.date.format(DATE_FORMAT).to_string(),
                txn.category,
                txn.notes,
            ],
        )?;
        tracing::debug!(id = %txn.id, changed, "updated transaction");
        Ok(changed > 0)
    }

    /// Returns false when no such id exists.
    pub(crate) fn delete_transaction(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        tracing::debug!(id, changed, "deleted transaction");
        Ok(changed > 0)
    }

    pub(crate) fn get_transaction(&self, id: &str) -> Result<Option<Transaction>> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id], transaction_from_row)
            .optional()?)
    }

    /// Every transaction, in insertion order.
    pub(crate) fn get_transactions(&self) -> Result<Vec<Transaction>> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY seq");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], transaction_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_transaction_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }

    fn transaction_exists(&self, id: &str) -> Result<bool> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM transactions WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?)
    }

    // ── Budgets ───────────────────────────────────────────────

    pub(crate) fn get_budgets(&self) -> Result<Budgets> {
        let mut stmt = self
            .conn
            .prepare("SELECT category, limit_amount FROM budgets ORDER BY category")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut budgets = Budgets::new();
        for row in rows {
            let (id, amt_str) = row?;
            let Some(category) = Category::parse(&id) else {
                tracing::warn!(category = %id, "skipping budget for unknown category");
                continue;
            };
            let limit = Decimal::from_str(&amt_str).unwrap_or_default();
            if let Err(e) = budgets.set(category, limit) {
                tracing::warn!(category = %id, error = %e, "skipping invalid budget");
            }
        }
        Ok(budgets)
    }

    /// Replace every stored budget with `budgets`.
    pub(crate) fn save_budgets(&mut self, budgets: &Budgets) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM budgets", [])?;
        for (category, limit) in budgets.iter() {
            tx.execute(
                "INSERT INTO budgets (category, limit_amount) VALUES (?1, ?2)",
                params![category.id(), limit.to_string()],
            )?;
        }
        tx.commit()?;
        tracing::debug!(total = %budgets.total(), "saved budgets");
        Ok(())
    }
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let amount_str: String = row.get(2)?;
    let date_str: String = row.get(3)?;
    let date = parse_date(&date_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("invalid transaction date '{date_str}'").into(),
        )
    })?;
    Ok(Transaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: Decimal::from_str(&amount_str).unwrap_or_default(),
        date,
        category: row.get(4)?,
        notes: row.get(5)?,
    })
}

/// Accepts the storage format, a space-separated date-time, or a bare date
/// (taken as midnight).
pub(crate) fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests;
