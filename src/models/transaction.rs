use anyhow::Result;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU32, Ordering};

use super::Category;

static ID_SEQ: AtomicU32 = AtomicU32::new(0);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDateTime,
    /// Raw category id as entered; see [`Transaction::category`].
    pub category: Option<String>,
    pub notes: String,
}

impl Transaction {
    pub fn new(
        description: String,
        amount: Decimal,
        date: NaiveDateTime,
        category: Option<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            description,
            amount,
            date,
            category,
            notes: String::new(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn abs_amount(&self) -> Decimal {
        self.amount.abs()
    }

    /// Registry category, with absent or unknown ids resolved to `Other`.
    pub fn category(&self) -> Category {
        Category::resolve(self.category.as_deref())
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            anyhow::bail!("Transaction id is required");
        }
        if self.description.trim().is_empty() {
            anyhow::bail!("Description is required");
        }
        Ok(())
    }

    /// Case-insensitive description search plus an optional exact category id.
    pub fn matches(&self, search: Option<&str>, category: Option<&str>) -> bool {
        let text_ok = search.map_or(true, |s| {
            self.description
                .to_lowercase()
                .contains(&s.to_lowercase())
        });
        let category_ok = category.map_or(true, |c| self.category.as_deref() == Some(c));
        text_ok && category_ok
    }
}

/// Millisecond timestamp plus a process-local sequence, so ids stay unique
/// when many records are created within the same millisecond.
fn generate_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = ID_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{millis}-{seq}")
}
