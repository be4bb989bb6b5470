use anyhow::Result;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::Category;

/// Monthly spending limits keyed by category.
///
/// A category without an entry has a zero budget, which the analytics treat
/// as "no budget set".
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Budgets {
    limits: BTreeMap<Category, Decimal>,
}

impl Budgets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit_for(&self, category: Category) -> Decimal {
        self.limits.get(&category).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn set(&mut self, category: Category, limit: Decimal) -> Result<()> {
        if category == Category::Income {
            anyhow::bail!("Income cannot have a budget");
        }
        if limit < Decimal::ZERO {
            anyhow::bail!("Budget for {category} cannot be negative");
        }
        self.limits.insert(category, limit);
        Ok(())
    }

    pub fn remove(&mut self, category: Category) -> Option<Decimal> {
        self.limits.remove(&category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, Decimal)> + '_ {
        self.limits.iter().map(|(c, l)| (*c, *l))
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    /// Sum of every configured limit, capped at `Decimal::MAX`.
    pub fn total(&self) -> Decimal {
        self.limits
            .values()
            .try_fold(Decimal::ZERO, |acc, limit| acc.checked_add(*limit))
            .unwrap_or(Decimal::MAX)
    }
}
