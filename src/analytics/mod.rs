//! Derived analytics over a snapshot of transactions and budgets.
//!
//! Everything here is a pure function of its inputs: no clock reads, no
//! caching, no error paths. Callers recompute from the full data set.
//! Arithmetic saturates at the `Decimal` range instead of overflowing.

mod insights;
mod window;

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

use crate::models::{Budgets, Category, Transaction};

pub(crate) use insights::{generate as generate_insights, Insight, InsightKind, Severity};
pub(crate) use window::{filter_by_window, quarter_start, MonthKey, TimeWindow};

/// Expense sums per category, iterated in registry order.
pub(crate) type CategoryBreakdown = BTreeMap<Category, Decimal>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Totals {
    pub income: Decimal,
    /// Positive magnitude of all spending.
    pub expenses: Decimal,
    pub balance: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CategoryTotal {
    pub category: Category,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MonthlyTotals {
    pub month: MonthKey,
    pub income: Decimal,
    pub expenses: Decimal,
}

impl MonthlyTotals {
    pub(crate) fn net(&self) -> Decimal {
        saturating_sub(self.income, self.expenses)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BudgetComparison {
    pub category: Category,
    pub budget: Decimal,
    pub actual: Decimal,
    /// 0 when no budget is set.
    pub percent_used: Decimal,
    /// Negative when over budget.
    pub remaining: Decimal,
}

impl BudgetComparison {
    fn new(category: Category, budget: Decimal, actual: Decimal) -> Self {
        Self {
            category,
            budget,
            actual,
            percent_used: percent_used(actual, budget),
            remaining: saturating_sub(budget, actual),
        }
    }

    pub(crate) fn has_budget(&self) -> bool {
        self.budget > Decimal::ZERO
    }
}

/// Income, expenses and balance. Zero amounts count toward neither side.
pub(crate) fn totals<'a, I>(transactions: I) -> Totals
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals = Totals::default();
    for txn in transactions {
        totals.count += 1;
        if txn.is_income() {
            totals.income = saturating_add(totals.income, txn.amount);
        } else if txn.is_expense() {
            totals.expenses = saturating_add(totals.expenses, txn.abs_amount());
        }
    }
    totals.balance = saturating_sub(totals.income, totals.expenses);
    totals
}

/// Newest first, keeping insertion order among equal dates.
pub(crate) fn recent<'a, I>(transactions: I, n: usize) -> Vec<&'a Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut newest = sorted(transactions, SortKey::Date, false);
    newest.truncate(n);
    newest
}

/// Column a transaction listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SortKey {
    #[default]
    Date,
    Description,
    Amount,
}

impl SortKey {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "date" => Some(Self::Date),
            "description" => Some(Self::Description),
            "amount" => Some(Self::Amount),
            _ => None,
        }
    }
}

/// Ordered by `key`. Descriptions compare case-insensitively. Ties keep
/// their input order in either direction.
pub(crate) fn sorted<'a, I>(transactions: I, key: SortKey, ascending: bool) -> Vec<&'a Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut out: Vec<&Transaction> = transactions.into_iter().collect();
    // sort_by is stable
    out.sort_by(|a, b| {
        let ord = match key {
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::Description => a
                .description
                .to_lowercase()
                .cmp(&b.description.to_lowercase()),
            SortKey::Amount => a.amount.cmp(&b.amount),
        };
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
    out
}

pub(crate) fn category_breakdown<'a, I>(transactions: I) -> CategoryBreakdown
where
    I: IntoIterator<Item = &'a Transaction>,
{
    category_breakdown_where(transactions, |_| true)
}

/// Expense magnitude per resolved category, for records accepted by `keep`.
pub(crate) fn category_breakdown_where<'a, I, F>(transactions: I, keep: F) -> CategoryBreakdown
where
    I: IntoIterator<Item = &'a Transaction>,
    F: Fn(&Transaction) -> bool,
{
    let mut breakdown = CategoryBreakdown::new();
    for txn in transactions {
        if txn.is_expense() && keep(txn) {
            let sum = breakdown.entry(txn.category()).or_insert(Decimal::ZERO);
            *sum = saturating_add(*sum, txn.abs_amount());
        }
    }
    breakdown
}

/// Categories ranked by spend, ties kept in registry order.
pub(crate) fn top_categories<'a, I>(transactions: I, n: usize) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut ranked = rank(&category_breakdown(transactions));
    ranked.truncate(n);
    ranked
}

/// Every entry of a breakdown, largest first.
pub(crate) fn rank(breakdown: &CategoryBreakdown) -> Vec<CategoryTotal> {
    let mut ranked: Vec<CategoryTotal> = breakdown
        .iter()
        .map(|(category, amount)| CategoryTotal {
            category: *category,
            amount: *amount,
        })
        .collect();
    ranked.sort_by(|a, b| b.amount.cmp(&a.amount));
    ranked
}

/// Per-month income and expenses, oldest month first.
pub(crate) fn monthly_series<'a, I>(transactions: I) -> Vec<MonthlyTotals>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut buckets: BTreeMap<MonthKey, (Decimal, Decimal)> = BTreeMap::new();
    for txn in transactions {
        let bucket = buckets
            .entry(MonthKey::of(txn.date))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        if txn.is_income() {
            bucket.0 = saturating_add(bucket.0, txn.amount);
        } else if txn.is_expense() {
            bucket.1 = saturating_add(bucket.1, txn.abs_amount());
        }
    }
    buckets
        .into_iter()
        .map(|(month, (income, expenses))| MonthlyTotals {
            month,
            income,
            expenses,
        })
        .collect()
}

/// Budget vs. actual for every category with spend inside `window`.
pub(crate) fn budget_comparison<'a, I>(
    transactions: I,
    budgets: &Budgets,
    window: TimeWindow,
    now: NaiveDateTime,
) -> Vec<BudgetComparison>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    category_breakdown(filter_by_window(transactions, window, now))
        .into_iter()
        .map(|(category, actual)| {
            BudgetComparison::new(category, budgets.limit_for(category), actual)
        })
        .collect()
}

/// Current-month view of every budgetable category, including those with no
/// spend, sorted by budget (largest first).
pub(crate) fn budget_overview<'a, I>(
    transactions: I,
    budgets: &Budgets,
    now: NaiveDateTime,
) -> Vec<BudgetComparison>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let spent = category_breakdown(filter_by_window(transactions, TimeWindow::Month, now));
    let mut rows: Vec<BudgetComparison> = Category::budgetable()
        .map(|category| {
            let actual = spent.get(&category).copied().unwrap_or(Decimal::ZERO);
            BudgetComparison::new(category, budgets.limit_for(category), actual)
        })
        .collect();
    rows.sort_by(|a, b| b.budget.cmp(&a.budget));
    rows
}

/// `actual / budget * 100`, or 0 with no budget.
pub(crate) fn percent_used(actual: Decimal, budget: Decimal) -> Decimal {
    if budget > Decimal::ZERO {
        percent_of(actual, budget)
    } else {
        Decimal::ZERO
    }
}

/// `part` as a percentage of `whole`, or 0 when `whole` is 0.
pub(crate) fn share_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        percent_of(part, whole)
    }
}

/// Relative change from `previous` to `current` in percent; `None` on a zero base.
pub(crate) fn percent_change(previous: Decimal, current: Decimal) -> Option<Decimal> {
    if previous > Decimal::ZERO {
        Some(percent_of(saturating_sub(current, previous), previous))
    } else {
        None
    }
}

/// `(income - expenses) / income * 100`; `None` without income.
pub(crate) fn savings_rate(totals: &Totals) -> Option<Decimal> {
    if totals.income > Decimal::ZERO {
        Some(percent_of(
            saturating_sub(totals.income, totals.expenses),
            totals.income,
        ))
    } else {
        None
    }
}

/// Sum clamped to `Decimal::MIN..=Decimal::MAX`.
pub(crate) fn saturating_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(if b.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

pub(crate) fn saturating_sub(a: Decimal, b: Decimal) -> Decimal {
    a.checked_sub(b).unwrap_or(if b.is_sign_negative() {
        Decimal::MAX
    } else {
        Decimal::MIN
    })
}

/// `part / whole * 100`, clamped on overflow. `whole` must be non-zero.
fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if part.is_sign_negative() != whole.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

/// Fixed-point rendering with half-away-from-zero rounding, e.g. `fixed(dec!(97.45), 1)` is "97.5".
pub(crate) fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.prec$}", prec = dp as usize)
}
