use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::window::{in_month, MonthKey};
use super::{
    category_breakdown, fixed, percent_change, percent_used, saturating_sub, savings_rate, totals,
};
use crate::models::{Budgets, Category, Transaction};

/// Percent of a budget at which a category counts as exceeded.
const EXCEEDED_PERCENT: Decimal = Decimal::ONE_HUNDRED;
/// Percent of a budget at which a category counts as approaching its limit.
const APPROACHING_PERCENT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);
/// Spend above which an unbudgeted category earns a suggestion.
const UNBUDGETED_SPEND: Decimal = Decimal::ONE_HUNDRED;
/// Minimum month-over-month change (in percent, inclusive) worth reporting.
const TREND_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
/// Savings rate (in percent) considered healthy.
const SAVINGS_TARGET: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Severity {
    Warning,
    Info,
    Positive,
    Suggestion,
}

impl Severity {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Positive => "positive",
            Self::Suggestion => "suggestion",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsightKind {
    Budget,
    Trend,
    Savings,
    TopCategory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Insight {
    pub severity: Severity,
    pub kind: InsightKind,
    pub message: String,
    pub category: Option<Category>,
}

impl Insight {
    fn new(severity: Severity, kind: InsightKind, message: String) -> Self {
        Self {
            severity,
            kind,
            message,
            category: None,
        }
    }

    fn about(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }
}

/// Insights for the calendar month containing `now`, compared against the
/// month before it.
pub(crate) fn generate<'a, I>(transactions: I, budgets: &Budgets, now: NaiveDateTime) -> Vec<Insight>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let all: Vec<&Transaction> = transactions.into_iter().collect();
    let month = MonthKey::of(now);
    let current = in_month(all.iter().copied(), month);
    let previous = in_month(all.iter().copied(), month.previous());
    from_months(&current, &previous, budgets)
}

/// Budget insights first (registry order), then trend, savings and top category.
pub(crate) fn from_months(
    current: &[&Transaction],
    previous: &[&Transaction],
    budgets: &Budgets,
) -> Vec<Insight> {
    let this_month = totals(current.iter().copied());
    let last_month = totals(previous.iter().copied());
    let spending = category_breakdown(current.iter().copied());

    let mut insights: Vec<Insight> = spending
        .iter()
        .filter_map(|(category, actual)| budget_insight(*category, *actual, budgets))
        .collect();

    insights.extend(trend_insight(last_month.expenses, this_month.expenses));

    if this_month.expenses > Decimal::ZERO {
        insights.extend(savings_rate(&this_month).map(savings_insight));
    }

    let mut top: Option<(Category, Decimal)> = None;
    for (category, amount) in &spending {
        // Strictly greater keeps the earliest registry entry on ties
        if *amount > top.map_or(Decimal::ZERO, |(_, best)| best) {
            top = Some((*category, *amount));
        }
    }
    if let Some((category, amount)) = top {
        insights.push(
            Insight::new(
                Severity::Info,
                InsightKind::TopCategory,
                format!(
                    "Your highest spending category is {} (${}).",
                    category.name(),
                    fixed(amount, 2)
                ),
            )
            .about(category),
        );
    }

    tracing::debug!(count = insights.len(), "generated insights");
    insights
}

fn budget_insight(category: Category, actual: Decimal, budgets: &Budgets) -> Option<Insight> {
    let budget = budgets.limit_for(category);
    let percent = percent_used(actual, budget);
    let name = category.name();

    let insight = if percent >= EXCEEDED_PERCENT {
        Insight::new(
            Severity::Warning,
            InsightKind::Budget,
            format!(
                "You've exceeded your {name} budget by ${}.",
                fixed(saturating_sub(actual, budget), 2)
            ),
        )
    } else if percent >= APPROACHING_PERCENT {
        Insight::new(
            Severity::Info,
            InsightKind::Budget,
            format!(
                "You're approaching your {name} budget ({}% used).",
                fixed(percent, 0)
            ),
        )
    } else if budget.is_zero() && actual > UNBUDGETED_SPEND {
        Insight::new(
            Severity::Suggestion,
            InsightKind::Budget,
            format!(
                "Consider setting a budget for {name} (spent ${}).",
                fixed(actual, 2)
            ),
        )
    } else {
        return None;
    };
    Some(insight.about(category))
}

fn trend_insight(previous: Decimal, current: Decimal) -> Option<Insight> {
    let change = percent_change(previous, current)?;
    if change.abs() < TREND_PERCENT {
        return None;
    }
    let (severity, direction) = if change > Decimal::ZERO {
        (Severity::Warning, "up")
    } else {
        (Severity::Positive, "down")
    };
    Some(Insight::new(
        severity,
        InsightKind::Trend,
        format!(
            "Your spending is {direction} {}% compared to last month.",
            fixed(change.abs(), 1)
        ),
    ))
}

fn savings_insight(rate: Decimal) -> Insight {
    if rate < Decimal::ZERO {
        Insight::new(
            Severity::Warning,
            InsightKind::Savings,
            "You're spending more than you earn this month. Consider reducing expenses.".into(),
        )
    } else if rate < SAVINGS_TARGET {
        Insight::new(
            Severity::Suggestion,
            InsightKind::Savings,
            format!(
                "Your savings rate is {}%. Consider saving at least 20% of your income.",
                fixed(rate, 1)
            ),
        )
    } else {
        Insight::new(
            Severity::Positive,
            InsightKind::Savings,
            format!("Great job! You're saving {}% of your income.", fixed(rate, 1)),
        )
    }
}
