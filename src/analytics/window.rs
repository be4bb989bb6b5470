use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::models::Transaction;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Time-range filter applied before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum TimeWindow {
    #[default]
    Month,
    Quarter,
    Year,
    All,
}

impl TimeWindow {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
            Self::All => "all",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "month" | "m" => Some(Self::Month),
            "quarter" | "q" => Some(Self::Quarter),
            "year" | "y" => Some(Self::Year),
            "all" | "a" => Some(Self::All),
            _ => None,
        }
    }

    pub(crate) fn contains(&self, date: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self {
            Self::Month => MonthKey::of(date) == MonthKey::of(now),
            Self::Quarter => date >= quarter_start(now),
            Self::Year => date.year() == now.year(),
            Self::All => true,
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Midnight on the first day of the 3-month quarter containing `now`.
pub(crate) fn quarter_start(now: NaiveDateTime) -> NaiveDateTime {
    let first_month = (now.month0() / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(now.year(), first_month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(now)
}

/// Transactions inside `window`, relative to the injected `now`.
///
/// The quarter window has no upper bound: future-dated records count.
pub(crate) fn filter_by_window<'a, I>(
    transactions: I,
    window: TimeWindow,
    now: NaiveDateTime,
) -> Vec<&'a Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|t| window.contains(t.date, now))
        .collect()
}

/// Transactions in one calendar month.
pub(crate) fn in_month<'a, I>(transactions: I, month: MonthKey) -> Vec<&'a Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|t| MonthKey::of(t.date) == month)
        .collect()
}

/// A calendar month. Ordering is chronological and matches the
/// lexicographic order of the zero-padded `YYYY-MM` rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct MonthKey {
    pub year: i32,
    /// 1-based
    pub month: u32,
}

impl MonthKey {
    pub(crate) fn of(date: NaiveDateTime) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month before this one; January wraps to December of the prior year.
    pub(crate) fn previous(&self) -> Self {
        if self.month <= 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Short label, e.g. "Jan 2024".
    pub(crate) fn label(&self) -> String {
        let idx = (self.month.clamp(1, 12) - 1) as usize;
        format!("{} {}", MONTH_NAMES[idx], self.year)
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
