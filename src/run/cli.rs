use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::path::Path;

use super::util::{
    flag_value, format_amount, format_date, format_percent, format_signed, has_flag, positional,
    truncate,
};
use crate::analytics::{
    self, BudgetComparison, Insight, InsightKind, MonthKey, Severity, SortKey, TimeWindow,
};
use crate::db::{parse_date, Database};
use crate::models::{Budgets, Category, Transaction};

/// Budget insights shown before collapsing the rest into a count.
const BUDGET_INSIGHTS_SHOWN: usize = 3;
/// Rows in the dashboard's top-category and recent lists.
const DASHBOARD_ROWS: usize = 3;

pub(crate) fn as_cli(args: &[String], db: &mut Database, now: NaiveDateTime) -> Result<()> {
    let Some(command) = args.get(1) else {
        return cli_summary(&[], db, now);
    };
    let rest = &args[2..];
    match command.as_str() {
        "summary" | "s" => cli_summary(rest, db, now),
        "add" | "a" => cli_add(rest, db, now),
        "edit" => cli_edit(rest, db),
        "delete" | "rm" => cli_delete(rest, db),
        "list" | "ls" => cli_list(rest, db),
        "breakdown" => cli_breakdown(rest, db, now),
        "trend" => cli_trend(db),
        "budgets" => cli_budgets(rest, db, now),
        "budget" => cli_budget(rest, db),
        "insights" | "i" => cli_insights(db, now),
        "categories" => {
            cli_categories();
            Ok(())
        }
        "export" => cli_export(rest, db, now),
        "import" => cli_import(rest, db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("fintrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("fintrack - local-only personal finance tracker");
    println!();
    println!("Usage: fintrack [command]");
    println!();
    println!("Commands:");
    println!("  summary [--window W]          Balance, income, expenses, top categories (default)");
    println!("  add <amount> <description>    Record a transaction (negative = expense)");
    println!("    --date <YYYY-MM-DD>         Transaction date (default: now)");
    println!("    --category <id>             Category id, see `fintrack categories`");
    println!("    --notes <text>              Free-form notes");
    println!("  edit <id> [--amount A] [--description T] [--date D] [--category C] [--notes N]");
    println!("  delete <id>                   Remove a transaction");
    println!("  list [--search S] [--category C] [--limit N]");
    println!("    --sort <date|description|amount> [--asc|--desc]   (default: date, newest first)");
    println!("  breakdown [--window W]        Spending by category");
    println!("  trend                         Monthly income and expenses");
    println!("  budgets [--window W]          Budget vs. actual (default: this month)");
    println!("  budget set <category> <amt>   Set a monthly budget");
    println!("  budget clear <category>       Remove a monthly budget");
    println!("  insights                      Spending insights for this month");
    println!("  categories                    List categories");
    println!("  export [path] [--window W]    Export transactions to CSV");
    println!("  import <file.csv>             Import transactions from CSV");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Windows: month, quarter, year, all");
}

// ── Argument parsing ─────────────────────────────────────────

fn window_arg(args: &[String], default: TimeWindow) -> Result<TimeWindow> {
    match flag_value(args, "--window") {
        Some(w) => TimeWindow::parse(w)
            .ok_or_else(|| anyhow::anyhow!("Unknown window '{w}' (use month, quarter, year, all)")),
        None => Ok(default),
    }
}

fn category_arg(value: &str) -> Result<Category> {
    Category::parse(value).ok_or_else(|| {
        anyhow::anyhow!("Unknown category '{value}'. Run `fintrack categories` for the list")
    })
}

/// `none` or an empty value clears the category.
fn optional_category_arg(value: &str) -> Result<Option<String>> {
    if value.trim().is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Ok(Some(category_arg(value)?.id().to_string()))
}

fn date_arg(value: &str) -> Result<NaiveDateTime> {
    parse_date(value).with_context(|| format!("Invalid date '{value}' (use YYYY-MM-DD)"))
}

fn amount_arg(value: &str) -> Result<Decimal> {
    crate::csv_io::parse_amount(value)
}

fn window_label(window: TimeWindow, now: NaiveDateTime) -> String {
    match window {
        TimeWindow::Month => MonthKey::of(now).label(),
        TimeWindow::Quarter => format!("quarter since {}", format_date(analytics::quarter_start(now))),
        TimeWindow::Year => now.format("%Y").to_string(),
        TimeWindow::All => "all time".into(),
    }
}

// ── Transactions ─────────────────────────────────────────────

fn cli_add(args: &[String], db: &mut Database, now: NaiveDateTime) -> Result<()> {
    let words = positional(args);
    if words.len() < 2 {
        anyhow::bail!("Usage: fintrack add <amount> <description> [--date D] [--category C] [--notes N]");
    }
    let amount = amount_arg(words[0])?;
    let description = words[1..].join(" ");
    let date = match flag_value(args, "--date") {
        Some(d) => date_arg(d)?,
        None => now,
    };
    let category = match flag_value(args, "--category") {
        Some(c) => optional_category_arg(c)?,
        None => None,
    };

    let mut txn = Transaction::new(description, amount, date, category);
    if let Some(notes) = flag_value(args, "--notes") {
        txn.notes = notes.to_string();
    }
    db.insert_transaction(&txn)?;
    println!(
        "Added {}: {} {} ({})",
        txn.id,
        txn.description,
        format_signed(txn.amount),
        txn.category().name()
    );
    Ok(())
}

fn cli_edit(args: &[String], db: &mut Database) -> Result<()> {
    let id = positional(args)
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Usage: fintrack edit <id> [--amount A] [--description T] [--date D] [--category C] [--notes N]"))?;
    let existing = db
        .get_transaction(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {id} not found"))?;

    // Build the full replacement record
    let mut updated = existing.clone();
    if let Some(a) = flag_value(args, "--amount") {
        updated.amount = amount_arg(a)?;
    }
    if let Some(d) = flag_value(args, "--description") {
        updated.description = d.to_string();
    }
    if let Some(d) = flag_value(args, "--date") {
        updated.date = date_arg(d)?;
    }
    if let Some(c) = flag_value(args, "--category") {
        updated.category = optional_category_arg(c)?;
    }
    if let Some(n) = flag_value(args, "--notes") {
        updated.notes = n.to_string();
    }

    if updated == existing {
        println!("Nothing to change for {id}");
        return Ok(());
    }
    if !db.update_transaction(&updated)? {
        anyhow::bail!("Transaction {id} not found");
    }
    println!("Updated {id}");
    Ok(())
}

fn cli_delete(args: &[String], db: &mut Database) -> Result<()> {
    let id = positional(args)
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Usage: fintrack delete <id>"))?;
    if !db.delete_transaction(id)? {
        anyhow::bail!("Transaction {id} not found");
    }
    println!("Deleted {id}");
    Ok(())
}

fn cli_list(args: &[String], db: &mut Database) -> Result<()> {
    let search = flag_value(args, "--search");
    // Raw id match, so imported ids outside the registry can be listed too
    let category = flag_value(args, "--category");
    let limit = match flag_value(args, "--limit") {
        Some(l) => l
            .parse::<usize>()
            .with_context(|| format!("Invalid limit '{l}'"))?,
        None => usize::MAX,
    };
    let sort = match flag_value(args, "--sort") {
        Some(k) => SortKey::parse(k)
            .ok_or_else(|| anyhow::anyhow!("Unknown sort '{k}' (use date, description, amount)"))?,
        None => SortKey::Date,
    };
    let ascending = match (has_flag(args, "--asc"), has_flag(args, "--desc")) {
        (true, true) => anyhow::bail!("Use either --asc or --desc, not both"),
        (asc, _) => asc,
    };

    let all = db.get_transactions()?;
    let matching = all.iter().filter(|t| t.matches(search, category));
    let mut rows = analytics::sorted(matching, sort, ascending);
    rows.truncate(limit);
    if rows.is_empty() {
        println!("No transactions found");
        return Ok(());
    }

    println!(
        "{:<14} {:<16} {:<32} {:<18} {:>14}",
        "Date", "ID", "Description", "Category", "Amount"
    );
    println!("{}", "─".repeat(98));
    for txn in &rows {
        let category = txn.category();
        println!(
            "{:<14} {:<16} {:<32} {} {:<16} {:>14}",
            format_date(txn.date),
            truncate(&txn.id, 16),
            truncate(&txn.description, 32),
            category.icon(),
            category.name(),
            format_signed(txn.amount),
        );
    }
    println!();
    println!("{} of {} transactions", rows.len(), all.len());
    Ok(())
}

// ── Reports ──────────────────────────────────────────────────

fn cli_summary(args: &[String], db: &mut Database, now: NaiveDateTime) -> Result<()> {
    let window = window_arg(args, TimeWindow::All)?;
    let all = db.get_transactions()?;
    let txns = analytics::filter_by_window(&all, window, now);

    let totals = analytics::totals(txns.iter().copied());
    println!("fintrack - {}", window_label(window, now));
    println!("{}", "─".repeat(40));
    println!("  Balance:      {}", format_amount(totals.balance));
    println!("  Income:       {}", format_amount(totals.income));
    println!("  Expenses:     {}", format_amount(totals.expenses));
    if let Some(rate) = analytics::savings_rate(&totals) {
        println!("  Savings rate: {}", format_percent(rate));
    }
    println!("  Transactions: {}", totals.count);

    let top = analytics::top_categories(txns.iter().copied(), DASHBOARD_ROWS);
    println!();
    println!("Top Expense Categories:");
    if top.is_empty() {
        println!("  No expense data yet");
    }
    for entry in &top {
        println!(
            "  {} {:<16} {:>12}  {} of total",
            entry.category.icon(),
            entry.category.name(),
            format_amount(entry.amount),
            format_percent(analytics::share_of(entry.amount, totals.expenses)),
        );
    }

    let latest = analytics::recent(txns.iter().copied(), DASHBOARD_ROWS);
    println!();
    println!("Recent Transactions:");
    if latest.is_empty() {
        println!("  No transactions yet");
    }
    for txn in &latest {
        println!(
            "  {:<14} {:<28} {:>14}",
            format_date(txn.date),
            truncate(&txn.description, 28),
            format_signed(txn.amount),
        );
    }
    Ok(())
}

fn cli_breakdown(args: &[String], db: &mut Database, now: NaiveDateTime) -> Result<()> {
    let window = window_arg(args, TimeWindow::All)?;
    let all = db.get_transactions()?;
    let breakdown = analytics::category_breakdown(analytics::filter_by_window(&all, window, now));
    if breakdown.is_empty() {
        println!("No expense data for {}", window_label(window, now));
        return Ok(());
    }

    let total = breakdown
        .values()
        .fold(Decimal::ZERO, |acc, amount| analytics::saturating_add(acc, *amount));
    println!("Spending by Category - {}", window_label(window, now));
    println!("{}", "─".repeat(48));
    for entry in analytics::rank(&breakdown) {
        println!(
            "  {} {:<16} {:>12}  {:>6}",
            entry.category.icon(),
            entry.category.name(),
            format_amount(entry.amount),
            format_percent(analytics::share_of(entry.amount, total)),
        );
    }
    println!("{}", "─".repeat(48));
    println!("  {:<19} {:>12}", "Total", format_amount(total));
    Ok(())
}

fn cli_trend(db: &mut Database) -> Result<()> {
    let all = db.get_transactions()?;
    let series = analytics::monthly_series(&all);
    if series.is_empty() {
        println!("No data available. Add transactions to see your monthly overview.");
        return Ok(());
    }

    println!(
        "{:<10} {:>14} {:>14} {:>14}",
        "Month", "Income", "Expenses", "Net"
    );
    println!("{}", "─".repeat(55));
    for month in &series {
        println!(
            "{:<10} {:>14} {:>14} {:>14}",
            month.month.label(),
            format_amount(month.income),
            format_amount(month.expenses),
            format_amount(month.net()),
        );
    }
    Ok(())
}

fn cli_budgets(args: &[String], db: &mut Database, now: NaiveDateTime) -> Result<()> {
    let budgets = db.get_budgets()?;
    let all = db.get_transactions()?;
    let window = flag_value(args, "--window")
        .map(|_| window_arg(args, TimeWindow::Month))
        .transpose()?;

    if budgets.is_empty() {
        println!("No budgets set. Use `fintrack budget set <category> <amount>`.");
    }
    let Some(rows) = budget_rows(&all, &budgets, window, now) else {
        return Ok(());
    };
    let label = window_label(window.unwrap_or(TimeWindow::Month), now);
    if rows.is_empty() {
        println!("No budget data available for {label}.");
        return Ok(());
    }

    println!("Budget vs. Actual - {label}");
    println!("{}", "─".repeat(78));
    println!(
        "  {:<19} {:>12} {:>12} {:>13}  Status",
        "Category", "Budget", "Actual", "Remaining"
    );
    for row in &rows {
        let status = if row.has_budget() {
            format!("{} of budget used", format_percent(row.percent_used))
        } else {
            "No budget set".to_string()
        };
        println!(
            "  {} {:<16} {:>12} {:>12} {:>13}  {status}",
            row.category.icon(),
            row.category.name(),
            format_amount(row.budget),
            format_amount(row.actual),
            format_amount(row.remaining),
        );
    }
    println!("{}", "─".repeat(78));
    println!("  Total monthly budget: {}", format_amount(budgets.total()));
    Ok(())
}

/// Rows for the budget table. `None` means no table at all: nothing is
/// budgeted and no window was asked for.
pub(super) fn budget_rows(
    all: &[Transaction],
    budgets: &Budgets,
    window: Option<TimeWindow>,
    now: NaiveDateTime,
) -> Option<Vec<BudgetComparison>> {
    match window {
        // Explicit window: only categories with spend in it
        Some(w) => Some(analytics::budget_comparison(all, budgets, w, now)),
        None if budgets.is_empty() => None,
        None => Some(analytics::budget_overview(all, budgets, now)),
    }
}

fn cli_budget(args: &[String], db: &mut Database) -> Result<()> {
    let words = positional(args);
    let mut budgets = db.get_budgets()?;
    match words.as_slice() {
        ["set", category, amount] => {
            let category = category_arg(category)?;
            let limit = amount_arg(amount)?;
            budgets.set(category, limit)?;
            db.save_budgets(&budgets)?;
            println!("Budget for {category} set to {}", format_amount(limit));
        }
        ["clear", category] => {
            let category = category_arg(category)?;
            if budgets.remove(category).is_none() {
                println!("No budget set for {category}");
                return Ok(());
            }
            db.save_budgets(&budgets)?;
            println!("Budget for {category} cleared");
        }
        _ => anyhow::bail!("Usage: fintrack budget set <category> <amount> | budget clear <category>"),
    }
    Ok(())
}

fn cli_insights(db: &mut Database, now: NaiveDateTime) -> Result<()> {
    let all = db.get_transactions()?;
    let budgets = db.get_budgets()?;
    let insights = analytics::generate_insights(&all, &budgets, now);

    println!("Spending Insights - {}", MonthKey::of(now).label());
    println!("{}", "─".repeat(40));
    if insights.is_empty() {
        println!("Add more transactions to generate spending insights.");
        return Ok(());
    }
    for line in insight_lines(&insights) {
        println!("  {line}");
    }
    Ok(())
}

/// Trend, savings and top category first, then at most
/// `BUDGET_INSIGHTS_SHOWN` budget insights and a count of the rest.
pub(super) fn insight_lines(insights: &[Insight]) -> Vec<String> {
    let of_kind = |kind: InsightKind| insights.iter().filter(move |i| i.kind == kind);
    let mut lines: Vec<String> = of_kind(InsightKind::Trend)
        .chain(of_kind(InsightKind::Savings))
        .chain(of_kind(InsightKind::TopCategory))
        .chain(of_kind(InsightKind::Budget).take(BUDGET_INSIGHTS_SHOWN))
        .map(format_insight)
        .collect();

    let hidden = of_kind(InsightKind::Budget).count().saturating_sub(BUDGET_INSIGHTS_SHOWN);
    if hidden > 0 {
        lines.push(format!("+ {hidden} more insights"));
    }
    lines
}

fn format_insight(insight: &Insight) -> String {
    let marker = match insight.severity {
        Severity::Warning => "!",
        Severity::Info => "i",
        Severity::Positive => "✓",
        Severity::Suggestion => "*",
    };
    let icon = insight.category.map(|c| format!("{} ", c.icon())).unwrap_or_default();
    format!("[{marker}] {icon}{}", insight.message)
}

fn cli_categories() {
    println!("{:<15} {:<16} Color", "ID", "Name");
    println!("{}", "─".repeat(42));
    for category in Category::all() {
        println!(
            "{:<15} {} {:<14} {}",
            category.id(),
            category.icon(),
            category.name(),
            category.color()
        );
    }
}

// ── CSV ──────────────────────────────────────────────────────

fn cli_export(args: &[String], db: &mut Database, now: NaiveDateTime) -> Result<()> {
    let window = window_arg(args, TimeWindow::All)?;

    // Output path is the first non-flag argument
    let output_path = positional(args)
        .first()
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/fintrack-export-{}.csv", now.format("%Y-%m-%d"))
        });

    let all = db.get_transactions()?;
    let selected: Vec<Transaction> = analytics::filter_by_window(&all, window, now)
        .into_iter()
        .cloned()
        .collect();
    let count = crate::csv_io::export(Path::new(&output_path), &selected)?;
    if count == 0 {
        println!("No transactions for {}", window_label(window, now));
    } else {
        println!("Exported {count} transactions to {output_path}");
    }
    Ok(())
}

fn cli_import(args: &[String], db: &mut Database) -> Result<()> {
    let file_path = positional(args)
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Usage: fintrack import <file.csv>"))?;
    let path = Path::new(file_path);
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }

    let txns = crate::csv_io::import(path)?;
    println!("Parsed {} transactions", txns.len());
    let count = db.insert_transactions_batch(&txns)?;
    let dupes = txns.len() - count;
    println!("Imported {count} new transactions ({dupes} duplicates skipped)");
    println!("{} transactions stored", db.get_transaction_count()?);
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
