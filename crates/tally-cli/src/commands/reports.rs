//! Report command implementations

use std::fmt::Write as _;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tally_core::{
    export_details_csv, export_summary_csv, Analytics, BudgetRegistry, CategorySummary, Database,
    TotalStats, TransactionDetail,
};

use super::{empty_store_hint, truncate};

const WIDTH: usize = 80;
const BUDGET_WIDTH: usize = WIDTH + 28;

/// Everything the dashboard shows, also the `--json` output shape
#[derive(Debug, Serialize)]
pub struct Report {
    pub totals: TotalStats,
    pub category_count: usize,
    pub uncategorized: usize,
    pub categories: Vec<CategorySummary>,
}

impl Report {
    /// Collect dashboard data, keeping only the `top` largest categories if given
    pub fn build(analytics: &Analytics<'_, Database>, top: Option<usize>) -> Result<Self> {
        let categories = match top {
            Some(n) => analytics.get_top_categories(n)?,
            None => analytics.group_by_category()?,
        };
        Ok(Self {
            totals: analytics.get_total_stats()?,
            category_count: analytics.get_category_count()?,
            uncategorized: analytics.get_uncategorized_count()?,
            categories,
        })
    }

    pub fn uncategorized_percentage(&self) -> f64 {
        if self.totals.total_count > 0 {
            self.uncategorized as f64 / self.totals.total_count as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Format an amount as `$1,234.56`, negatives as `-$1,234.56`
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // -0.004 rounds to 0.00 and should not print a sign
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac_part)
}

/// Format a 0-100 percentage as `25.3%`
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Render the dashboard table; budget columns appear when `show_budget` is set
pub fn render_dashboard(report: &Report, show_budget: bool) -> String {
    let width = if show_budget { BUDGET_WIDTH } else { WIDTH };
    let heavy = "=".repeat(width);
    let light = "-".repeat(width);
    let mut out = String::new();

    let _ = writeln!(out, "{}", heavy);
    let _ = writeln!(out, "{:^width$}", "TRANSACTION CATEGORIZATION REPORT", width = width);
    let _ = writeln!(out, "{}", heavy);
    let _ = writeln!(
        out,
        "Transactions: {}  |  Categories: {}  |  Uncategorized: {} ({})",
        report.totals.total_count,
        report.category_count,
        report.uncategorized,
        format_percentage(report.uncategorized_percentage())
    );
    let _ = writeln!(out);

    if report.categories.is_empty() {
        let _ = writeln!(out, "No transactions to display");
        return out;
    }

    let _ = writeln!(out, "{}", light);
    let mut header = format!(
        "{:<20} | {:>5} | {:>11} | {:>10} | {:>10}",
        "Category", "Count", "Total", "Average", "% of Total"
    );
    if show_budget {
        let _ = write!(header, " | {:>11} | {:>11}", "Budget", "Deviation");
    }
    let _ = writeln!(out, "{}", header);
    let _ = writeln!(out, "{}", light);

    for s in &report.categories {
        let mut row = format!(
            "{:<20} | {:>5} | {:>11} | {:>10} | {:>10}",
            truncate(&s.category, 20),
            s.count,
            format_currency(s.total),
            format_currency(s.average),
            format_percentage(s.percentage)
        );
        if show_budget {
            let budget = s.budget.map(format_currency).unwrap_or_else(|| "-".into());
            let deviation = s.deviation.map(format_currency).unwrap_or_else(|| "-".into());
            let _ = write!(row, " | {:>11} | {:>11}", budget, deviation);
        }
        let _ = writeln!(out, "{}", row);
    }
    let _ = writeln!(out, "{}", light);

    let total_count: usize = report.categories.iter().map(|s| s.count).sum();
    let total_amount: f64 = report.categories.iter().map(|s| s.total).sum();
    let total_pct: f64 = report.categories.iter().map(|s| s.percentage).sum();
    let avg_amount = if total_count > 0 {
        total_amount / total_count as f64
    } else {
        0.0
    };
    let _ = writeln!(
        out,
        "{:<20} | {:>5} | {:>11} | {:>10} | {:>10}",
        "TOTAL",
        total_count,
        format_currency(total_amount),
        format_currency(avg_amount),
        format_percentage(total_pct)
    );
    let _ = writeln!(out, "{}", heavy);

    out
}

/// Render a drill-down listing
pub fn render_drill(category: &str, details: &[TransactionDetail]) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "📂 {} ({} transactions)", category, details.len());
    let _ = writeln!(out, "   ─────────────────────────────────────────────────────────────");
    let _ = writeln!(out, "   {:10} │ {:40} │ {:>12}", "Date", "Description", "Amount");
    let _ = writeln!(out, "   ───────────┼──────────────────────────────────────────┼─────────────");

    for d in details {
        let _ = writeln!(
            out,
            "   {:10} │ {:40} │ {:>12}",
            truncate(&d.date, 10),
            truncate(&d.description, 40),
            format_currency(d.amount)
        );
    }

    let total: f64 = details.iter().map(|d| d.amount).sum();
    let _ = writeln!(out, "   ───────────┴──────────────────────────────────────────┴─────────────");
    let _ = writeln!(out, "   Net: {}", format_currency(total));
    out
}

/// Print the dashboard (or JSON) for the current database contents
pub fn cmd_report(
    db: &Database,
    budgets: &BudgetRegistry,
    top: Option<usize>,
    json: bool,
) -> Result<()> {
    if let Some(hint) = empty_store_hint(db)? {
        eprintln!("{}", hint);
    }

    let analytics = Analytics::new(db).with_budgets(budgets);
    let report = Report::build(&analytics, top).context("Failed to build report")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        print!("{}", render_dashboard(&report, !budgets.is_empty()));
    }
    Ok(())
}

/// Write the full category summary to `path`
pub fn export_summary(db: &Database, budgets: &BudgetRegistry, path: &Path) -> Result<usize> {
    let summaries = Analytics::new(db).with_budgets(budgets).group_by_category()?;
    let file = File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    let rows = export_summary_csv(file, &summaries, !budgets.is_empty())?;
    Ok(rows)
}

pub fn cmd_drill(db: &Database, category: &str, export: Option<&Path>) -> Result<()> {
    let analytics = Analytics::new(db);
    let details = analytics.get_transactions_by_category(category)?;

    if details.is_empty() {
        println!("No transactions found for category '{}'.", category);
        let available = analytics.get_all_categories()?;
        if !available.is_empty() {
            println!("Available categories: {}", available.join(", "));
        } else if let Some(hint) = empty_store_hint(db)? {
            println!("{}", hint);
        }
        return Ok(());
    }

    print!("{}", render_drill(category, &details));

    if let Some(path) = export {
        let file = File::create(path)
            .with_context(|| format!("Failed to create export file: {}", path.display()))?;
        export_details_csv(file, &details)?;
        println!();
        println!("✅ Exported {} transactions to {}", details.len(), path.display());
    }

    Ok(())
}
