//! Spending analysis and prompt preview commands

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use smartspend_core::{
    analyze_spending, validate_transactions, AnalysisWindows, BudgetRequest, PromptComposer,
    PromptLibrary, SpendingStats,
};

use super::core::{load_config, read_transactions, resolve_as_of};

pub fn cmd_analyze(
    config_path: Option<&Path>,
    file: &Path,
    as_of: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let transactions = read_transactions(file)?;
    validate_transactions(&transactions).context("Invalid transactions")?;
    let as_of = resolve_as_of(as_of);

    let stats = analyze_spending(&transactions, as_of, config.policy.trend_threshold_pct);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", render_stats(&stats, &AnalysisWindows::ending_on(as_of)));
    }

    Ok(())
}

/// Human-readable rendering of the statistics bundle
pub fn render_stats(stats: &SpendingStats, windows: &AnalysisWindows) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "📅 Recent window: {} to {}",
        windows.recent_start,
        windows.recent_end.pred_opt().unwrap_or(windows.recent_end)
    );
    let _ = writeln!(
        out,
        "   Expenses: {:.2} over {} transactions (avg {:.2}), income {:.2}",
        stats.recent.total_expenses,
        stats.recent.transaction_count,
        stats.recent.average_transaction_amount,
        stats.recent.total_income
    );
    let _ = writeln!(
        out,
        "   Prior window from {}: expenses {:.2}",
        windows.older_start, stats.older.total_expenses
    );
    let _ = writeln!(out);

    if stats.trends.is_empty() {
        let _ = writeln!(out, "No expenses in either window.");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<20} {:>12} {:>12} {:>10}  {:<10}",
        "CATEGORY", "RECENT", "PRIOR", "CHANGE", "TREND"
    );
    let _ = writeln!(out, "{}", "-".repeat(70));
    for trend in &stats.trends {
        let recent = stats
            .recent
            .category_totals
            .get(&trend.category)
            .copied()
            .unwrap_or(0.0);
        let older = stats
            .older
            .category_totals
            .get(&trend.category)
            .copied()
            .unwrap_or(0.0);
        let _ = writeln!(
            out,
            "{:<20} {:>12.2} {:>12.2} {:>+9.1}%  {:<10}",
            super::truncate(&trend.category, 20),
            recent,
            older,
            trend.percent_change,
            trend.direction
        );
    }

    if !stats.monthly.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Monthly breakdown:");
        for (month, categories) in &stats.monthly {
            let total: f64 = categories.values().sum();
            let _ = writeln!(out, "  {}  {:.2}", month, total);
            for (category, amount) in categories {
                let _ = writeln!(out, "    {:<18} {:>10.2}", category, amount);
            }
        }
    }

    out
}

pub fn cmd_prompt(
    config_path: Option<&Path>,
    file: &Path,
    income: f64,
    currency: &str,
    as_of: Option<NaiveDate>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let request = BudgetRequest::new(read_transactions(file)?, income, currency)
        .context("Invalid prompt request")?
        .with_as_of(resolve_as_of(as_of));

    let stats = analyze_spending(
        request.transactions(),
        request.as_of(),
        config.policy.trend_threshold_pct,
    );
    let mut composer = PromptComposer::new(PromptLibrary::new(), config.policy);
    let prompt = composer
        .compose(&stats, request.monthly_income(), request.currency())
        .context("Failed to compose prompt")?;

    println!("--- System ---");
    println!("{}", prompt.system);
    println!();
    println!("--- User ---");
    println!("{}", prompt.user);

    Ok(())
}
