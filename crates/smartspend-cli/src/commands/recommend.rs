//! Budget recommendation command

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use smartspend_core::{AIBackend, BudgetAdvice, BudgetAdvisor, BudgetRequest, Provenance};
use tracing::debug;

use super::core::{load_config, read_transactions, resolve_as_of};

/// Flags of the `recommend` command
#[derive(Debug, Clone)]
pub struct RecommendOptions {
    pub income: f64,
    pub currency: String,
    pub as_of: Option<NaiveDate>,
    pub offline: bool,
    pub model: Option<String>,
    pub json: bool,
}

pub async fn cmd_recommend(
    config_path: Option<&Path>,
    file: &Path,
    options: &RecommendOptions,
) -> Result<()> {
    let config = load_config(config_path)?;
    let transactions = read_transactions(file)?;
    debug!(count = transactions.len(), file = %file.display(), "Loaded transactions");

    let request = BudgetRequest::new(transactions, options.income, options.currency.as_str())
        .context("Invalid recommendation request")?
        .with_as_of(resolve_as_of(options.as_of));

    let advisor = if options.offline {
        BudgetAdvisor::new(config, None)
    } else {
        let advisor = BudgetAdvisor::from_env(config);
        match options.model.as_deref() {
            Some(model) => advisor.with_model(model),
            None => advisor,
        }
    };

    if !options.json {
        match advisor.client() {
            Some(client) => println!("🤖 Asking {} ({})...", client.host(), client.model()),
            None => println!("💡 Computing a local recommendation..."),
        }
    }

    let advice = advisor.recommend(&request).await;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&advice)?);
    } else {
        print!("{}", render_advice(&advice, request.currency()));
    }

    Ok(())
}

/// Human-readable rendering of advice
pub fn render_advice(advice: &BudgetAdvice, currency: &str) -> String {
    let rec = &advice.recommendation;
    let mut out = String::new();

    let source = match &advice.provenance {
        Provenance::Ai { model } => format!("completion service ({})", model),
        Provenance::Fallback { reason } => format!("local fallback ({})", reason),
    };

    let _ = writeln!(out);
    let _ = writeln!(out, "📊 Monthly budget: {:.2} {}", rec.total_budget, currency);
    let _ = writeln!(out, "   Source: {}", source);
    let _ = writeln!(out);

    if rec.categories.is_empty() {
        let _ = writeln!(out, "   No spending recorded in the last 3 months.");
    } else {
        let _ = writeln!(
            out,
            "   {:<20} {:>12}  {:>5}  {:<10}  {:>6}",
            "CATEGORY", "AMOUNT", "CONF", "TREND", "SEASON"
        );
        let _ = writeln!(out, "   {}", "-".repeat(62));
        for category in &rec.categories {
            let _ = writeln!(
                out,
                "   {:<20} {:>12.2}  {:>4.0}%  {:<10}  {:>6.2}",
                super::truncate(&category.category, 20),
                category.suggested_amount,
                category.confidence,
                category.trend,
                category.seasonal_factor
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "💰 Savings rate: {:.1}%", rec.savings_rate);
    let _ = writeln!(out, "🛟 Emergency fund: {:.2} {}", rec.emergency_fund, currency);

    if !rec.insights.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Insights:");
        for insight in &rec.insights {
            let _ = writeln!(out, "  • {}", insight);
        }
    }

    out
}
