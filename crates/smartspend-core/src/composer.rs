//! Prompt composer
//!
//! Turns a statistics bundle into the system instruction and user prompt for
//! the completion service. The wording lives in the prompt library; this
//! module only formats the numbers that fill it.

use std::collections::{BTreeMap, HashMap};

use crate::config::BudgetPolicy;
use crate::error::Result;
use crate::models::SpendingStats;
use crate::prompts::{PromptId, PromptLibrary};

/// A rendered prompt pair, ready for a completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

/// Renders spending statistics into a budget recommendation prompt
pub struct PromptComposer {
    prompts: PromptLibrary,
    policy: BudgetPolicy,
}

impl PromptComposer {
    pub fn new(prompts: PromptLibrary, policy: BudgetPolicy) -> Self {
        Self { prompts, policy }
    }

    /// Compose the budget recommendation prompt
    pub fn compose(
        &mut self,
        stats: &SpendingStats,
        monthly_income: f64,
        currency: &str,
    ) -> Result<ComposedPrompt> {
        let income = format_amount(monthly_income);
        let category_totals = format_amounts(&stats.recent.category_totals, currency);
        let monthly_averages = format_amounts(&stats.monthly_averages, currency);
        let seasonal_factors = stats
            .seasonal_factors
            .iter()
            .map(|(category, factor)| format!("- {}: {:.2}", category, factor))
            .collect::<Vec<_>>()
            .join("\n");
        let trends = if stats.trends.is_empty() {
            "- no spending recorded".to_string()
        } else {
            stats
                .trends
                .iter()
                .map(|t| format!("- {}: {} ({:+.1}%)", t.category, t.direction, t.percent_change))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let max_budget_pct = format!("{:.0}", self.policy.max_budget_ratio * 100.0);
        let emergency_months = format!("{}", self.policy.emergency_fund_months);
        let min_savings_rate = format!("{}", self.policy.min_savings_rate);

        let mut vars = HashMap::new();
        vars.insert("income", income.as_str());
        vars.insert("currency", currency);
        vars.insert("category_totals", category_totals.as_str());
        vars.insert("trends", trends.as_str());
        vars.insert("monthly_averages", monthly_averages.as_str());
        vars.insert("seasonal_factors", seasonal_factors.as_str());
        vars.insert("max_budget_pct", max_budget_pct.as_str());
        vars.insert("emergency_months", emergency_months.as_str());
        vars.insert("min_savings_rate", min_savings_rate.as_str());

        let prompt = self.prompts.get(PromptId::BudgetRecommendation)?;

        Ok(ComposedPrompt {
            system: prompt.render_system(&vars),
            user: prompt.render_user(&vars),
        })
    }
}

fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

fn format_amounts(amounts: &BTreeMap<String, f64>, currency: &str) -> String {
    if amounts.is_empty() {
        return "- no spending recorded".to_string();
    }

    amounts
        .iter()
        .map(|(category, amount)| format!("- {}: {} {}", category, format_amount(*amount), currency))
        .collect::<Vec<_>>()
        .join("\n")
}
