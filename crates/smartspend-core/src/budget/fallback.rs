//! Local fallback recommendation
//!
//! Pure arithmetic over the last three months of expenses. Used whenever the
//! completion service cannot produce a usable recommendation, so it must
//! never fail: an empty history yields an all-zero budget.

use chrono::NaiveDate;

use crate::analysis::{aggregate_period, monthly_averages, AnalysisWindows, WINDOW_MONTHS};
use crate::config::FallbackSettings;
use crate::models::{BudgetRecommendation, CategoryRecommendation, Transaction, Trend};

use super::non_negative;

/// Months of average spending kept as emergency fund
const EMERGENCY_FUND_MONTHS: f64 = 3.0;

/// Generic advice attached to every fallback recommendation
pub const FALLBACK_INSIGHTS: [&str; 4] = [
    "This budget is based on your average spending over the last 3 months.",
    "Review your largest categories first for savings opportunities.",
    "Set aside savings at the start of each month before spending.",
    "Build an emergency fund covering at least 3 months of expenses.",
];

/// Compute a recommendation from recent averages only
pub fn fallback_recommendation(
    transactions: &[Transaction],
    monthly_income: f64,
    as_of: NaiveDate,
    settings: &FallbackSettings,
) -> BudgetRecommendation {
    let windows = AnalysisWindows::ending_on(as_of);
    let recent = aggregate_period(transactions, windows.recent_start, windows.recent_end);
    let averages = monthly_averages(&recent.category_totals, WINDOW_MONTHS);

    let category_cap = non_negative(monthly_income) * settings.category_income_cap;

    let mut categories: Vec<CategoryRecommendation> = averages
        .iter()
        .map(|(category, average)| CategoryRecommendation {
            category: category.clone(),
            suggested_amount: (average * settings.growth_allowance).min(category_cap),
            confidence: settings.confidence,
            reasoning: format!(
                "Based on average monthly spending of {:.2} over the last {} months",
                average, WINDOW_MONTHS
            ),
            trend: Trend::Stable,
            seasonal_factor: 1.0,
        })
        .collect();

    categories.sort_by(|a, b| {
        b.suggested_amount
            .total_cmp(&a.suggested_amount)
            .then_with(|| a.category.cmp(&b.category))
    });

    let total_budget = categories.iter().map(|c| c.suggested_amount).sum();
    let total_average: f64 = averages.values().sum();

    BudgetRecommendation {
        total_budget,
        categories,
        savings_rate: settings.savings_rate,
        emergency_fund: total_average * EMERGENCY_FUND_MONTHS,
        insights: FALLBACK_INSIGHTS.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn settings() -> FallbackSettings {
        FallbackSettings::default()
    }

    #[test]
    fn test_category_capped_by_growth_allowance() {
        let txs = vec![
            Transaction::expense("1", 30_000.0, "Food", date(2026, 1, 15)),
            Transaction::expense("2", 30_000.0, "Food", date(2026, 2, 15)),
            Transaction::expense("3", 30_000.0, "Food", date(2026, 3, 15)),
        ];

        let rec = fallback_recommendation(&txs, 300_000.0, date(2026, 3, 31), &settings());

        let food = rec.category("Food").unwrap();
        assert!((food.suggested_amount - 33_000.0).abs() < 1e-6);
        assert_eq!(food.confidence, 70.0);
        assert_eq!(food.trend, Trend::Stable);
        assert_eq!(food.seasonal_factor, 1.0);
        assert!((rec.total_budget - 33_000.0).abs() < 1e-6);
        assert_eq!(rec.savings_rate, 20.0);
        assert!((rec.emergency_fund - 90_000.0).abs() < 1e-6);
        assert_eq!(rec.insights.len(), 4);
    }

    #[test]
    fn test_category_capped_by_income_share() {
        let txs = vec![Transaction::expense("1", 3_000.0, "Rent", date(2026, 3, 1))];

        // average 1000, 15% of 2000 income is 300
        let rec = fallback_recommendation(&txs, 2_000.0, date(2026, 3, 31), &settings());
        assert!((rec.category("Rent").unwrap().suggested_amount - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_ignores_income_and_old_transactions() {
        let txs = vec![
            Transaction::expense("1", 300.0, "Food", date(2026, 3, 1)),
            Transaction::income("2", 9_000.0, "Salary", date(2026, 3, 1)),
            Transaction::expense("3", 5_000.0, "Travel", date(2025, 6, 1)),
        ];

        let rec = fallback_recommendation(&txs, 10_000.0, date(2026, 3, 31), &settings());
        assert_eq!(rec.categories.len(), 1);
        assert_eq!(rec.categories[0].category, "Food");
    }

    #[test]
    fn test_ordered_by_amount_then_name() {
        let txs = vec![
            Transaction::expense("1", 300.0, "Books", date(2026, 3, 1)),
            Transaction::expense("2", 900.0, "Rent", date(2026, 3, 1)),
            Transaction::expense("3", 300.0, "Apps", date(2026, 3, 1)),
        ];

        let rec = fallback_recommendation(&txs, 100_000.0, date(2026, 3, 31), &settings());
        let names: Vec<&str> = rec.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Apps", "Books"]);
    }

    #[test]
    fn test_empty_history_is_all_zero() {
        let rec = fallback_recommendation(&[], 4_000.0, date(2026, 3, 31), &settings());
        assert!(rec.categories.is_empty());
        assert_eq!(rec.total_budget, 0.0);
        assert_eq!(rec.emergency_fund, 0.0);
        assert_eq!(rec.savings_rate, 20.0);
        assert_eq!(rec.insights.len(), 4);
    }

    #[test]
    fn test_negative_income_does_not_produce_negative_amounts() {
        let txs = vec![Transaction::expense("1", 300.0, "Food", date(2026, 3, 1))];
        let rec = fallback_recommendation(&txs, -50.0, date(2026, 3, 31), &settings());
        assert_eq!(rec.categories[0].suggested_amount, 0.0);
    }
}
