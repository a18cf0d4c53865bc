//! Budget-safety enforcement
//!
//! Every recommendation leaving the advisor passes through [`validate`],
//! whether the completion service wrote it or the fallback computed it.
//! Violations are clamped, never rejected.

use tracing::info;

use crate::analysis::trends::clamp_seasonal_factor;
use crate::config::BudgetPolicy;
use crate::models::BudgetRecommendation;

use super::non_negative;

/// Confidence scores are percentages
pub const CONFIDENCE_RANGE: (f64, f64) = (0.0, 100.0);

/// Clamp a candidate recommendation into the budget policy
///
/// 1. `total_budget` is capped at `monthly_income * max_budget_ratio`;
///    category amounts shrink by the same factor.
/// 2. `savings_rate` is raised to `min_savings_rate`.
/// 3. `emergency_fund` is raised to `total_budget * emergency_fund_months`.
/// 4. Confidence and seasonal factor are clamped into their ranges.
///
/// Applying it twice gives the same result as applying it once.
pub fn validate(
    mut candidate: BudgetRecommendation,
    monthly_income: f64,
    policy: &BudgetPolicy,
) -> BudgetRecommendation {
    // NaN and negatives cannot be compared against the policy
    candidate.total_budget = non_negative(candidate.total_budget);
    candidate.savings_rate = non_negative(candidate.savings_rate);
    candidate.emergency_fund = non_negative(candidate.emergency_fund);
    for category in &mut candidate.categories {
        category.suggested_amount = non_negative(category.suggested_amount);
    }

    let max_budget = non_negative(monthly_income) * policy.max_budget_ratio;
    if candidate.total_budget > max_budget {
        let original = candidate.total_budget;
        let scale = max_budget / original;
        candidate.total_budget = max_budget;
        for category in &mut candidate.categories {
            category.suggested_amount *= scale;
        }
        info!(
            original = original,
            capped = max_budget,
            "Total budget exceeded income ratio, scaled categories down"
        );
    }

    if candidate.savings_rate < policy.min_savings_rate {
        info!(
            original = candidate.savings_rate,
            "Savings rate below minimum, raised"
        );
        candidate.savings_rate = policy.min_savings_rate;
    }

    let min_emergency = candidate.total_budget * policy.emergency_fund_months;
    if candidate.emergency_fund < min_emergency {
        info!(
            original = candidate.emergency_fund,
            required = min_emergency,
            "Emergency fund below required months, raised"
        );
        candidate.emergency_fund = min_emergency;
    }

    for category in &mut candidate.categories {
        category.confidence = if category.confidence.is_nan() {
            CONFIDENCE_RANGE.0
        } else {
            category
                .confidence
                .clamp(CONFIDENCE_RANGE.0, CONFIDENCE_RANGE.1)
        };
        category.seasonal_factor = clamp_seasonal_factor(category.seasonal_factor);
    }

    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryRecommendation, Trend};

    fn category(name: &str, amount: f64) -> CategoryRecommendation {
        CategoryRecommendation {
            category: name.to_string(),
            suggested_amount: amount,
            confidence: 80.0,
            reasoning: "test".to_string(),
            trend: Trend::Stable,
            seasonal_factor: 1.0,
        }
    }

    fn recommendation(total: f64, categories: Vec<CategoryRecommendation>) -> BudgetRecommendation {
        BudgetRecommendation {
            total_budget: total,
            categories,
            savings_rate: 20.0,
            emergency_fund: total * 3.0,
            insights: vec!["save more".to_string()],
        }
    }

    #[test]
    fn test_total_clamped_and_categories_scaled() {
        let candidate = recommendation(
            500_000.0,
            vec![category("Rent", 300_000.0), category("Food", 200_000.0)],
        );

        let result = validate(candidate, 400_000.0, &BudgetPolicy::default());

        assert_eq!(result.total_budget, 320_000.0);
        let rent = result.category("Rent").unwrap().suggested_amount;
        let food = result.category("Food").unwrap().suggested_amount;
        assert!((rent - 192_000.0).abs() < 1e-6);
        assert!((food - 128_000.0).abs() < 1e-6);
        assert!((rent + food - result.total_budget).abs() < 1e-6);
        assert!(result.emergency_fund >= result.total_budget * 3.0);
    }

    #[test]
    fn test_savings_rate_raised() {
        let mut candidate = recommendation(1_000.0, vec![]);
        candidate.savings_rate = 5.0;

        let result = validate(candidate, 10_000.0, &BudgetPolicy::default());
        assert_eq!(result.savings_rate, 10.0);
    }

    #[test]
    fn test_emergency_fund_raised() {
        let mut candidate = recommendation(50_000.0, vec![]);
        candidate.emergency_fund = 100.0;

        let result = validate(candidate, 100_000.0, &BudgetPolicy::default());
        assert_eq!(result.emergency_fund, 150_000.0);
    }

    #[test]
    fn test_confidence_and_seasonal_clamped() {
        let mut high = category("Travel", 100.0);
        high.confidence = 140.0;
        high.seasonal_factor = 7.5;
        let mut low = category("Gifts", 50.0);
        low.confidence = -3.0;
        low.seasonal_factor = 0.1;

        let result = validate(
            recommendation(150.0, vec![high, low]),
            10_000.0,
            &BudgetPolicy::default(),
        );

        let travel = result.category("Travel").unwrap();
        assert_eq!(travel.confidence, 100.0);
        assert_eq!(travel.seasonal_factor, 2.0);
        let gifts = result.category("Gifts").unwrap();
        assert_eq!(gifts.confidence, 0.0);
        assert_eq!(gifts.seasonal_factor, 0.5);
    }

    #[test]
    fn test_valid_input_unchanged() {
        let candidate = recommendation(2_000.0, vec![category("Food", 2_000.0)]);
        let result = validate(candidate.clone(), 5_000.0, &BudgetPolicy::default());
        assert_eq!(result, candidate);
    }

    #[test]
    fn test_idempotent_on_adversarial_input() {
        let mut wild = category("Food", f64::NAN);
        wild.confidence = f64::NAN;
        wild.seasonal_factor = f64::INFINITY;
        let candidate = BudgetRecommendation {
            total_budget: 9e12,
            categories: vec![wild, category("Rent", 4e12)],
            savings_rate: -40.0,
            emergency_fund: f64::NEG_INFINITY,
            insights: vec![],
        };

        let once = validate(candidate, 3_000.0, &BudgetPolicy::default());
        let twice = validate(once.clone(), 3_000.0, &BudgetPolicy::default());

        assert_eq!(once, twice);
        assert!(once.total_budget <= 3_000.0 * 0.8);
        assert!(once.savings_rate >= 10.0);
        assert!(once.emergency_fund >= once.total_budget * 3.0);
        for c in &once.categories {
            assert!(c.suggested_amount.is_finite() && c.suggested_amount >= 0.0);
            assert!((0.0..=100.0).contains(&c.confidence));
            assert!((0.5..=2.0).contains(&c.seasonal_factor));
        }
    }

    #[test]
    fn test_zero_income_zeroes_budget() {
        let candidate = recommendation(500.0, vec![category("Food", 500.0)]);
        let result = validate(candidate, 0.0, &BudgetPolicy::default());
        assert_eq!(result.total_budget, 0.0);
        assert_eq!(result.categories[0].suggested_amount, 0.0);
    }
}
