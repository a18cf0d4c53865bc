//! JSON parsing helpers for AI backend responses
//!
//! Models often wrap the JSON payload in prose or code fences. The payload is
//! cut out of the response and then parsed strictly: a missing field, a wrong
//! type or a nonsensical number rejects the whole recommendation.

use crate::error::{Error, Result};
use crate::models::BudgetRecommendation;

/// Longest raw excerpt kept in error messages
const MAX_EXCERPT: usize = 200;

fn excerpt(text: &str) -> String {
    if text.len() <= MAX_EXCERPT {
        return text.to_string();
    }
    let mut end = MAX_EXCERPT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Slice from the first `{` to the last `}`
fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

/// Parse a budget recommendation from an AI response
pub fn parse_budget_recommendation(response: &str) -> Result<BudgetRecommendation> {
    let response = response.trim();

    let json_str = extract_json_object(response).ok_or_else(|| {
        Error::MalformedRecommendation(format!(
            "No JSON found in AI response | Raw: {}",
            excerpt(response)
        ))
    })?;

    let recommendation: BudgetRecommendation = serde_json::from_str(json_str).map_err(|e| {
        Error::MalformedRecommendation(format!(
            "Invalid JSON from AI: {} | Raw: {}",
            e,
            excerpt(json_str)
        ))
    })?;

    check_values(&recommendation)?;
    Ok(recommendation)
}

/// Reject values that deserialize fine but cannot be a budget
fn check_values(rec: &BudgetRecommendation) -> Result<()> {
    let money = [
        ("totalBudget", rec.total_budget),
        ("savingsRate", rec.savings_rate),
        ("emergencyFund", rec.emergency_fund),
    ];
    for (field, value) in money {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::MalformedRecommendation(format!(
                "{} must be a non-negative number, got {}",
                field, value
            )));
        }
    }

    for category in &rec.categories {
        if category.category.trim().is_empty() {
            return Err(Error::MalformedRecommendation(
                "category name must not be empty".to_string(),
            ));
        }
        if !category.suggested_amount.is_finite() || category.suggested_amount < 0.0 {
            return Err(Error::MalformedRecommendation(format!(
                "suggestedAmount for {} must be a non-negative number",
                category.category
            )));
        }
        if !category.confidence.is_finite() || !category.seasonal_factor.is_finite() {
            return Err(Error::MalformedRecommendation(format!(
                "confidence and seasonalFactor for {} must be numbers",
                category.category
            )));
        }
    }

    Ok(())
}
