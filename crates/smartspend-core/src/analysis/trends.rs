//! Trend classification between two windows
//!
//! A category is `stable` when its spending moved less than a fixed
//! percentage threshold. This is a policy knob, not a statistical test.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{CategoryTrend, MonthlyBreakdown, Trend};

/// Lower and upper bound of the seasonal factor
pub const SEASONAL_FACTOR_RANGE: (f64, f64) = (0.5, 2.0);

/// Classify one category given its recent and older totals
///
/// An older total of exactly zero means there is not enough history, so the
/// result is `stable` with a 0% change instead of an infinite increase.
pub fn classify(recent: f64, older: f64, threshold_pct: f64) -> (Trend, f64) {
    if older == 0.0 {
        return (Trend::Stable, 0.0);
    }

    let percent_change = (recent - older) / older * 100.0;
    let direction = if percent_change.abs() < threshold_pct {
        Trend::Stable
    } else if percent_change > 0.0 {
        Trend::Increasing
    } else {
        Trend::Decreasing
    };

    (direction, percent_change)
}

/// Trends for the union of categories present in either window, sorted by category
pub fn calculate_trends(
    recent: &BTreeMap<String, f64>,
    older: &BTreeMap<String, f64>,
    threshold_pct: f64,
) -> Vec<CategoryTrend> {
    let categories: BTreeSet<&String> = recent.keys().chain(older.keys()).collect();

    categories
        .into_iter()
        .map(|category| {
            let recent_total = recent.get(category).copied().unwrap_or(0.0);
            let older_total = older.get(category).copied().unwrap_or(0.0);
            let (direction, percent_change) = classify(recent_total, older_total, threshold_pct);
            CategoryTrend {
                category: category.clone(),
                direction,
                percent_change,
            }
        })
        .collect()
}

/// Ratio of `current_month` spending to the monthly average, clamped to [0.5, 2.0]
///
/// `current_month` is the `YYYY-MM` key of the analysis date. A month with no
/// spending in the category counts as zero.
pub fn seasonal_factor(
    monthly: &MonthlyBreakdown,
    current_month: &str,
    category: &str,
    monthly_average: f64,
) -> f64 {
    if monthly_average <= 0.0 {
        return 1.0;
    }

    let current = monthly
        .get(current_month)
        .and_then(|month| month.get(category))
        .copied()
        .unwrap_or(0.0);

    clamp_seasonal_factor(current / monthly_average)
}

pub fn clamp_seasonal_factor(factor: f64) -> f64 {
    if factor.is_nan() {
        return 1.0;
    }
    factor.clamp(SEASONAL_FACTOR_RANGE.0, SEASONAL_FACTOR_RANGE.1)
}
