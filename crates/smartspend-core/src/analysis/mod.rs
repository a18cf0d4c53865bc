//! Transaction pattern analysis
//!
//! Builds the statistics bundle the prompt composer and the fallback work from:
//!
//! - **aggregate** - category totals per window and per calendar month
//! - **trends** - recent vs prior window classification, seasonal factors
//!
//! Everything here is pure and request-scoped.

pub mod aggregate;
pub mod trends;

pub use aggregate::{aggregate_period, month_key, monthly_averages, monthly_breakdown};
pub use trends::{calculate_trends, classify, seasonal_factor};

use chrono::{Months, NaiveDate};

use crate::models::{SpendingStats, Transaction};

/// Length of each comparison window
pub const WINDOW_MONTHS: u32 = 3;

/// The two adjacent half-open windows used for analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindows {
    /// Start of the older window (inclusive)
    pub older_start: NaiveDate,
    /// End of the older window, start of the recent window
    pub recent_start: NaiveDate,
    /// End of the recent window (exclusive, the day after `as_of`)
    pub recent_end: NaiveDate,
}

impl AnalysisWindows {
    /// Windows covering the 3 months up to and including `as_of`, and the 3 months before
    pub fn ending_on(as_of: NaiveDate) -> Self {
        let recent_start = months_before(as_of, WINDOW_MONTHS);
        let older_start = months_before(recent_start, WINDOW_MONTHS);
        let recent_end = as_of.succ_opt().unwrap_or(as_of);

        Self {
            older_start,
            recent_start,
            recent_end,
        }
    }
}

fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Build the full statistics bundle for transactions as of a date
pub fn analyze_spending(
    transactions: &[Transaction],
    as_of: NaiveDate,
    trend_threshold_pct: f64,
) -> SpendingStats {
    let windows = AnalysisWindows::ending_on(as_of);

    let recent = aggregate_period(transactions, windows.recent_start, windows.recent_end);
    let older = aggregate_period(transactions, windows.older_start, windows.recent_start);
    let trends = calculate_trends(
        &recent.category_totals,
        &older.category_totals,
        trend_threshold_pct,
    );
    let monthly = monthly_breakdown(transactions, windows.recent_start, windows.recent_end);
    let monthly_averages = monthly_averages(&recent.category_totals, WINDOW_MONTHS);
    let current_month = month_key(as_of);
    let seasonal_factors = monthly_averages
        .iter()
        .map(|(category, avg)| {
            let factor = seasonal_factor(&monthly, &current_month, category, *avg);
            (category.clone(), factor)
        })
        .collect();

    tracing::debug!(
        recent_categories = recent.category_totals.len(),
        older_categories = older.category_totals.len(),
        months = monthly.len(),
        "Spending analysis complete"
    );

    SpendingStats {
        recent,
        older,
        trends,
        monthly,
        monthly_averages,
        seasonal_factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trend;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_windows_ending_on() {
        let windows = AnalysisWindows::ending_on(date(2026, 3, 31));
        assert_eq!(windows.recent_start, date(2025, 12, 31));
        assert_eq!(windows.older_start, date(2025, 9, 30));
        assert_eq!(windows.recent_end, date(2026, 4, 1));
    }

    #[test]
    fn test_windows_clamp_month_end() {
        let windows = AnalysisWindows::ending_on(date(2026, 5, 31));
        // February has no 31st
        assert_eq!(windows.recent_start, date(2026, 2, 28));
    }

    #[test]
    fn test_analyze_spending() {
        let txs = vec![
            // older window
            Transaction::expense("o1", 100.0, "Food", date(2025, 11, 10)),
            Transaction::expense("o2", 50.0, "Fun", date(2025, 10, 10)),
            // recent window
            Transaction::expense("r1", 100.0, "Food", date(2026, 1, 10)),
            Transaction::expense("r2", 100.0, "Food", date(2026, 3, 10)),
            Transaction::expense("r3", 51.0, "Fun", date(2026, 2, 10)),
            Transaction::income("r4", 5000.0, "Salary", date(2026, 3, 1)),
            // too old
            Transaction::expense("x", 10_000.0, "Food", date(2024, 1, 1)),
        ];

        let stats = analyze_spending(&txs, date(2026, 3, 31), 10.0);

        assert_eq!(stats.recent.category_totals["Food"], 200.0);
        assert_eq!(stats.older.category_totals["Food"], 100.0);
        assert_eq!(stats.recent.total_income, 5000.0);

        let food = stats.trend_for("Food").unwrap();
        assert_eq!(food.direction, Trend::Increasing);
        assert!((food.percent_change - 100.0).abs() < 1e-9);
        assert_eq!(stats.trend_for("Fun").unwrap().direction, Trend::Stable);

        assert!((stats.monthly_averages["Food"] - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.monthly.len(), 3);
        assert!((stats.seasonal_factors["Food"] - 1.5).abs() < 1e-9);
        // Fun had nothing in the latest month
        assert_eq!(stats.seasonal_factors["Fun"], 0.5);
    }

    #[test]
    fn test_analyze_empty() {
        let stats = analyze_spending(&[], date(2026, 3, 31), 10.0);
        assert!(stats.trends.is_empty());
        assert!(stats.monthly.is_empty());
        assert!(stats.monthly_averages.is_empty());
        assert_eq!(stats.recent.total_expenses, 0.0);
    }
}
