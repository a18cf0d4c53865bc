//! Category and month aggregation of transactions

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{MonthlyBreakdown, PeriodStats, Transaction, TransactionKind};

/// Calendar month key (`YYYY-MM`) for a date
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn in_window(tx: &Transaction, start: NaiveDate, end: NaiveDate) -> bool {
    tx.date >= start && tx.date < end
}

/// Summarize the half-open window `[start, end)`
///
/// Category totals only count expenses. Categories with no expense in the
/// window are absent rather than zero.
pub fn aggregate_period(
    transactions: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> PeriodStats {
    let mut stats = PeriodStats::default();

    for tx in transactions.iter().filter(|tx| in_window(tx, start, end)) {
        match tx.kind {
            TransactionKind::Expense => {
                *stats
                    .category_totals
                    .entry(tx.category.clone())
                    .or_insert(0.0) += tx.amount;
                stats.total_expenses += tx.amount;
                stats.transaction_count += 1;
            }
            TransactionKind::Income => stats.total_income += tx.amount,
        }
    }

    if stats.transaction_count > 0 {
        stats.average_transaction_amount = stats.total_expenses / stats.transaction_count as f64;
    }

    stats
}

/// Expense totals per calendar month and category inside `[start, end)`
pub fn monthly_breakdown(
    transactions: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> MonthlyBreakdown {
    let mut months: MonthlyBreakdown = BTreeMap::new();

    for tx in transactions
        .iter()
        .filter(|tx| tx.is_expense() && in_window(tx, start, end))
    {
        *months
            .entry(month_key(tx.date))
            .or_default()
            .entry(tx.category.clone())
            .or_insert(0.0) += tx.amount;
    }

    months
}

/// Divide each category total by the number of months it covers
pub fn monthly_averages(totals: &BTreeMap<String, f64>, months: u32) -> BTreeMap<String, f64> {
    let months = f64::from(months.max(1));
    totals
        .iter()
        .map(|(category, total)| (category.clone(), total / months))
        .collect()
}
