//! Domain models for SmartSpend

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a money movement. Amounts are always non-negative; the sign lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user transaction, owned by the caller and read-only here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn expense(
        id: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            amount,
            category: category.into(),
            date,
            kind: TransactionKind::Expense,
        }
    }

    pub fn income(
        id: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            amount,
            category: category.into(),
            date,
            kind: TransactionKind::Income,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}

/// Spending trajectory of a category between two windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    #[serde(alias = "Increasing", alias = "INCREASING")]
    Increasing,
    #[serde(alias = "Decreasing", alias = "DECREASING")]
    Decreasing,
    #[serde(alias = "Stable", alias = "STABLE")]
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trend classification for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTrend {
    pub category: String,
    pub direction: Trend,
    /// Signed percent change from the older window to the recent one
    pub percent_change: f64,
}

/// Expense summary of one date window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    /// Category -> summed expense amount
    pub category_totals: BTreeMap<String, f64>,
    /// Number of expense transactions in the window
    pub transaction_count: usize,
    /// Mean expense amount (0 for an empty window)
    pub average_transaction_amount: f64,
    pub total_expenses: f64,
    pub total_income: f64,
}

/// `YYYY-MM` -> category -> expense total
pub type MonthlyBreakdown = BTreeMap<String, BTreeMap<String, f64>>;

/// Statistics bundle fed to the prompt composer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingStats {
    /// Last 3 months
    pub recent: PeriodStats,
    /// The 3 months before `recent`
    pub older: PeriodStats,
    pub trends: Vec<CategoryTrend>,
    /// Month buckets inside the recent window
    pub monthly: MonthlyBreakdown,
    /// Category -> recent total / 3
    pub monthly_averages: BTreeMap<String, f64>,
    /// Category -> seasonal factor in [0.5, 2.0]
    pub seasonal_factors: BTreeMap<String, f64>,
}

impl SpendingStats {
    /// Trend for a category, if it appears in either window
    pub fn trend_for(&self, category: &str) -> Option<&CategoryTrend> {
        self.trends.iter().find(|t| t.category == category)
    }
}

/// Suggested budget for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecommendation {
    pub category: String,
    pub suggested_amount: f64,
    /// 0-100
    pub confidence: f64,
    pub reasoning: String,
    pub trend: Trend,
    /// 0.5-2.0
    pub seasonal_factor: f64,
}

/// Budget recommendation, either parsed from the completion service or computed locally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRecommendation {
    pub total_budget: f64,
    pub categories: Vec<CategoryRecommendation>,
    /// Percentage of income
    pub savings_rate: f64,
    pub emergency_fund: f64,
    pub insights: Vec<String>,
}

impl BudgetRecommendation {
    /// Look up a category recommendation by name
    pub fn category(&self, name: &str) -> Option<&CategoryRecommendation> {
        self.categories.iter().find(|c| c.category == name)
    }
}

/// Why the local fallback produced the recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// No completion backend is configured
    NoBackend,
    /// The call gate refused the call
    Throttled,
    /// Network, HTTP status or service error
    CompletionUnavailable,
    /// The completion did not finish within the configured timeout
    Timeout,
    /// The completion could not be parsed into a recommendation
    MalformedRecommendation,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoBackend => "no_backend",
            Self::Throttled => "throttled",
            Self::CompletionUnavailable => "completion_unavailable",
            Self::Timeout => "timeout",
            Self::MalformedRecommendation => "malformed_recommendation",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a recommendation came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    Ai { model: String },
    Fallback { reason: FallbackReason },
}

/// Result handed back to callers: always present, quality varies by provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetAdvice {
    pub recommendation: BudgetRecommendation,
    pub provenance: Provenance,
    pub generated_at: DateTime<Utc>,
}

impl BudgetAdvice {
    pub fn new(recommendation: BudgetRecommendation, provenance: Provenance) -> Self {
        Self {
            recommendation,
            provenance,
            generated_at: Utc::now(),
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self.provenance, Provenance::Ai { .. })
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self.provenance {
            Provenance::Fallback { reason } => Some(reason),
            Provenance::Ai { .. } => None,
        }
    }
}
