//! SmartSpend Core Library
//!
//! Transaction-pattern analysis and budget recommendation:
//! - Category and monthly aggregation, trend and seasonal analysis
//! - Prompt library and composer for the completion service
//! - Pluggable completion backends (Groq and other OpenAI-compatible servers)
//! - Budget-safety validator and local fallback recommender
//! - Call gates (rate limit, circuit breaker) for the completion service
//! - Advisor configuration and transaction import

pub mod ai;
pub mod analysis;
pub mod budget;
pub mod composer;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod prompts;
pub mod throttle;

/// Test utilities including mock completion server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, CompletionRequest, MockBackend, OpenAICompatibleBackend};
pub use analysis::{analyze_spending, AnalysisWindows};
pub use budget::{
    compute_budget_recommendation, fallback_recommendation, validate, validate_transactions,
    BudgetAdvisor, BudgetRequest,
};
pub use composer::{ComposedPrompt, PromptComposer};
pub use config::{
    AdvisorConfig, BudgetPolicy, CompletionSettings, FallbackSettings, ThrottleSettings,
};
pub use error::{Error, Result};
pub use import::{load_transactions, ImportFormat};
pub use models::{
    BudgetAdvice, BudgetRecommendation, CategoryRecommendation, CategoryTrend, FallbackReason,
    MonthlyBreakdown, PeriodStats, Provenance, SpendingStats, Transaction, TransactionKind,
    Trend,
};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use throttle::{CallGate, CallOutcome, GateChain, RateLimiter, ResourceMonitor};
