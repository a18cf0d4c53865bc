//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use smartspend_core::{
    analyze_spending, AnalysisWindows, BudgetAdvice, BudgetRecommendation,
    CategoryRecommendation, Error, FallbackReason, Provenance, Trend,
};
use tempfile::TempDir;

use crate::commands::{self, core, truncate, RecommendOptions};

const HISTORY_CSV: &str = "\
id,date,amount,category,kind
t1,2026-01-10,100.00,Food,expense
t2,2026-02-10,100.00,Food,expense
t3,2026-03-10,100.00,Food,expense
t4,2026-03-01,5000.00,Salary,income
t5,2025-11-10,50.00,Food,expense
";

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()
}

fn write_history(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("transactions.csv");
    fs::write(&path, HISTORY_CSV).unwrap();
    path
}

const INVALID_JSON: &str = r#"[
    {"id": "a", "amount": -500.0, "category": "Food", "date": "2026-03-01", "kind": "expense"},
    {"id": "a", "amount": 100.0, "category": "Food", "date": "2026-02-01", "kind": "expense"}
]"#;

fn write_invalid(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("transactions.json");
    fs::write(&path, INVALID_JSON).unwrap();
    path
}

fn is_invalid_input(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<Error>(), Some(Error::InvalidInput(_)))
}

fn sample_advice(provenance: Provenance) -> BudgetAdvice {
    BudgetAdvice::new(
        BudgetRecommendation {
            total_budget: 330.0,
            categories: vec![CategoryRecommendation {
                category: "Groceries and household supplies".to_string(),
                suggested_amount: 330.0,
                confidence: 70.0,
                reasoning: "Based on recent spending".to_string(),
                trend: Trend::Increasing,
                seasonal_factor: 1.0,
            }],
            savings_rate: 20.0,
            emergency_fund: 990.0,
            insights: vec!["Track spending weekly".to_string()],
        },
        provenance,
    )
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Food", 10), "Food");
    assert_eq!(truncate("Entertainment", 8), "Enter...");
    assert_eq!(truncate("Café crème", 7), "Café...");
}

#[test]
fn test_resolve_as_of_keeps_explicit_date() {
    assert_eq!(core::resolve_as_of(Some(as_of())), as_of());
}

#[test]
fn test_load_config_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = core::load_config(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config.policy.max_budget_ratio, 0.8);
}

#[test]
fn test_load_config_invalid_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("advisor.toml");
    fs::write(&path, "[policy\nmax_budget_ratio = ").unwrap();

    let err = core::load_config(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("Failed to load config"));
}

#[test]
fn test_read_transactions_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = core::read_transactions(&dir.path().join("missing.csv")).unwrap_err();
    assert!(err.to_string().contains("missing.csv"));
}

// ========== Recommend Command Tests ==========

#[tokio::test]
async fn test_cmd_recommend_offline() {
    let dir = TempDir::new().unwrap();
    let file = write_history(&dir);
    let options = RecommendOptions {
        income: 5000.0,
        currency: "USD".to_string(),
        as_of: Some(as_of()),
        offline: true,
        model: None,
        json: false,
    };

    let result = commands::cmd_recommend(None, &file, &options).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_recommend_offline_json() {
    let dir = TempDir::new().unwrap();
    let file = write_history(&dir);
    let options = RecommendOptions {
        income: 5000.0,
        currency: "USD".to_string(),
        as_of: Some(as_of()),
        offline: true,
        model: None,
        json: true,
    };

    assert!(commands::cmd_recommend(None, &file, &options).await.is_ok());
}

#[tokio::test]
async fn test_cmd_recommend_rejects_invalid_income() {
    let dir = TempDir::new().unwrap();
    let file = write_history(&dir);
    let options = RecommendOptions {
        income: f64::NAN,
        currency: "USD".to_string(),
        as_of: Some(as_of()),
        offline: true,
        model: None,
        json: false,
    };

    let err = commands::cmd_recommend(None, &file, &options)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid recommendation request"));
}

#[test]
fn test_render_advice_fallback() {
    let advice = sample_advice(Provenance::Fallback {
        reason: FallbackReason::NoBackend,
    });
    let output = commands::render_advice(&advice, "USD");

    assert!(output.contains("Monthly budget: 330.00 USD"));
    assert!(output.contains("local fallback (no_backend)"));
    assert!(output.contains("Groceries and hou..."));
    assert!(output.contains("increasing"));
    assert!(output.contains("Savings rate: 20.0%"));
    assert!(output.contains("Emergency fund: 990.00 USD"));
    assert!(output.contains("• Track spending weekly"));
}

#[test]
fn test_render_advice_ai() {
    let advice = sample_advice(Provenance::Ai {
        model: "llama-3.3-70b-versatile".to_string(),
    });
    let output = commands::render_advice(&advice, "EUR");
    assert!(output.contains("completion service (llama-3.3-70b-versatile)"));
}

#[test]
fn test_render_advice_without_categories() {
    let mut advice = sample_advice(Provenance::Fallback {
        reason: FallbackReason::Timeout,
    });
    advice.recommendation.categories.clear();

    let output = commands::render_advice(&advice, "USD");
    assert!(output.contains("No spending recorded"));
    assert!(!output.contains("CATEGORY"));
}

// ========== Analyze Command Tests ==========

#[test]
fn test_cmd_analyze() {
    let dir = TempDir::new().unwrap();
    let file = write_history(&dir);
    assert!(commands::cmd_analyze(None, &file, Some(as_of()), false).is_ok());
    assert!(commands::cmd_analyze(None, &file, Some(as_of()), true).is_ok());
}

#[test]
fn test_cmd_analyze_rejects_invalid_transactions() {
    let dir = TempDir::new().unwrap();
    let file = write_invalid(&dir);

    let err = commands::cmd_analyze(None, &file, Some(as_of()), false).unwrap_err();
    assert!(is_invalid_input(&err), "{:#}", err);
    assert!(err.to_string().contains("Invalid transactions"));
}

#[test]
fn test_render_stats() {
    let dir = TempDir::new().unwrap();
    let file = write_history(&dir);
    let transactions = core::read_transactions(&file).unwrap();

    let stats = analyze_spending(&transactions, as_of(), 10.0);
    let output = commands::render_stats(&stats, &AnalysisWindows::ending_on(as_of()));

    assert!(output.contains("Expenses: 300.00 over 3 transactions"));
    assert!(output.contains("income 5000.00"));
    assert!(output.contains("Food"));
    assert!(output.contains("increasing"));
    assert!(output.contains("Monthly breakdown:"));
    assert!(output.contains("2026-01"));
    assert!(!output.contains("Salary"));
}

#[test]
fn test_render_stats_empty() {
    let stats = analyze_spending(&[], as_of(), 10.0);
    let output = commands::render_stats(&stats, &AnalysisWindows::ending_on(as_of()));
    assert!(output.contains("No expenses in either window."));
}

#[test]
fn test_cmd_prompt() {
    let dir = TempDir::new().unwrap();
    let file = write_history(&dir);
    assert!(commands::cmd_prompt(None, &file, 5000.0, "USD", Some(as_of())).is_ok());
}

#[test]
fn test_cmd_prompt_rejects_invalid_input() {
    let dir = TempDir::new().unwrap();

    let invalid = write_invalid(&dir);
    let err = commands::cmd_prompt(None, &invalid, 5000.0, "USD", Some(as_of())).unwrap_err();
    assert!(is_invalid_input(&err), "{:#}", err);

    let valid = write_history(&dir);
    let err = commands::cmd_prompt(None, &valid, -1000.0, "USD", Some(as_of())).unwrap_err();
    assert!(is_invalid_input(&err), "{:#}", err);
    assert!(err.to_string().contains("Invalid prompt request"));
}

// ========== Prompts Command Tests ==========

#[test]
fn test_cmd_prompts_list() {
    assert!(commands::cmd_prompts_list().is_ok());
}

#[test]
fn test_cmd_prompts_show() {
    assert!(commands::cmd_prompts_show("budget_recommendation").is_ok());
}

#[test]
fn test_cmd_prompts_show_unknown() {
    let err = commands::cmd_prompts_show("no_such_prompt").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Unknown prompt ID: no_such_prompt"));
    assert!(message.contains("budget_recommendation"));
}

#[test]
fn test_cmd_prompts_path() {
    assert!(commands::cmd_prompts_path().is_ok());
}
