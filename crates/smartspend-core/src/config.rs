//! Advisor configuration
//!
//! Covers the completion call budget, the budget-safety policy, the fallback
//! heuristic constants and the throttle limits.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/smartspend/config/advisor.toml)
//!    or an explicit path
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/advisor.toml");

/// Limits for the single completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            temperature: 0.3,
            max_tokens: 2000,
        }
    }
}

/// Budget-safety invariants enforced on every returned recommendation
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetPolicy {
    /// `total_budget <= monthly_income * max_budget_ratio`
    pub max_budget_ratio: f64,
    /// `savings_rate >= min_savings_rate` (percent)
    pub min_savings_rate: f64,
    /// `emergency_fund >= total_budget * emergency_fund_months`
    pub emergency_fund_months: f64,
    /// `|percent_change| < trend_threshold_pct` means stable
    pub trend_threshold_pct: f64,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            max_budget_ratio: 0.8,
            min_savings_rate: 10.0,
            emergency_fund_months: 3.0,
            trend_threshold_pct: 10.0,
        }
    }
}

/// Constants of the local fallback heuristic
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackSettings {
    pub growth_allowance: f64,
    pub category_income_cap: f64,
    pub confidence: f64,
    pub savings_rate: f64,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            growth_allowance: 1.1,
            category_income_cap: 0.15,
            confidence: 70.0,
            savings_rate: 20.0,
        }
    }
}

/// Limits for the injected call gates
#[derive(Debug, Clone, PartialEq)]
pub struct ThrottleSettings {
    pub max_calls: usize,
    pub window: Duration,
    pub failure_threshold: u32,
    pub recovery_wait: Duration,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            max_calls: 10,
            window: Duration::from_secs(60),
            failure_threshold: 3,
            recovery_wait: Duration::from_secs(300),
        }
    }
}

/// Full advisor configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvisorConfig {
    pub completion: CompletionSettings,
    pub policy: BudgetPolicy,
    pub fallback: FallbackSettings,
    pub throttle: ThrottleSettings,
}

impl AdvisorConfig {
    /// Load from the default override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit path (embedded defaults if the file does not exist)
    pub fn from_path(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse config from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("smartspend").join("config").join("advisor.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<AdvisorConfig> {
    let path = match override_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let content = match path {
        Some(ref path) if path.exists() => {
            tracing::debug!(path = %path.display(), "Loading advisor config override");
            fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?
        }
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    completion: Option<RawCompletion>,
    policy: Option<RawPolicy>,
    fallback: Option<RawFallback>,
    throttle: Option<RawThrottle>,
}

#[derive(Debug, Deserialize)]
struct RawCompletion {
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawPolicy {
    max_budget_ratio: Option<f64>,
    min_savings_rate: Option<f64>,
    emergency_fund_months: Option<f64>,
    trend_threshold_pct: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawFallback {
    growth_allowance: Option<f64>,
    category_income_cap: Option<f64>,
    confidence: Option<f64>,
    savings_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawThrottle {
    max_calls: Option<usize>,
    window_secs: Option<u64>,
    failure_threshold: Option<u32>,
    recovery_wait_secs: Option<u64>,
}

fn parse_config(content: &str) -> Result<AdvisorConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AdvisorConfig::default();

    if let Some(completion) = raw.completion {
        if let Some(secs) = completion.timeout_secs {
            config.completion.timeout = Duration::from_secs(secs);
        }
        if let Some(temperature) = completion.temperature {
            config.completion.temperature = temperature;
        }
        if let Some(max_tokens) = completion.max_tokens {
            config.completion.max_tokens = max_tokens;
        }
    }

    if let Some(policy) = raw.policy {
        if let Some(ratio) = policy.max_budget_ratio {
            config.policy.max_budget_ratio = ratio;
        }
        if let Some(rate) = policy.min_savings_rate {
            config.policy.min_savings_rate = rate;
        }
        if let Some(months) = policy.emergency_fund_months {
            config.policy.emergency_fund_months = months;
        }
        if let Some(threshold) = policy.trend_threshold_pct {
            config.policy.trend_threshold_pct = threshold;
        }
    }

    if let Some(fallback) = raw.fallback {
        if let Some(growth) = fallback.growth_allowance {
            config.fallback.growth_allowance = growth;
        }
        if let Some(cap) = fallback.category_income_cap {
            config.fallback.category_income_cap = cap;
        }
        if let Some(confidence) = fallback.confidence {
            config.fallback.confidence = confidence;
        }
        if let Some(rate) = fallback.savings_rate {
            config.fallback.savings_rate = rate;
        }
    }

    if let Some(throttle) = raw.throttle {
        if let Some(max_calls) = throttle.max_calls {
            config.throttle.max_calls = max_calls;
        }
        if let Some(secs) = throttle.window_secs {
            config.throttle.window = Duration::from_secs(secs);
        }
        if let Some(threshold) = throttle.failure_threshold {
            config.throttle.failure_threshold = threshold;
        }
        if let Some(secs) = throttle.recovery_wait_secs {
            config.throttle.recovery_wait = Duration::from_secs(secs);
        }
    }

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &AdvisorConfig) -> Result<()> {
    let policy = &config.policy;
    if !(policy.max_budget_ratio > 0.0 && policy.max_budget_ratio <= 1.0) {
        return Err(Error::Config(format!(
            "policy.max_budget_ratio must be in (0, 1], got {}",
            policy.max_budget_ratio
        )));
    }
    if !(0.0..=100.0).contains(&policy.min_savings_rate) {
        return Err(Error::Config(format!(
            "policy.min_savings_rate must be a percentage, got {}",
            policy.min_savings_rate
        )));
    }
    if policy.emergency_fund_months < 0.0 || policy.trend_threshold_pct < 0.0 {
        return Err(Error::Config(
            "policy values must not be negative".to_string(),
        ));
    }
    if config.completion.timeout.is_zero() {
        return Err(Error::Config(
            "completion.timeout_secs must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AdvisorConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = AdvisorConfig::from_toml(
            r#"
[policy]
max_budget_ratio = 0.7

[completion]
timeout_secs = 5
"#,
        )
        .unwrap();

        assert_eq!(config.policy.max_budget_ratio, 0.7);
        assert_eq!(config.policy.min_savings_rate, 10.0);
        assert_eq!(config.completion.timeout, Duration::from_secs(5));
        assert_eq!(config.completion.max_tokens, 2000);
        assert_eq!(config.fallback, FallbackSettings::default());
    }

    #[test]
    fn test_unknown_sections_ignored() {
        let config = AdvisorConfig::from_toml("[experimental]\nfoo = 1\n").unwrap();
        assert_eq!(config, AdvisorConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let result = AdvisorConfig::from_toml("[policy\nmax_budget_ratio = ");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_out_of_range_ratio_rejected() {
        let result = AdvisorConfig::from_toml("[policy]\nmax_budget_ratio = 1.5\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[throttle]\nmax_calls = 2\nwindow_secs = 1").unwrap();

        let config = AdvisorConfig::from_path(file.path()).unwrap();
        assert_eq!(config.throttle.max_calls, 2);
        assert_eq!(config.throttle.window, Duration::from_secs(1));
    }

    #[test]
    fn test_from_missing_path_uses_defaults() {
        let config = AdvisorConfig::from_path(Path::new("/nonexistent/advisor.toml")).unwrap();
        assert_eq!(config, AdvisorConfig::default());
    }
}
