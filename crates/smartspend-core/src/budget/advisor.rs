//! Budget advisor pipeline
//!
//! Runs one recommendation request through analysis, prompt composition, a
//! single bounded completion call, strict parsing and policy validation.
//! Any failure along the completion path switches to the local fallback, so
//! [`BudgetAdvisor::recommend`] always returns advice.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::ai::{parse_budget_recommendation, AIBackend, AIClient, CompletionRequest};
use crate::analysis::analyze_spending;
use crate::composer::PromptComposer;
use crate::config::AdvisorConfig;
use crate::error::{Error, Result};
use crate::models::{
    BudgetAdvice, BudgetRecommendation, FallbackReason, Provenance, SpendingStats, Transaction,
};
use crate::prompts::PromptLibrary;
use crate::throttle::{CallGate, CallOutcome, GateChain};

use super::{fallback_recommendation, validate};

/// Reject blank ids, negative or non-finite amounts and duplicate ids
pub fn validate_transactions(transactions: &[Transaction]) -> Result<()> {
    let mut seen = HashSet::with_capacity(transactions.len());
    for tx in transactions {
        if tx.id.trim().is_empty() {
            return Err(Error::InvalidInput("transaction id must not be empty".into()));
        }
        if !tx.amount.is_finite() || tx.amount < 0.0 {
            return Err(Error::InvalidInput(format!(
                "transaction {} has invalid amount {}",
                tx.id, tx.amount
            )));
        }
        if !seen.insert(tx.id.as_str()) {
            return Err(Error::InvalidInput(format!(
                "duplicate transaction id {}",
                tx.id
            )));
        }
    }
    Ok(())
}

/// A validated recommendation request
#[derive(Debug, Clone)]
pub struct BudgetRequest {
    transactions: Vec<Transaction>,
    monthly_income: f64,
    currency: String,
    as_of: NaiveDate,
}

impl BudgetRequest {
    /// Validate input and build a request dated today
    pub fn new(
        transactions: Vec<Transaction>,
        monthly_income: f64,
        currency: impl Into<String>,
    ) -> Result<Self> {
        let currency = currency.into().trim().to_string();

        if !monthly_income.is_finite() || monthly_income < 0.0 {
            return Err(Error::InvalidInput(format!(
                "monthly income must be a non-negative number, got {}",
                monthly_income
            )));
        }
        if currency.is_empty() {
            return Err(Error::InvalidInput("currency must not be empty".into()));
        }

        validate_transactions(&transactions)?;

        Ok(Self {
            transactions,
            monthly_income,
            currency,
            as_of: Local::now().date_naive(),
        })
    }

    /// Analyze as of another date instead of today
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn monthly_income(&self) -> f64 {
        self.monthly_income
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }
}

/// Pipeline stage, logged on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdvisorState {
    Idle,
    Aggregating,
    Composing,
    AwaitingCompletion,
    Validating,
    Fallback,
    Done,
}

impl fmt::Display for AdvisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Aggregating => "aggregating",
            Self::Composing => "composing",
            Self::AwaitingCompletion => "awaiting_completion",
            Self::Validating => "validating",
            Self::Fallback => "fallback",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

fn transition(state: &mut AdvisorState, next: AdvisorState) {
    debug!(from = %state, to = %next, "Advisor state");
    *state = next;
}

fn fallback_reason(err: &Error) -> FallbackReason {
    match err {
        Error::Timeout(_) => FallbackReason::Timeout,
        Error::MalformedRecommendation(_) | Error::Json(_) => {
            FallbackReason::MalformedRecommendation
        }
        _ => FallbackReason::CompletionUnavailable,
    }
}

/// Produces budget advice for requests
pub struct BudgetAdvisor {
    config: AdvisorConfig,
    client: Option<AIClient>,
    gate: Option<Arc<dyn CallGate>>,
    composer: Mutex<PromptComposer>,
}

impl BudgetAdvisor {
    /// Advisor with the given backend, no call gate and the default prompt library
    pub fn new(config: AdvisorConfig, client: Option<AIClient>) -> Self {
        let composer = PromptComposer::new(PromptLibrary::new(), config.policy.clone());
        Self {
            config,
            client,
            gate: None,
            composer: Mutex::new(composer),
        }
    }

    /// Backend from the environment, gates from the throttle settings
    pub fn from_env(config: AdvisorConfig) -> Self {
        let gate = GateChain::from_settings(&config.throttle);
        Self::new(config, AIClient::from_env()).with_gate(Arc::new(gate))
    }

    pub fn with_gate(mut self, gate: Arc<dyn CallGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Switch the backend to another model, keeping host and credentials
    pub fn with_model(mut self, model: &str) -> Self {
        self.client = self.client.map(|client| client.with_model(model));
        self
    }

    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.composer = Mutex::new(PromptComposer::new(prompts, self.config.policy.clone()));
        self
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn client(&self) -> Option<&AIClient> {
        self.client.as_ref()
    }

    /// Produce advice for a request; never fails
    pub async fn recommend(&self, request: &BudgetRequest) -> BudgetAdvice {
        let mut state = AdvisorState::Idle;

        transition(&mut state, AdvisorState::Aggregating);
        let stats = analyze_spending(
            request.transactions(),
            request.as_of(),
            self.config.policy.trend_threshold_pct,
        );

        let (candidate, provenance) = match self.ask_completion(request, &stats, &mut state).await {
            Ok((recommendation, model)) => {
                info!(model = %model, "Recommendation from completion service");
                (recommendation, Provenance::Ai { model })
            }
            Err(reason) => {
                transition(&mut state, AdvisorState::Fallback);
                warn!(reason = %reason, "Using local fallback recommendation");
                let recommendation = fallback_recommendation(
                    request.transactions(),
                    request.monthly_income(),
                    request.as_of(),
                    &self.config.fallback,
                );
                (recommendation, Provenance::Fallback { reason })
            }
        };

        let recommendation = validate(candidate, request.monthly_income(), &self.config.policy);
        transition(&mut state, AdvisorState::Done);

        BudgetAdvice::new(recommendation, provenance)
    }

    async fn ask_completion(
        &self,
        request: &BudgetRequest,
        stats: &SpendingStats,
        state: &mut AdvisorState,
    ) -> std::result::Result<(BudgetRecommendation, String), FallbackReason> {
        let client = self.client.as_ref().ok_or(FallbackReason::NoBackend)?;

        transition(state, AdvisorState::Composing);
        let prompt = {
            let mut composer = self
                .composer
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            composer
                .compose(stats, request.monthly_income(), request.currency())
                .map_err(|e| {
                    warn!(error = %e, "Prompt composition failed");
                    FallbackReason::CompletionUnavailable
                })?
        };

        if let Some(gate) = &self.gate {
            if !gate.try_acquire() {
                return Err(FallbackReason::Throttled);
            }
        }

        transition(state, AdvisorState::AwaitingCompletion);
        let settings = &self.config.completion;
        let completion = CompletionRequest::from_prompt(&prompt, settings);
        let call = client.complete(&completion);
        let text = match tokio::time::timeout(settings.timeout, call).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(error = %e, host = %client.host(), "Completion call failed");
                self.record(CallOutcome::Failure);
                return Err(fallback_reason(&e));
            }
            Err(_) => {
                let e = Error::Timeout(settings.timeout.as_secs());
                warn!(error = %e, host = %client.host(), "Completion call failed");
                self.record(CallOutcome::Timeout);
                return Err(fallback_reason(&e));
            }
        };
        debug!(response = %text, "Raw completion");

        transition(state, AdvisorState::Validating);
        match parse_budget_recommendation(&text) {
            Ok(recommendation) => {
                self.record(CallOutcome::Success);
                Ok((recommendation, client.model().to_string()))
            }
            Err(e) => {
                warn!(error = %e, "Completion rejected");
                self.record(CallOutcome::Failure);
                Err(fallback_reason(&e))
            }
        }
    }

    fn record(&self, outcome: CallOutcome) {
        if let Some(gate) = &self.gate {
            gate.record_call(outcome);
        }
    }
}

/// One-shot recommendation with config and backend taken from the environment
///
/// Only input validation can fail; every valid request gets advice.
pub async fn compute_budget_recommendation(
    transactions: Vec<Transaction>,
    monthly_income: f64,
    currency: &str,
) -> Result<BudgetAdvice> {
    let request = BudgetRequest::new(transactions, monthly_income, currency)?;
    let config = AdvisorConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable advisor config");
        AdvisorConfig::default()
    });

    Ok(BudgetAdvisor::from_env(config).recommend(&request).await)
}
