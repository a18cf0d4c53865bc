//! Mock backend for testing
//!
//! Returns a canned completion without any network traffic. Tests can swap
//! the reply, make every call fail or slow it down past the timeout.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::CompletionRequest;
use super::AIBackend;

/// A well-formed recommendation for 5000/month with Food and Rent
pub const MOCK_RECOMMENDATION: &str = r#"{
  "totalBudget": 2400,
  "categories": [
    {"category": "Food", "suggestedAmount": 600, "confidence": 85, "reasoning": "Spending is steady month to month", "trend": "stable", "seasonalFactor": 1.0},
    {"category": "Rent", "suggestedAmount": 1800, "confidence": 95, "reasoning": "Fixed monthly cost", "trend": "stable", "seasonalFactor": 1.0}
  ],
  "savingsRate": 20,
  "emergencyFund": 7200,
  "insights": ["Rent is the largest fixed cost", "Food spending is under control", "Automate a monthly transfer to savings"]
}"#;

#[derive(Clone, Debug)]
enum MockReply {
    Text(String),
    Fail(String),
}

/// Mock AI backend for testing
#[derive(Clone, Debug)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    reply: MockReply,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy, returns [`MOCK_RECOMMENDATION`])
    pub fn new() -> Self {
        Self {
            healthy: true,
            reply: MockReply::Text(MOCK_RECOMMENDATION.to_string()),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Return this text for every completion
    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.reply = MockReply::Text(text.into());
        self
    }

    /// Fail every completion as unavailable
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.reply = MockReply::Fail(message.into());
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of completions requested so far, shared across clones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Fail(message) => Err(Error::CompletionUnavailable(message.clone())),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::parsing::parse_budget_recommendation;

    #[tokio::test]
    async fn test_default_reply_parses() {
        let mock = MockBackend::new();
        let text = mock
            .complete(&CompletionRequest::new("s", "u"))
            .await
            .unwrap();
        let rec = parse_budget_recommendation(&text).unwrap();
        assert_eq!(rec.total_budget, 2400.0);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let mock = MockBackend::new().failing("down");
        let result = mock.complete(&CompletionRequest::new("s", "u")).await;
        assert!(matches!(result, Err(Error::CompletionUnavailable(m)) if m == "down"));
    }

    #[tokio::test]
    async fn test_calls_shared_between_clones() {
        let mock = MockBackend::new().with_response("{}");
        let clone = mock.clone();
        clone.complete(&CompletionRequest::new("s", "u")).await.unwrap();
        clone.complete(&CompletionRequest::new("s", "u")).await.unwrap();
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_health() {
        assert!(MockBackend::new().health_check().await);
        assert!(!MockBackend::unhealthy().health_check().await);
    }
}
