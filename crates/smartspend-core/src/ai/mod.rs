//! Pluggable completion backend abstraction
//!
//! This module provides a backend-agnostic interface for the text-completion
//! service that drafts budget recommendations.
//!
//! # Architecture
//!
//! - `AIBackend` trait: one completion call plus health and identity
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend` (Groq and friends), `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_env();
//!
//! if let Some(ref client) = ai {
//!     let request = CompletionRequest::from_prompt(&prompt, &settings);
//!     let rec = parse_budget_recommendation(&client.complete(&request).await?)?;
//!     println!("Total: {}", rec.total_budget);
//! }
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (groq, openai_compatible, mock). Default: groq
//! - `GROQ_API_KEY`: API key (required for groq)
//! - `GROQ_MODEL`: Model name (default: llama-3.3-70b-versatile)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: llama-3.3-70b-versatile)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod mock;
mod openai_compatible;
pub mod parsing;
pub mod types;

pub use mock::{MockBackend, MOCK_RECOMMENDATION};
pub use openai_compatible::{OpenAICompatibleBackend, DEFAULT_MODEL, GROQ_HOST};
pub use parsing::parse_budget_recommendation;
pub use types::*;

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the interface for all completion backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Send one completion request and return the raw reply text
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for provenance)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI-compatible backend (Groq, vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `groq` (default): Uses GROQ_API_KEY and GROQ_MODEL
    /// - `openai_compatible`: Uses OPENAI_COMPATIBLE_HOST and OPENAI_COMPATIBLE_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "groq".to_string());

        match backend.to_lowercase().as_str() {
            "groq" => OpenAICompatibleBackend::groq_from_env().map(AIClient::OpenAICompatible),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to groq");
                OpenAICompatibleBackend::groq_from_env().map(AIClient::OpenAICompatible)
            }
        }
    }

    /// Create a Groq backend directly
    pub fn groq(api_key: &str, model: &str) -> Self {
        AIClient::OpenAICompatible(OpenAICompatibleBackend::groq(api_key, model))
    }

    /// Create a backend for any OpenAI-compatible server
    pub fn openai_compatible(host: &str, model: &str) -> Self {
        AIClient::OpenAICompatible(OpenAICompatibleBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::OpenAICompatible(b) => AIClient::OpenAICompatible(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.clone()),
        }
    }
}

impl From<MockBackend> for AIClient {
    fn from(backend: MockBackend) -> Self {
        AIClient::Mock(backend)
    }
}

impl From<OpenAICompatibleBackend> for AIClient {
    fn from(backend: OpenAICompatibleBackend) -> Self {
        AIClient::OpenAICompatible(backend)
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        match self {
            AIClient::OpenAICompatible(b) => b.complete(request).await,
            AIClient::Mock(b) => b.complete(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_client_dispatches_to_mock() {
        let client = AIClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
        assert!(client.health_check().await);

        let text = client
            .complete(&CompletionRequest::new("system", "user"))
            .await
            .unwrap();
        let rec = parse_budget_recommendation(&text).unwrap();
        assert_eq!(rec.categories.len(), 2);
    }

    #[tokio::test]
    async fn test_client_passes_failures_through() {
        let client: AIClient = MockBackend::new().failing("quota exceeded").into();
        let result = client.complete(&CompletionRequest::new("s", "u")).await;
        assert!(matches!(result, Err(Error::CompletionUnavailable(_))));
    }

    #[test]
    fn test_groq_client() {
        let client = AIClient::groq("gsk-test", DEFAULT_MODEL);
        assert_eq!(client.host(), GROQ_HOST);
        assert_eq!(client.with_model("other").model(), "other");
    }
}
