//! AI backend request types
//!
//! These types are backend-agnostic and used across all AI implementations.

use crate::composer::ComposedPrompt;
use crate::config::CompletionSettings;

/// A single text-completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction
    pub system: String,
    /// User prompt
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        let settings = CompletionSettings::default();
        Self {
            system: system.into(),
            user: user.into(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    /// Build a request from a composed prompt and the configured budget
    pub fn from_prompt(prompt: &ComposedPrompt, settings: &CompletionSettings) -> Self {
        Self {
            system: prompt.system.clone(),
            user: prompt.user.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}
