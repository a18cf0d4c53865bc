//! Error types for SmartSpend

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied data that must be rejected before analysis
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The completion service answered with something that is not a recommendation
    #[error("Malformed recommendation: {0}")]
    MalformedRecommendation(String),

    /// Network, HTTP status or service-side failure of the completion call
    #[error("Completion service unavailable: {0}")]
    CompletionUnavailable(String),

    #[error("Completion timed out after {0}s")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
