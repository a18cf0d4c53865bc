//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Spending statistics and prompt preview
//! - `check` - Completion backend health check
//! - `core` - Shared utilities (config, transaction loading)
//! - `prompts` - Prompt library management commands
//! - `recommend` - Budget recommendation

pub mod analyze;
pub mod check;
pub mod core;
pub mod prompts;
pub mod recommend;

// Re-export command functions for main.rs
pub use analyze::*;
pub use check::*;
pub use prompts::*;
pub use recommend::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
