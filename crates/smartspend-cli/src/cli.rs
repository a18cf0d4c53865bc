//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// SmartSpend - Budget recommendations from your spending history
#[derive(Parser)]
#[command(name = "smartspend")]
#[command(about = "Analyze transactions and recommend a monthly budget", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Advisor config file (defaults to the data directory override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recommend a monthly budget
    Recommend {
        /// Transaction file (.csv or .json)
        #[arg(short, long)]
        file: PathBuf,

        /// Monthly income
        #[arg(short, long)]
        income: f64,

        /// Currency code used in the prompt and output
        #[arg(short, long, default_value = "USD")]
        currency: String,

        /// Analyze as of this date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Skip the completion service and use the local fallback
        #[arg(long)]
        offline: bool,

        /// Completion model to use instead of the configured one
        #[arg(short, long)]
        model: Option<String>,

        /// Print the advice as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show spending statistics: period totals, trends, monthly breakdown
    Analyze {
        /// Transaction file (.csv or .json)
        #[arg(short, long)]
        file: PathBuf,

        /// Analyze as of this date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the prompt that would be sent, without calling the service
    Prompt {
        /// Transaction file (.csv or .json)
        #[arg(short, long)]
        file: PathBuf,

        /// Monthly income
        #[arg(short, long)]
        income: f64,

        /// Currency code
        #[arg(short, long, default_value = "USD")]
        currency: String,

        /// Analyze as of this date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Manage prompt templates
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Check completion backend configuration and connectivity
    Check,
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., budget_recommendation)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}
