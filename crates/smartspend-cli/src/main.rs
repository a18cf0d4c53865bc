//! SmartSpend CLI - Budget recommendations from spending history
//!
//! Usage:
//!   smartspend recommend --file tx.csv --income 5000    Recommend a budget
//!   smartspend analyze --file tx.csv                    Show spending statistics
//!   smartspend prompt --file tx.csv --income 5000       Print the composed prompt
//!   smartspend check                                    Test the completion backend

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Recommend {
            file,
            income,
            currency,
            as_of,
            offline,
            model,
            json,
        } => {
            let options = commands::RecommendOptions {
                income,
                currency,
                as_of,
                offline,
                model,
                json,
            };
            commands::cmd_recommend(config, &file, &options).await
        }
        Commands::Analyze { file, as_of, json } => commands::cmd_analyze(config, &file, as_of, json),
        Commands::Prompt {
            file,
            income,
            currency,
            as_of,
        } => commands::cmd_prompt(config, &file, income, &currency, as_of),
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Check => commands::cmd_check().await,
    }
}
