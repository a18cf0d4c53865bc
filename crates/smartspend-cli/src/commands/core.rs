//! Shared utilities for commands
//!
//! This module contains:
//! - `load_config` - Advisor config from `--config` or the default location
//! - `read_transactions` - Transaction file loading
//! - `resolve_as_of` - Analysis date defaulting to today

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use smartspend_core::{import::load_transactions, AdvisorConfig, Transaction};

/// Load the advisor config from an explicit path or the default override location
pub fn load_config(path: Option<&Path>) -> Result<AdvisorConfig> {
    match path {
        Some(path) => AdvisorConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => AdvisorConfig::load().context("Failed to load advisor config"),
    }
}

pub fn read_transactions(file: &Path) -> Result<Vec<Transaction>> {
    load_transactions(file)
        .with_context(|| format!("Failed to read transactions from {}", file.display()))
}

pub fn resolve_as_of(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| Local::now().date_naive())
}
