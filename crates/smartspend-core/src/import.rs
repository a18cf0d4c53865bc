//! Transaction import from CSV and JSON files
//!
//! CSV files need a header row naming the columns `id`, `date`, `amount`,
//! `category` and optionally `kind`. Column order does not matter. When
//! `kind` is missing or blank the sign of the amount decides: negative
//! amounts are expenses, the rest income.
//!
//! JSON files hold an array of transaction objects in the model's own shape.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionKind};

/// Supported transaction file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Load transactions from a file, format chosen by extension
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let format = ImportFormat::from_path(path).ok_or_else(|| {
        Error::InvalidInput(format!(
            "Unsupported transaction file {} (expected .csv or .json)",
            path.display()
        ))
    })?;

    let reader = BufReader::new(File::open(path)?);
    let transactions = match format {
        ImportFormat::Csv => parse_csv(reader)?,
        ImportFormat::Json => parse_json(reader)?,
    };

    debug!(
        path = %path.display(),
        count = transactions.len(),
        "Loaded transactions"
    );
    Ok(transactions)
}

/// Parse a JSON array of transactions
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Column positions resolved from the header row
struct Columns {
    id: usize,
    date: usize,
    amount: usize,
    category: usize,
    kind: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::InvalidInput(format!("CSV is missing column '{}'", name)))
        };

        Ok(Self {
            id: require("id")?,
            date: require("date")?,
            amount: require("amount")?,
            category: require("category")?,
            kind: find("kind"),
        })
    }
}

/// Parse CSV transactions
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut transactions = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = index + 2;
        let field = |col: usize, name: &str| {
            record
                .get(col)
                .map(str::trim)
                .ok_or_else(|| Error::InvalidInput(format!("Line {}: missing {}", line, name)))
        };

        let id = field(columns.id, "id")?.to_string();
        let date = parse_date(field(columns.date, "date")?)
            .map_err(|e| Error::InvalidInput(format!("Line {}: {}", line, e)))?;
        let signed = parse_amount(field(columns.amount, "amount")?)
            .map_err(|e| Error::InvalidInput(format!("Line {}: {}", line, e)))?;
        let category = field(columns.category, "category")?.to_string();

        let kind = match columns.kind.and_then(|col| record.get(col)).map(str::trim) {
            Some(kind) if !kind.is_empty() => kind
                .parse::<TransactionKind>()
                .map_err(|e| Error::InvalidInput(format!("Line {}: {}", line, e)))?,
            _ if signed < 0.0 => TransactionKind::Expense,
            _ => TransactionKind::Income,
        };

        transactions.push(Transaction {
            id,
            amount: signed.abs(),
            category,
            date,
            kind,
        });
    }

    debug!("Parsed {} CSV transactions", transactions.len());
    Ok(transactions)
}

/// Parse a date string in various common formats
fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2026-01-15
        "%m/%d/%Y", // 01/15/2026
        "%m/%d/%y", // 01/15/26
        "%m-%d-%Y", // 01-15-2026
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::InvalidInput(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', '€', '£', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| Error::InvalidInput(format!("Unable to parse amount: {}", s)))
}
