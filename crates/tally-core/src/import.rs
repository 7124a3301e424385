//! CSV transaction import
//!
//! Bank exports disagree on column names, so the loader infers the date,
//! amount and description columns from the header row instead of relying on
//! a fixed layout.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::NewTransaction;

/// Subdirectory searched first by [`TransactionLoader::load_directory`]
pub const TRANSACTIONS_SUBDIR: &str = "transactions";

/// Date formats accepted for normalization, tried in order
///
/// `%y` must come before `%Y`: chrono reads "24" as the year 0024 under `%Y`.
const DATE_FORMATS: [&str; 5] = [
    "%Y-%m-%d", // 2024-01-15
    "%m/%d/%y", // 01/15/24
    "%m/%d/%Y", // 01/15/2024
    "%m-%d-%Y", // 01-15-2024
    "%d.%m.%Y", // 15.01.2024
];

/// Column positions resolved from a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    date: usize,
    amount: usize,
    description: usize,
    nr_1: Option<usize>,
    nr_2: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut date = None;
        let mut amount = None;
        let mut description = None;
        let mut nr_1 = None;
        let mut nr_2 = None;

        for (i, header) in headers.iter().enumerate() {
            let lower = header.trim().to_lowercase();
            match lower.as_str() {
                "nr_1" => nr_1 = nr_1.or(Some(i)),
                "nr_2" => nr_2 = nr_2.or(Some(i)),
                _ if lower.contains("date") => date = date.or(Some(i)),
                _ if lower.contains("amount") => amount = amount.or(Some(i)),
                _ if lower.contains("description") || lower.contains("desc") => {
                    description = description.or(Some(i))
                }
                _ => {}
            }
        }

        match (date, amount, description) {
            (Some(date), Some(amount), Some(description)) => Ok(Self {
                date,
                amount,
                description,
                nr_1,
                nr_2,
            }),
            _ => {
                let missing: Vec<&str> = [
                    ("date", date),
                    ("amount", amount),
                    ("description", description),
                ]
                .into_iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(role, _)| role)
                .collect();
                let found: Vec<&str> = headers.iter().collect();
                Err(Error::Import(format!(
                    "Missing required columns: {:?}. Found: {:?}",
                    missing, found
                )))
            }
        }
    }
}

/// Reads transaction CSV files into [`NewTransaction`]s
#[derive(Debug, Clone, Default)]
pub struct TransactionLoader;

impl TransactionLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parse transactions from any CSV reader
    pub fn parse<R: Read>(&self, reader: R) -> Result<Vec<NewTransaction>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let columns = ColumnMap::from_headers(&headers)?;
        debug!("Resolved columns: {:?}", columns);

        let mut transactions = Vec::new();
        let mut skipped = 0;

        for (row, result) in rdr.records().enumerate() {
            let record = result?;
            let cell = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");

            let raw_amount = cell(columns.amount);
            let amount = match parse_amount(raw_amount) {
                Ok(amount) => amount,
                Err(e) => {
                    // +2: header row and 1-based numbering
                    warn!("Skipping row {}: {}", row + 2, e);
                    skipped += 1;
                    continue;
                }
            };

            let mut tx = NewTransaction::new(
                normalize_date(cell(columns.date)),
                amount,
                cell(columns.description),
            );
            tx.nr_1 = columns.nr_1.map(cell).filter(|v| !v.is_empty()).map(String::from);
            tx.nr_2 = columns.nr_2.map(cell).filter(|v| !v.is_empty()).map(String::from);
            transactions.push(tx);
        }

        if skipped > 0 {
            warn!("Skipped {} rows with unparseable amounts", skipped);
        }
        Ok(transactions)
    }

    /// Load one CSV file
    pub fn load_file(&self, path: &Path) -> Result<Vec<NewTransaction>> {
        info!("Loading transactions from: {}", path.display());
        let file = File::open(path)?;
        let transactions = self.parse(file)?;
        info!(
            "Loaded {} transactions from {}",
            transactions.len(),
            path.display()
        );
        Ok(transactions)
    }

    /// Load every transaction CSV in `dir`
    ///
    /// Reads from `dir/transactions/` when it exists. Category and budget
    /// files are skipped by name. Files load in name order.
    pub fn load_directory(&self, dir: &Path) -> Result<Vec<NewTransaction>> {
        let nested = dir.join(TRANSACTIONS_SUBDIR);
        let source = if nested.is_dir() {
            nested
        } else {
            warn!(
                "Transactions folder not found at {}, using {}",
                nested.display(),
                dir.display()
            );
            dir.to_path_buf()
        };

        let files = transaction_files(&source)?;
        if files.is_empty() {
            return Err(Error::Import(format!(
                "No transaction files found in {}",
                source.display()
            )));
        }
        info!("Found {} transaction files", files.len());

        let mut all = Vec::new();
        let mut loaded = 0;
        for path in &files {
            match self.load_file(path) {
                Ok(mut transactions) => {
                    loaded += 1;
                    all.append(&mut transactions);
                }
                Err(e) => warn!("Failed to load {}: {}", path.display(), e),
            }
        }

        if loaded == 0 {
            return Err(Error::Import(format!(
                "No transaction files could be loaded from {}",
                source.display()
            )));
        }

        info!("Total transactions loaded: {}", all.len());
        Ok(all)
    }

    /// Reject input whose description column is entirely empty
    pub fn validate(&self, transactions: &[NewTransaction]) -> Result<()> {
        if !transactions.is_empty() && transactions.iter().all(|t| t.description.is_empty()) {
            return Err(Error::Import(
                "Description column contains no values".to_string(),
            ));
        }
        debug!("Validated {} transactions", transactions.len());
        Ok(())
    }
}

/// `*.csv` files in `dir` that are not category or budget definitions, sorted by name
fn transaction_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            !name.contains("category") && !name.contains("budget")
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Rewrite a recognised date as `YYYY-MM-DD`; anything else is kept as-is
fn normalize_date(s: &str) -> String {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| s.to_string())
}

/// Parse an amount string, handling currency symbols, commas and parentheses
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Import(format!("Unable to parse amount: {:?}", s)))
}
