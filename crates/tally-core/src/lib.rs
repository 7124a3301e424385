//! Tally Core Library
//!
//! Categorization and spending analytics for bank transaction exports:
//! - CSV import with header inference
//! - Category, ignore-pattern and budget definition loading
//! - Ignore filtering and first-match merchant categorization
//! - SQLite-backed (or in-memory) transaction store
//! - Per-category aggregation with budget deviation
//! - CSV export of summaries and drill-down listings

pub mod analytics;
pub mod budget;
pub mod categorize;
pub mod config;
pub mod db;
pub mod definitions;
pub mod error;
pub mod export;
pub mod ignore;
pub mod import;
pub mod models;
pub mod store;

pub use analytics::Analytics;
pub use budget::BudgetRegistry;
pub use categorize::{CategorizationStats, CategorizedBatch, Categorizer, MatchDetail};
pub use config::Config;
pub use db::Database;
pub use definitions::{load_budgets, load_category_definitions, CategoryDefinitions};
pub use error::{Error, Result};
pub use export::{export_details_csv, export_summary_csv};
pub use ignore::{FilterOutcome, IgnoreFilter};
pub use import::TransactionLoader;
pub use models::{
    Category, CategorySummary, NewTransaction, TotalStats, Transaction, TransactionDetail,
    DEFAULT_CATEGORY,
};
pub use store::{MemoryStore, TransactionStore};
