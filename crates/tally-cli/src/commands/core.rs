//! Shared command utilities
//!
//! This module contains:
//! - `open_db` - Open the configured database
//! - `empty_store_hint` - Explain an empty in-memory store
//! - `load_definitions` - Load categories and ignore patterns
//! - `load_budget_registry` - Load and validate budgets

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::definitions::{load_budgets, load_category_definitions, validate_categories};
use tally_core::{BudgetRegistry, CategoryDefinitions, Database};

/// Open the database at `db_path` (`:memory:` for a throwaway store)
pub fn open_db(db_path: &str) -> Result<Database> {
    Database::open(db_path).with_context(|| format!("Failed to open database: {}", db_path))
}

/// Hint printed by `report` and `drill` when they find nothing in an in-memory store
///
/// An in-memory store only lives for one process, so a separate `report` or
/// `drill` run never sees what `categorize` stored.
pub fn empty_store_hint(db: &Database) -> Result<Option<String>> {
    if !db.is_in_memory() || db.transaction_count()? > 0 {
        return Ok(None);
    }
    Ok(Some(
        "The in-memory database is empty. Give `categorize` and this command the same \
         `--db <file>` (or set [database] path in the config) to report on an earlier run."
            .to_string(),
    ))
}

/// Load the category file and warn about duplicate categories and merchants
pub fn load_definitions(category_file: &Path) -> Result<CategoryDefinitions> {
    let definitions = load_category_definitions(category_file)
        .with_context(|| format!("Failed to load categories from {}", category_file.display()))?;
    validate_categories(&definitions.categories);
    Ok(definitions)
}

/// Load budgets, refusing any set that contains a negative budget
pub fn load_budget_registry(budget_file: Option<&Path>) -> Result<BudgetRegistry> {
    let budgets = load_budgets(budget_file).context("Failed to load budgets")?;
    budgets.validate().context("Invalid budgets")?;
    Ok(budgets)
}
