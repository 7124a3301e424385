//! Category, ignore-pattern and budget definition loading
//!
//! Category file: one column per category. The header is the category name
//! and the cells below it are merchant substrings, read down to the first
//! blank cell. A column named `ignore` (any case) holds ignore patterns
//! instead of merchants.
//!
//! Budget file: `Category,Budget` rows.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use crate::budget::BudgetRegistry;
use crate::error::{Error, Result};
use crate::models::Category;

/// Header of the column that holds ignore patterns
pub const IGNORE_COLUMN: &str = "ignore";

/// Everything read from a category file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryDefinitions {
    /// Categories in column order
    pub categories: Vec<Category>,
    /// Patterns from the `ignore` column, empty if there is none
    pub ignore_patterns: Vec<String>,
}

/// Cells that mark the end of a column
fn is_blank(cell: &str) -> bool {
    cell.is_empty() || cell.eq_ignore_ascii_case("nan")
}

/// Parse a column-oriented category file
pub fn parse_category_definitions<R: Read>(reader: R) -> Result<CategoryDefinitions> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    let mut open = vec![true; headers.len()];

    for result in rdr.records() {
        let record = result?;
        for (i, column) in columns.iter_mut().enumerate() {
            if !open[i] {
                continue;
            }
            let cell = record.get(i).map(str::trim).unwrap_or("");
            if is_blank(cell) {
                open[i] = false;
            } else {
                column.push(cell.to_string());
            }
        }
    }

    let mut definitions = CategoryDefinitions::default();
    let mut found_ignore = false;

    for (position, (name, merchants)) in headers.into_iter().zip(columns).enumerate() {
        if name.is_empty() {
            warn!(
                "Skipping column {} with a blank header ({} merchants)",
                position + 1,
                merchants.len()
            );
            continue;
        }

        if name.eq_ignore_ascii_case(IGNORE_COLUMN) {
            debug!("Skipping '{}' column", name);
            info!("Loaded {} ignore patterns", merchants.len());
            debug!("  Ignore patterns: {:?}", merchants);
            found_ignore = true;
            definitions.ignore_patterns.extend(merchants);
            continue;
        }

        if merchants.is_empty() {
            debug!("Dropping category '{}' with no merchants", name);
            continue;
        }

        info!(
            "Loaded category '{}' with {} merchants",
            name,
            merchants.len()
        );
        debug!("  Merchants: {:?}", merchants);
        definitions.categories.push(Category { name, merchants });
    }

    if !found_ignore {
        info!("No 'ignore' column found - no patterns to ignore");
    }

    if definitions.categories.is_empty() {
        return Err(Error::Validation("No categories found in file".into()));
    }

    info!("Total categories loaded: {}", definitions.categories.len());
    Ok(definitions)
}

/// Load a category file from disk
pub fn load_category_definitions(path: &Path) -> Result<CategoryDefinitions> {
    info!("Loading categories from: {}", path.display());
    let file = File::open(path).map_err(|e| {
        Error::Validation(format!(
            "Could not read category file {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_category_definitions(file)
}

/// Warn about repeated category names and merchants listed under more than one category
///
/// Returns the number of duplicates found. Earlier categories win at
/// categorization time, so duplicates are legal but usually a mistake.
pub fn validate_categories(categories: &[Category]) -> usize {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut names: HashSet<&str> = HashSet::new();
    let mut duplicates = 0;

    for category in categories {
        if !names.insert(category.name.as_str()) {
            duplicates += 1;
            warn!(
                "Category '{}' appears in more than one column",
                category.name
            );
        }
        for merchant in &category.merchants {
            let key = merchant.to_lowercase();
            match seen.get(&key) {
                Some(first) => {
                    duplicates += 1;
                    warn!(
                        "Duplicate merchant '{}' found in categories '{}' and '{}'",
                        merchant, first, category.name
                    );
                }
                None => {
                    seen.insert(key, &category.name);
                }
            }
        }
    }

    debug!(
        "Validated {} unique merchants across {} categories",
        seen.len(),
        categories.len()
    );
    duplicates
}

/// Lower-cased merchant to category name; a later category overwrites an earlier one
pub fn merchant_map(categories: &[Category]) -> HashMap<String, String> {
    categories
        .iter()
        .flat_map(|c| c.merchants.iter().map(|m| (m.to_lowercase(), c.name.clone())))
        .collect()
}

/// Human-readable listing of categories and merchant counts
pub fn summary_text(categories: &[Category]) -> String {
    let rule = "=".repeat(50);
    let mut lines = vec!["Category Summary:".to_string(), rule.clone()];

    for category in categories {
        lines.push(format!(
            "{}: {} merchants",
            category.name,
            category.merchants.len()
        ));
    }

    let total_merchants: usize = categories.iter().map(|c| c.merchants.len()).sum();
    lines.push(rule);
    lines.push(format!(
        "Total: {} categories, {} merchants",
        categories.len(),
        total_merchants
    ));

    lines.join("\n")
}

/// Parse a `Category,Budget` file
///
/// Rows with a non-numeric budget or an empty category are skipped with a
/// warning. Negative budgets are kept so [`BudgetRegistry::validate`] can
/// report them.
pub fn parse_budgets<R: Read>(reader: R) -> Result<BudgetRegistry> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let (category_idx, budget_idx) = match (position("Category"), position("Budget")) {
        (Some(c), Some(b)) => (c, b),
        (c, b) => {
            let missing: Vec<&str> = [("Category", c), ("Budget", b)]
                .into_iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(name, _)| name)
                .collect();
            return Err(Error::Validation(format!(
                "Budget file missing required columns: {:?}",
                missing
            )));
        }
    };

    let mut budgets = BTreeMap::new();

    for result in rdr.records() {
        let record = result?;
        let category = record.get(category_idx).unwrap_or("").trim();
        let raw = record.get(budget_idx).unwrap_or("").trim();

        let budget = match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                warn!(
                    "Invalid budget value for category '{}': {}",
                    category, raw
                );
                continue;
            }
        };

        if category.is_empty() {
            warn!("Skipping budget {} with no category", budget);
            continue;
        }

        debug!("Loaded budget for '{}': ${:.2}", category, budget);
        budgets.insert(category.to_string(), budget);
    }

    info!("Total budgets loaded: {} categories", budgets.len());
    Ok(BudgetRegistry::new(budgets))
}

/// Load budgets from `path`; no path means budgets are disabled
pub fn load_budgets(path: Option<&Path>) -> Result<BudgetRegistry> {
    let Some(path) = path else {
        info!("No budget file specified - budgets disabled");
        return Ok(BudgetRegistry::default());
    };

    info!("Loading budgets from: {}", path.display());
    let file = File::open(path).map_err(|e| {
        Error::Validation(format!(
            "Could not read budget file {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_budgets(file)
}
