//! The categorize pipeline
//!
//! load transactions → load categories and ignore patterns → load budgets →
//! filter → categorize → store → dashboard → optional export

use std::path::PathBuf;

use anyhow::{Context, Result};
use tally_core::{Categorizer, Database, IgnoreFilter, TransactionLoader};
use tracing::info;

use super::{cmd_report, export_summary, load_budget_registry, load_definitions};

/// Inputs for [`cmd_categorize`], already merged from flags and config
#[derive(Debug, Clone)]
pub struct CategorizeOptions {
    pub input_dir: PathBuf,
    pub category_file: PathBuf,
    pub budget_file: Option<PathBuf>,
    pub export: Option<PathBuf>,
    pub default_category: String,
    pub json: bool,
}

/// Outcome counts of one categorize run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorizeSummary {
    pub loaded: usize,
    pub ignored: usize,
    pub stored: usize,
    pub categorized: usize,
}

pub fn cmd_categorize(db: &Database, options: &CategorizeOptions) -> Result<()> {
    let summary = run_categorize(db, options)?;
    info!(
        "Categorization complete: {} loaded, {} ignored, {} stored, {} categorized",
        summary.loaded, summary.ignored, summary.stored, summary.categorized
    );
    Ok(())
}

/// Run the pipeline and render the report
///
/// Definition and budget errors abort before anything is written. The
/// database is cleared first so it holds exactly this run's transactions.
pub fn run_categorize(db: &Database, options: &CategorizeOptions) -> Result<CategorizeSummary> {
    info!("Starting transaction categorization");

    let loader = TransactionLoader::new();
    let transactions = loader
        .load_directory(&options.input_dir)
        .with_context(|| format!("Failed to load transactions from {}", options.input_dir.display()))?;
    loader.validate(&transactions)?;
    let loaded = transactions.len();

    let definitions = load_definitions(&options.category_file)?;
    let budgets = load_budget_registry(options.budget_file.as_deref())?;

    let outcome = IgnoreFilter::new(&definitions.ignore_patterns).filter_transactions(transactions);

    let categorizer = Categorizer::new(definitions.categories, options.default_category.as_str());
    let batch = categorizer.categorize_batch(&outcome.kept);

    db.clear().context("Failed to clear database")?;
    let stored = db
        .insert_transactions(&batch.transactions)
        .context("Failed to store transactions")?;

    cmd_report(db, &budgets, None, options.json)?;

    if let Some(path) = &options.export {
        let rows = export_summary(db, &budgets, path)?;
        if !options.json {
            println!();
            println!("✅ Exported {} categories to {}", rows, path.display());
        }
    }

    Ok(CategorizeSummary {
        loaded,
        ignored: outcome.removed,
        stored,
        categorized: batch.stats.categorized,
    })
}
