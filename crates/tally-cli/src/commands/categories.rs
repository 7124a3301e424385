//! Category definition commands

use std::path::Path;

use anyhow::Result;
use tally_core::definitions::summary_text;
use tally_core::{Categorizer, IgnoreFilter};

use super::load_definitions;

pub fn cmd_categories_list(category_file: &Path) -> Result<()> {
    let definitions = load_definitions(category_file)?;

    println!();
    println!("{}", summary_text(&definitions.categories));

    println!();
    if definitions.ignore_patterns.is_empty() {
        println!("No ignore patterns");
    } else {
        println!("Ignore patterns ({}):", definitions.ignore_patterns.len());
        for pattern in &definitions.ignore_patterns {
            println!("  - {}", pattern);
        }
    }
    Ok(())
}

/// Result of trying one description against the definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReport {
    pub category: String,
    pub pattern: Option<String>,
    pub ignored_by: Option<String>,
}

pub fn match_description(
    category_file: &Path,
    description: &str,
    default_category: &str,
) -> Result<MatchReport> {
    let definitions = load_definitions(category_file)?;
    let filter = IgnoreFilter::new(&definitions.ignore_patterns);
    let categorizer = Categorizer::new(definitions.categories, default_category);

    let detail = categorizer.match_detail(description);
    Ok(MatchReport {
        category: detail.category.to_string(),
        pattern: detail.pattern.map(String::from),
        ignored_by: filter.matching_pattern(description).map(String::from),
    })
}

pub fn cmd_categories_test(
    category_file: &Path,
    description: &str,
    default_category: &str,
) -> Result<()> {
    let report = match_description(category_file, description, default_category)?;

    println!();
    println!("Description: {}", description);
    match &report.pattern {
        Some(pattern) => println!("Category:    {} (matched '{}')", report.category, pattern),
        None => println!("Category:    {} (no pattern matched)", report.category),
    }
    if let Some(pattern) = &report.ignored_by {
        println!("⚠️  Would be ignored (matches ignore pattern '{}')", pattern);
    }
    Ok(())
}
