//! Merchant-pattern categorization
//!
//! Categories are scanned in their given order, and within a category its
//! merchant patterns in their given order. The first category with any
//! pattern contained (case-insensitively) in the description wins, even if a
//! later category has a longer or more specific pattern. Descriptions that
//! match nothing get the default category.

use tracing::{debug, info, warn, Span};

use crate::models::{Category, NewTransaction, DEFAULT_CATEGORY};

/// Which category a description resolved to, and the literal pattern that matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchDetail<'a> {
    pub category: &'a str,
    /// `None` when the default category was assigned
    pub pattern: Option<&'a str>,
}

/// Counts gathered while categorizing a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizationStats {
    pub total: usize,
    /// Transactions assigned something other than the default category
    pub categorized: usize,
    /// Per-category counts in first-seen order
    pub distribution: Vec<(String, usize)>,
}

impl CategorizationStats {
    pub fn uncategorized(&self) -> usize {
        self.total - self.categorized
    }

    pub fn categorized_percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.categorized as f64 / self.total as f64 * 100.0
        }
    }

    fn record(&mut self, category: &str) {
        match self.distribution.iter_mut().find(|(name, _)| name == category) {
            Some((_, count)) => *count += 1,
            None => self.distribution.push((category.to_string(), 1)),
        }
    }
}

/// Output of [`Categorizer::categorize_batch`]
#[derive(Debug, Clone, Default)]
pub struct CategorizedBatch {
    pub transactions: Vec<NewTransaction>,
    pub stats: CategorizationStats,
}

/// Assigns exactly one category name to each transaction description
#[derive(Debug, Clone)]
pub struct Categorizer {
    categories: Vec<Category>,
    /// Lower-cased copies of each category's merchants, index-aligned with `categories`
    lowered: Vec<Vec<String>>,
    default_category: String,
    span: Span,
}

impl Categorizer {
    pub fn new(categories: Vec<Category>, default_category: impl Into<String>) -> Self {
        let lowered = categories
            .iter()
            .map(|c| c.merchants.iter().map(|m| m.to_lowercase()).collect())
            .collect();
        Self {
            categories,
            lowered,
            default_category: default_category.into(),
            span: tracing::info_span!("categorizer"),
        }
    }

    /// Categorizer falling back to [`DEFAULT_CATEGORY`]
    pub fn with_default_category(categories: Vec<Category>) -> Self {
        Self::new(categories, DEFAULT_CATEGORY)
    }

    /// Record this categorizer's events inside `span` instead of the default one
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    /// Category name for a description; empty or missing descriptions get the default
    pub fn categorize<'d>(&self, description: impl Into<Option<&'d str>>) -> &str {
        self.match_detail(description).category
    }

    /// Like [`categorize`](Self::categorize) but also reports the pattern that matched
    pub fn match_detail<'d>(&self, description: impl Into<Option<&'d str>>) -> MatchDetail<'_> {
        let no_match = MatchDetail {
            category: &self.default_category,
            pattern: None,
        };

        let description = match description.into() {
            Some(d) if !d.is_empty() => d,
            _ => return no_match,
        };
        let desc_lower = description.to_lowercase();

        for (category, patterns) in self.categories.iter().zip(&self.lowered) {
            if let Some(idx) = patterns.iter().position(|p| desc_lower.contains(p.as_str())) {
                let merchant = category.merchants[idx].as_str();
                self.span.in_scope(|| {
                    debug!(
                        "Matched '{}' to category '{}' via merchant '{}'",
                        description, category.name, merchant
                    )
                });
                return MatchDetail {
                    category: &category.name,
                    pattern: Some(merchant),
                };
            }
        }

        self.span.in_scope(|| {
            debug!(
                "No match found for '{}', assigning '{}'",
                description, self.default_category
            )
        });
        no_match
    }

    /// Categorize every transaction, returning new records and leaving the input untouched
    pub fn categorize_batch(&self, transactions: &[NewTransaction]) -> CategorizedBatch {
        let _enter = self.span.enter();

        if transactions.is_empty() {
            warn!("No transactions to categorize");
            return CategorizedBatch::default();
        }

        info!(
            "Categorizing {} transactions against {} categories",
            transactions.len(),
            self.categories.len()
        );

        let mut stats = CategorizationStats {
            total: transactions.len(),
            ..Default::default()
        };
        let categorized: Vec<NewTransaction> = transactions
            .iter()
            .map(|tx| {
                let category = self.categorize(tx.description.as_str());
                stats.record(category);
                if category != self.default_category {
                    stats.categorized += 1;
                }
                tx.with_category(category)
            })
            .collect();

        info!(
            "Categorized: {}/{} ({:.1}%)",
            stats.categorized,
            stats.total,
            stats.categorized_percentage()
        );

        let mut by_count = stats.distribution.clone();
        by_count.sort_by(|a, b| b.1.cmp(&a.1));
        debug!("Category distribution:");
        for (name, count) in &by_count {
            debug!("  {}: {}", name, count);
        }

        CategorizedBatch {
            transactions: categorized,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categorizer() -> Categorizer {
        Categorizer::with_default_category(vec![
            Category::new("Groceries", vec!["HARRIS TEETER", "Costco"]),
            Category::new("Restaurants", vec!["STARBUCKS", "chipotle"]),
            Category::new("Gas", vec!["SHELL", "EXXON"]),
        ])
    }

    #[test]
    fn test_partial_matching() {
        let c = categorizer();
        assert_eq!(c.categorize("HARRIS TEETER #1234 CHARLOTTE"), "Groceries");
        assert_eq!(c.categorize("Purchase at STARBUCKS COFFEE SHOP"), "Restaurants");
        assert_eq!(c.categorize("SHELL GAS STATION #5678"), "Gas");
    }

    #[test]
    fn test_case_insensitive() {
        let c = categorizer();
        assert_eq!(c.categorize("harris teeter store"), "Groceries");
        assert_eq!(c.categorize("COSTCO wholesale"), "Groceries");
        assert_eq!(c.categorize("CHIPOTLE 0042"), "Restaurants");
    }

    #[test]
    fn test_unmatched_and_empty_get_default() {
        let c = categorizer();
        assert_eq!(c.categorize("UNKNOWN MERCHANT 123"), DEFAULT_CATEGORY);
        assert_eq!(c.categorize(""), DEFAULT_CATEGORY);
        assert_eq!(c.categorize(None), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_first_category_wins_over_more_specific_later_match() {
        let c = Categorizer::with_default_category(vec![
            Category::new("A", vec!["foo"]),
            Category::new("B", vec!["foobar"]),
        ]);
        assert_eq!(c.categorize("foobar"), "A");

        let detail = c.match_detail("foobar");
        assert_eq!(detail.category, "A");
        assert_eq!(detail.pattern, Some("foo"));
    }

    #[test]
    fn test_match_detail_reports_literal_pattern() {
        let c = categorizer();
        let detail = c.match_detail("costco gas #12");
        assert_eq!(detail.category, "Groceries");
        assert_eq!(detail.pattern, Some("Costco"));

        let none = c.match_detail("PAYROLL DEPOSIT");
        assert_eq!(none.category, DEFAULT_CATEGORY);
        assert_eq!(none.pattern, None);

        assert_eq!(c.match_detail(None).pattern, None);
    }

    #[test]
    fn test_custom_default_category() {
        let c = Categorizer::new(vec![Category::new("Gas", vec!["SHELL"])], "Other");
        assert_eq!(c.categorize("PAYROLL"), "Other");
        assert_eq!(c.default_category(), "Other");
    }

    #[test]
    fn test_categorize_batch_is_pure() {
        let c = categorizer();
        let input = vec![
            NewTransaction::new("2024-01-02", -50.0, "STARBUCKS #1"),
            NewTransaction::new("2024-01-03", -12.0, "SHELL GAS"),
            NewTransaction::new("2024-01-04", 2000.0, "PAYROLL DEPOSIT"),
            NewTransaction::new("2024-01-05", -7.0, "Starbucks mobile"),
        ];

        let batch = c.categorize_batch(&input);

        let cats: Vec<&str> = batch.transactions.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(cats, vec!["Restaurants", "Gas", DEFAULT_CATEGORY, "Restaurants"]);
        assert!(input.iter().all(|t| t.category == DEFAULT_CATEGORY));

        assert_eq!(batch.stats.total, 4);
        assert_eq!(batch.stats.categorized, 3);
        assert_eq!(batch.stats.uncategorized(), 1);
        assert_eq!(
            batch.stats.distribution,
            vec![
                ("Restaurants".to_string(), 2),
                ("Gas".to_string(), 1),
                (DEFAULT_CATEGORY.to_string(), 1),
            ]
        );
        assert!((batch.stats.categorized_percentage() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_categorize_batch_recategorizes_with_new_rules() {
        let input = vec![NewTransaction::new("2024-01-02", -50.0, "STARBUCKS #1")];

        let first = categorizer().categorize_batch(&input);
        let second = Categorizer::new(vec![Category::new("Coffee", vec!["starbucks"])], "Other")
            .categorize_batch(&first.transactions);

        assert_eq!(first.transactions[0].category, "Restaurants");
        assert_eq!(second.transactions[0].category, "Coffee");
    }

    #[test]
    fn test_categorize_empty_batch() {
        let batch = categorizer().categorize_batch(&[]);
        assert!(batch.transactions.is_empty());
        assert_eq!(batch.stats, CategorizationStats::default());
        assert_eq!(batch.stats.categorized_percentage(), 0.0);
    }
}
