//! Category aggregation and drill-down
//!
//! Every query re-reads the store, so results always reflect its current
//! contents and nothing is cached between calls.

use std::collections::HashMap;

use tracing::{debug, info, warn, Span};

use crate::budget::BudgetRegistry;
use crate::error::Result;
use crate::models::{CategorySummary, TotalStats, Transaction, TransactionDetail, DEFAULT_CATEGORY};
use crate::store::TransactionStore;

/// Running sums for one category while grouping
struct Partition {
    category: String,
    count: usize,
    raw_total: f64,
}

/// Read-only statistics over a [`TransactionStore`]
pub struct Analytics<'a, S: TransactionStore + ?Sized> {
    store: &'a S,
    budgets: Option<&'a BudgetRegistry>,
    span: Span,
}

impl<'a, S: TransactionStore + ?Sized> Analytics<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            budgets: None,
            span: tracing::info_span!("analytics"),
        }
    }

    /// Attach budgets so summaries carry `budget` and `deviation`
    pub fn with_budgets(mut self, budgets: &'a BudgetRegistry) -> Self {
        self.budgets = Some(budgets);
        self
    }

    /// Record this engine's events inside `span` instead of the default one
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Per-category count, totals, average, percentage and budget deviation
    ///
    /// Sorted by absolute total descending. Categories with equal totals keep
    /// the order in which they were first seen in the store.
    pub fn group_by_category(&self) -> Result<Vec<CategorySummary>> {
        let transactions = self.store.all_transactions()?;
        let _enter = self.span.enter();

        if transactions.is_empty() {
            warn!("No transactions found for analysis");
            return Ok(Vec::new());
        }

        let partitions = partition(&transactions);

        // Sum of absolute per-category totals, so income and spending never cancel
        let grand_total: f64 = partitions.iter().map(|p| p.raw_total.abs()).sum();

        let mut summaries: Vec<CategorySummary> = partitions
            .into_iter()
            .map(|p| {
                let total = p.raw_total.abs();
                let budget = self.budgets.and_then(|b| b.budget_for(&p.category));
                CategorySummary {
                    average: p.raw_total / p.count as f64,
                    percentage: if grand_total > 0.0 {
                        total / grand_total * 100.0
                    } else {
                        0.0
                    },
                    deviation: budget.map(|b| b - total),
                    budget,
                    total,
                    raw_total: p.raw_total,
                    count: p.count,
                    category: p.category,
                }
            })
            .collect();

        // sort_by is stable: ties keep first-seen order
        summaries.sort_by(|a, b| b.total.total_cmp(&a.total));

        info!("Generated summaries for {} categories", summaries.len());
        Ok(summaries)
    }

    /// The `n` largest categories by absolute total
    pub fn get_top_categories(&self, n: usize) -> Result<Vec<CategorySummary>> {
        let mut summaries = self.group_by_category()?;
        summaries.truncate(n);
        Ok(summaries)
    }

    /// Number of transactions in the [`DEFAULT_CATEGORY`]
    pub fn get_uncategorized_count(&self) -> Result<usize> {
        Ok(self.store.transactions_in_category(DEFAULT_CATEGORY)?.len())
    }

    /// Count, signed sum and signed mean over every transaction
    pub fn get_total_stats(&self) -> Result<TotalStats> {
        let transactions = self.store.all_transactions()?;
        if transactions.is_empty() {
            return Ok(TotalStats::default());
        }

        let total_amount: f64 = transactions.iter().map(|t| t.amount).sum();
        let total_count = transactions.len();
        Ok(TotalStats {
            total_count,
            total_amount,
            average_amount: total_amount / total_count as f64,
        })
    }

    /// Number of distinct categories, not counting the default one
    pub fn get_category_count(&self) -> Result<usize> {
        Ok(self
            .group_by_category()?
            .iter()
            .filter(|s| s.category != DEFAULT_CATEGORY)
            .count())
    }

    /// Transactions in `category`, oldest first
    ///
    /// Dates are compared as strings, which is chronological for ISO dates.
    pub fn get_transactions_by_category(&self, category: &str) -> Result<Vec<TransactionDetail>> {
        let transactions = self.store.transactions_in_category(category)?;
        let _enter = self.span.enter();
        info!("Retrieving transactions for category: {}", category);

        if transactions.is_empty() {
            warn!("No transactions found for category: {}", category);
            return Ok(Vec::new());
        }

        let mut details: Vec<TransactionDetail> =
            transactions.into_iter().map(TransactionDetail::from).collect();
        details.sort_by(|a, b| a.date.cmp(&b.date));

        info!(
            "Found {} transactions for category: {}",
            details.len(),
            category
        );
        Ok(details)
    }

    /// Every category name present in the store, alphabetically
    pub fn get_all_categories(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .group_by_category()?
            .into_iter()
            .map(|s| s.category)
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Group by exact category name, keeping first-seen order
fn partition(transactions: &[Transaction]) -> Vec<Partition> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut partitions: Vec<Partition> = Vec::new();

    for tx in transactions {
        let slot = *index.entry(tx.category.as_str()).or_insert_with(|| {
            partitions.push(Partition {
                category: tx.category.clone(),
                count: 0,
                raw_total: 0.0,
            });
            partitions.len() - 1
        });
        let p = &mut partitions[slot];
        p.count += 1;
        p.raw_total += tx.amount;
    }

    debug!(
        "Partitioned {} transactions into {} categories",
        transactions.len(),
        partitions.len()
    );
    partitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTransaction;
    use crate::store::MemoryStore;

    fn tx(date: &str, amount: f64, description: &str, category: &str) -> NewTransaction {
        NewTransaction::new(date, amount, description).with_category(category)
    }

    /// The three-transaction example: coffee, gas and a paycheck
    fn example_store() -> MemoryStore {
        MemoryStore::with_transactions(&[
            tx("2024-01-02", -50.0, "STARBUCKS #1", "Restaurants"),
            tx("2024-01-03", -12.0, "SHELL GAS", "Gas"),
            tx("2024-01-01", 2000.0, "PAYROLL DEPOSIT", DEFAULT_CATEGORY),
        ])
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_example_summaries() {
        let store = example_store();
        let summaries = Analytics::new(&store).group_by_category().unwrap();

        let names: Vec<&str> = summaries.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(names, vec![DEFAULT_CATEGORY, "Restaurants", "Gas"]);

        let uncategorized = &summaries[0];
        assert_eq!(uncategorized.count, 1);
        assert_close(uncategorized.total, 2000.0, 1e-9);
        assert_close(uncategorized.average, 2000.0, 1e-9);
        assert_close(uncategorized.percentage, 96.99, 0.01);

        let restaurants = &summaries[1];
        assert_eq!(restaurants.count, 1);
        assert_close(restaurants.total, 50.0, 1e-9);
        assert_close(restaurants.raw_total, -50.0, 1e-9);
        assert_close(restaurants.average, -50.0, 1e-9);
        assert_close(restaurants.percentage, 2.42, 0.01);

        let gas = &summaries[2];
        assert_close(gas.total, 12.0, 1e-9);
        assert_close(gas.average, -12.0, 1e-9);
        assert_close(gas.percentage, 0.58, 0.01);

        assert!(summaries.iter().all(|s| s.budget.is_none() && s.deviation.is_none()));
    }

    #[test]
    fn test_percentages_sum_to_100() {
        let store = MemoryStore::with_transactions(&[
            tx("2024-01-01", -33.33, "a", "A"),
            tx("2024-01-02", 17.1, "b", "B"),
            tx("2024-01-03", -0.07, "c", "C"),
            tx("2024-01-04", -101.0, "d", "A"),
            tx("2024-01-05", 250.0, "e", DEFAULT_CATEGORY),
        ]);
        let budgets: BudgetRegistry = [("A".to_string(), 10.0)].into_iter().collect();

        for analytics in [
            Analytics::new(&store),
            Analytics::new(&store).with_budgets(&budgets),
        ] {
            let sum: f64 = analytics
                .group_by_category()
                .unwrap()
                .iter()
                .map(|s| s.percentage)
                .sum();
            assert_close(sum, 100.0, 1e-6);
        }
    }

    #[test]
    fn test_budget_deviation() {
        let store = example_store();
        let budgets: BudgetRegistry = [("Restaurants".to_string(), 40.0)].into_iter().collect();
        let summaries = Analytics::new(&store)
            .with_budgets(&budgets)
            .group_by_category()
            .unwrap();

        let restaurants = summaries.iter().find(|s| s.category == "Restaurants").unwrap();
        assert_eq!(restaurants.budget, Some(40.0));
        assert_close(restaurants.deviation.unwrap(), -10.0, 1e-9);
        assert!(restaurants.is_over_budget());

        let gas = summaries.iter().find(|s| s.category == "Gas").unwrap();
        assert_eq!(gas.budget, None);
        assert_eq!(gas.deviation, None);
    }

    #[test]
    fn test_zero_budget_is_present() {
        let store = example_store();
        let budgets: BudgetRegistry = [("Gas".to_string(), 0.0)].into_iter().collect();
        let summaries = Analytics::new(&store)
            .with_budgets(&budgets)
            .group_by_category()
            .unwrap();
        let gas = summaries.iter().find(|s| s.category == "Gas").unwrap();
        assert_eq!(gas.budget, Some(0.0));
        assert_close(gas.deviation.unwrap(), -12.0, 1e-9);
    }

    #[test]
    fn test_group_by_category_is_idempotent() {
        let store = example_store();
        let analytics = Analytics::new(&store);
        assert_eq!(
            analytics.group_by_category().unwrap(),
            analytics.group_by_category().unwrap()
        );
    }

    #[test]
    fn test_equal_totals_keep_first_seen_order() {
        let store = MemoryStore::with_transactions(&[
            tx("2024-01-01", -10.0, "x", "Zeta"),
            tx("2024-01-02", -99.0, "y", "Big"),
            tx("2024-01-03", -10.0, "z", "Alpha"),
        ]);
        let names: Vec<String> = Analytics::new(&store)
            .group_by_category()
            .unwrap()
            .into_iter()
            .map(|s| s.category)
            .collect();
        assert_eq!(names, vec!["Big", "Zeta", "Alpha"]);
    }

    #[test]
    fn test_sign_cancellation_within_category() {
        let store = MemoryStore::with_transactions(&[
            tx("2024-01-01", -30.0, "purchase", "Shopping"),
            tx("2024-01-02", 30.0, "refund", "Shopping"),
            tx("2024-01-03", -10.0, "fill up", "Gas"),
        ]);
        let summaries = Analytics::new(&store).group_by_category().unwrap();

        let shopping = summaries.iter().find(|s| s.category == "Shopping").unwrap();
        assert_eq!(shopping.count, 2);
        assert_close(shopping.total, 0.0, 1e-12);
        assert_close(shopping.average, 0.0, 1e-12);
        assert_close(shopping.percentage, 0.0, 1e-12);
        assert_close(summaries[0].percentage, 100.0, 1e-9);
    }

    #[test]
    fn test_all_zero_totals_give_zero_percentages() {
        let store = MemoryStore::with_transactions(&[
            tx("2024-01-01", 0.0, "a", "A"),
            tx("2024-01-02", 0.0, "b", "B"),
        ]);
        let summaries = Analytics::new(&store).group_by_category().unwrap();
        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().all(|s| s.percentage == 0.0));
        assert!(summaries.iter().all(|s| !s.percentage.is_nan()));
    }

    #[test]
    fn test_categories_are_case_sensitive() {
        let store = MemoryStore::with_transactions(&[
            tx("2024-01-01", -1.0, "a", "Gas"),
            tx("2024-01-02", -1.0, "b", "gas"),
        ]);
        assert_eq!(Analytics::new(&store).group_by_category().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_store() {
        let store = MemoryStore::new();
        let analytics = Analytics::new(&store);
        assert!(analytics.group_by_category().unwrap().is_empty());
        assert_eq!(analytics.get_total_stats().unwrap(), TotalStats::default());
        assert_eq!(analytics.get_category_count().unwrap(), 0);
        assert_eq!(analytics.get_uncategorized_count().unwrap(), 0);
        assert!(analytics.get_all_categories().unwrap().is_empty());
        assert!(analytics.get_top_categories(3).unwrap().is_empty());
    }

    #[test]
    fn test_top_categories() {
        let store = example_store();
        let analytics = Analytics::new(&store);

        assert!(analytics.get_top_categories(0).unwrap().is_empty());
        let top = analytics.get_top_categories(2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].category, DEFAULT_CATEGORY);
        assert_eq!(top[1].category, "Restaurants");
        assert_eq!(analytics.get_top_categories(50).unwrap().len(), 3);
    }

    #[test]
    fn test_total_stats_are_signed() {
        let store = example_store();
        let stats = Analytics::new(&store).get_total_stats().unwrap();
        assert_eq!(stats.total_count, 3);
        assert_close(stats.total_amount, 1938.0, 1e-9);
        assert_close(stats.average_amount, 646.0, 1e-9);
    }

    #[test]
    fn test_counts() {
        let store = example_store();
        let analytics = Analytics::new(&store);
        assert_eq!(analytics.get_uncategorized_count().unwrap(), 1);
        assert_eq!(analytics.get_category_count().unwrap(), 2);
    }

    #[test]
    fn test_all_categories_sorted_including_default() {
        let store = example_store();
        assert_eq!(
            Analytics::new(&store).get_all_categories().unwrap(),
            vec!["Gas", "Restaurants", DEFAULT_CATEGORY]
        );
    }

    #[test]
    fn test_drill_down_sorted_by_date() {
        let store = MemoryStore::with_transactions(&[
            tx("2024-03-01", -5.0, "third", "Coffee"),
            tx("2024-01-15", -4.0, "first", "Coffee"),
            tx("2024-02-10", -6.0, "other", "Gas"),
            tx("2024-02-01", -3.0, "second", "Coffee"),
        ]);
        let details = Analytics::new(&store)
            .get_transactions_by_category("Coffee")
            .unwrap();

        let order: Vec<&str> = details.iter().map(|d| d.description.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
        assert_eq!(details[0].date, "2024-01-15");
        assert_eq!(details[0].amount, -4.0);
    }

    #[test]
    fn test_drill_down_unknown_category_is_empty() {
        let store = example_store();
        assert!(Analytics::new(&store)
            .get_transactions_by_category("Travel")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_results_track_store_mutation() {
        let store = example_store();
        let analytics = Analytics::new(&store);
        assert_eq!(analytics.get_total_stats().unwrap().total_count, 3);

        store
            .insert_transactions(&[tx("2024-01-09", -7.0, "toll", "Travel")])
            .unwrap();

        assert_eq!(analytics.get_total_stats().unwrap().total_count, 4);
        assert_eq!(analytics.get_category_count().unwrap(), 3);
    }

    #[test]
    fn test_works_over_database() {
        let db = crate::db::Database::in_memory().unwrap();
        db.insert_transactions(&[
            tx("2024-01-02", -50.0, "STARBUCKS #1", "Restaurants"),
            tx("2024-01-01", -12.0, "SHELL GAS", "Gas"),
        ])
        .unwrap();

        let analytics = Analytics::new(&db);
        let summaries = analytics.group_by_category().unwrap();
        assert_eq!(summaries[0].category, "Restaurants");
        assert_eq!(analytics.get_transactions_by_category("Gas").unwrap().len(), 1);
    }
}
