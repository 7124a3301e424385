//! Per-category budget lookup
//!
//! A category without an entry has no budget at all, which is different from
//! a budget of zero.

use std::collections::BTreeMap;

use tracing::{debug, error, warn, Span};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct BudgetRegistry {
    budgets: BTreeMap<String, f64>,
    span: Span,
}

impl Default for BudgetRegistry {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

impl BudgetRegistry {
    pub fn new(budgets: BTreeMap<String, f64>) -> Self {
        Self {
            budgets,
            span: tracing::info_span!("budgets"),
        }
    }

    /// Record this registry's events inside `span` instead of the default one
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn budget_for(&self, category: &str) -> Option<f64> {
        self.budgets.get(category).copied()
    }

    pub fn total_budget(&self) -> f64 {
        self.budgets.values().sum()
    }

    pub fn len(&self) -> usize {
        self.budgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty()
    }

    /// Budgets ordered by category name
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.budgets.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Fails if any budget is negative, naming every offending category
    pub fn validate(&self) -> Result<()> {
        let _enter = self.span.enter();

        if self.budgets.is_empty() {
            warn!("No budgets defined");
            return Ok(());
        }

        let negative: Vec<String> = self
            .budgets
            .iter()
            .filter(|(_, amount)| **amount < 0.0)
            .map(|(name, amount)| format!("{name}: {amount:.2}"))
            .collect();

        if !negative.is_empty() {
            error!("Found negative budgets: {:?}", negative);
            return Err(Error::Validation(format!(
                "Negative budgets: {}",
                negative.join(", ")
            )));
        }

        debug!("Validated {} budgets", self.budgets.len());
        Ok(())
    }
}

impl FromIterator<(String, f64)> for BudgetRegistry {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(entries: &[(&str, f64)]) -> BudgetRegistry {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_budget_for_distinguishes_missing_from_zero() {
        let budgets = registry(&[("Restaurants", 40.0), ("Gifts", 0.0)]);
        assert_eq!(budgets.budget_for("Restaurants"), Some(40.0));
        assert_eq!(budgets.budget_for("Gifts"), Some(0.0));
        assert_eq!(budgets.budget_for("Gas"), None);
        assert_eq!(budgets.budget_for("restaurants"), None);
    }

    #[test]
    fn test_total_budget() {
        let budgets = registry(&[("Restaurants", 40.0), ("Gas", 100.5)]);
        assert!((budgets.total_budget() - 140.5).abs() < 1e-9);
        assert_eq!(BudgetRegistry::default().total_budget(), 0.0);
    }

    #[test]
    fn test_empty_registry_is_valid() {
        assert!(BudgetRegistry::default().validate().is_ok());
    }

    #[test]
    fn test_validate_lists_every_negative_budget() {
        let budgets = registry(&[("Gas", -5.0), ("Restaurants", 40.0), ("Travel", -1.0)]);
        let err = budgets.validate().unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, Error::Validation(_)));
        assert!(msg.contains("Gas"));
        assert!(msg.contains("Travel"));
        assert!(!msg.contains("Restaurants"));
        // Validation never mutates the map
        assert_eq!(budgets.len(), 3);
    }

    #[test]
    fn test_iter_is_sorted_by_name() {
        let budgets = registry(&[("Zoo", 1.0), ("Art", 2.0)]);
        let names: Vec<&str> = budgets.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["Art", "Zoo"]);
    }
}
