//! Domain models for tally

use serde::{Deserialize, Serialize};

/// Category assigned when no merchant pattern matches a description.
///
/// `Analytics::get_uncategorized_count` counts this exact name, so the
/// categorizer's default must match it for that count to be meaningful.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// A transaction that has been persisted and carries a store-assigned id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// Sortable date token (ISO 8601 when the importer could parse it)
    pub date: String,
    /// Signed amount, sign preserved from the source file
    pub amount: f64,
    pub description: String,
    pub category: String,
    /// Opaque pass-through identifiers from the source file
    pub nr_1: Option<String>,
    pub nr_2: Option<String>,
}

/// A transaction read from a source file, not yet persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: String,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub nr_1: Option<String>,
    pub nr_2: Option<String>,
}

impl NewTransaction {
    /// Create an uncategorized transaction
    pub fn new(date: impl Into<String>, amount: f64, description: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            amount,
            description: description.into(),
            category: DEFAULT_CATEGORY.to_string(),
            nr_1: None,
            nr_2: None,
        }
    }

    /// Return a copy with the given category
    pub fn with_category(&self, category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..self.clone()
        }
    }
}

/// A named spending bucket recognised by merchant substrings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Merchant patterns in precedence order
    pub merchants: Vec<String>,
}

impl Category {
    pub fn new<S: Into<String>>(name: impl Into<String>, merchants: Vec<S>) -> Self {
        Self {
            name: name.into(),
            merchants: merchants.into_iter().map(Into::into).collect(),
        }
    }

    /// Case-insensitive substring match against any merchant pattern
    pub fn matches(&self, description: &str) -> bool {
        let desc_lower = description.to_lowercase();
        self.merchants
            .iter()
            .any(|m| desc_lower.contains(&m.to_lowercase()))
    }
}

/// Aggregate statistics for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub count: usize,
    /// Absolute value of the signed sum
    pub total: f64,
    /// Signed sum of amounts
    pub raw_total: f64,
    /// Signed mean (`raw_total / count`)
    pub average: f64,
    /// Share of the sum of all categories' absolute totals, 0-100
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    /// `budget - total`; positive means under budget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation: Option<f64>,
}

impl CategorySummary {
    pub fn is_over_budget(&self) -> bool {
        self.deviation.is_some_and(|d| d < 0.0)
    }
}

/// Drill-down projection of a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub date: String,
    pub description: String,
    pub amount: f64,
}

impl From<Transaction> for TransactionDetail {
    fn from(tx: Transaction) -> Self {
        Self {
            date: tx.date,
            description: tx.description,
            amount: tx.amount,
        }
    }
}

/// Totals across every stored transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalStats {
    pub total_count: usize,
    /// Signed sum over all transactions
    pub total_amount: f64,
    pub average_amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction_defaults_to_uncategorized() {
        let tx = NewTransaction::new("2024-01-15", -5.5, "STARBUCKS");
        assert_eq!(tx.category, DEFAULT_CATEGORY);
        assert!(tx.nr_1.is_none());
    }

    #[test]
    fn test_with_category_leaves_original_untouched() {
        let tx = NewTransaction::new("2024-01-15", -5.5, "STARBUCKS");
        let tagged = tx.with_category("Restaurants");
        assert_eq!(tagged.category, "Restaurants");
        assert_eq!(tx.category, DEFAULT_CATEGORY);
        assert_eq!(tagged.description, tx.description);
    }

    #[test]
    fn test_category_matches_case_insensitive() {
        let cat = Category::new("Groceries", vec!["Harris Teeter", "COSTCO"]);
        assert!(cat.matches("HARRIS TEETER #1234 CHARLOTTE"));
        assert!(cat.matches("costco wholesale"));
        assert!(!cat.matches("SHELL GAS"));
    }

    #[test]
    fn test_summary_omits_absent_budget_in_json() {
        let summary = CategorySummary {
            category: "Gas".into(),
            count: 1,
            total: 12.0,
            raw_total: -12.0,
            average: -12.0,
            percentage: 100.0,
            budget: None,
            deviation: None,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("budget").is_none());
        assert!(json.get("deviation").is_none());
        assert!(!summary.is_over_budget());
    }
}
