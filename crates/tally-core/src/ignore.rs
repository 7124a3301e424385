//! Ignore-pattern filtering
//!
//! Drops transactions whose description contains any configured pattern
//! (case-insensitive substring) before they reach the categorizer.

use tracing::{debug, info, Span};

use crate::models::NewTransaction;

/// Transactions that survived filtering plus the number removed
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub kept: Vec<NewTransaction>,
    pub removed: usize,
}

/// Filters transactions against an ordered list of ignore patterns
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    /// Lower-cased once at construction
    patterns: Vec<String>,
    span: Span,
}

impl IgnoreFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns: Vec<String> = patterns.iter().map(|p| p.as_ref().to_lowercase()).collect();
        Self {
            patterns,
            span: tracing::info_span!("ignore_filter"),
        }
    }

    /// Record this filter's events inside `span` instead of the default one
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True if the description contains any ignore pattern
    pub fn should_ignore(&self, description: &str) -> bool {
        self.matching_pattern(description).is_some()
    }

    /// The first ignore pattern contained in the description, if any
    pub fn matching_pattern(&self, description: &str) -> Option<&str> {
        let desc_lower = description.to_lowercase();
        let pattern = self
            .patterns
            .iter()
            .find(|p| desc_lower.contains(p.as_str()))?;
        self.span.in_scope(|| {
            debug!(
                "Transaction matches ignore pattern '{}': {}",
                pattern, description
            )
        });
        Some(pattern.as_str())
    }

    /// Keep every transaction that matches no ignore pattern, in input order
    pub fn filter_transactions(&self, transactions: Vec<NewTransaction>) -> FilterOutcome {
        let _enter = self.span.enter();
        debug!(
            "Filtering {} transactions with {} ignore patterns: {:?}",
            transactions.len(),
            self.patterns.len(),
            self.patterns
        );

        let original_count = transactions.len();
        let kept: Vec<NewTransaction> = transactions
            .into_iter()
            .filter(|t| !self.should_ignore(&t.description))
            .collect();
        let removed = original_count - kept.len();

        if removed > 0 {
            info!(
                "Filtered out {} transactions ({:.1}%)",
                removed,
                removed as f64 / original_count as f64 * 100.0
            );
        } else {
            info!("No transactions matched ignore patterns");
        }

        FilterOutcome { kept, removed }
    }
}
