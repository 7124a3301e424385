//! Transaction storage abstraction
//!
//! The analytics engine only ever sees stored transactions through
//! [`TransactionStore`]. [`Database`](crate::db::Database) is the SQLite
//! implementation; [`MemoryStore`] keeps everything in a `Vec`.

use std::sync::{Mutex, MutexGuard};

use crate::error::Result;
use crate::models::{NewTransaction, Transaction};

pub trait TransactionStore {
    /// Every stored transaction in insertion order
    fn all_transactions(&self) -> Result<Vec<Transaction>>;

    /// Transactions whose category equals `category` exactly, in insertion order
    fn transactions_in_category(&self, category: &str) -> Result<Vec<Transaction>>;

    /// Persist a batch, assigning an id to each record. Returns the number inserted.
    fn insert_transactions(&self, transactions: &[NewTransaction]) -> Result<usize>;
}

/// Vec-backed store with sequential ids starting at 1
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Transaction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `transactions`
    pub fn with_transactions(transactions: &[NewTransaction]) -> Self {
        let store = Self::new();
        store.push_all(transactions);
        store
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    fn rows(&self) -> MutexGuard<'_, Vec<Transaction>> {
        // A poisoned lock still holds fully-written rows
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push_all(&self, transactions: &[NewTransaction]) -> usize {
        let mut rows = self.rows();
        for tx in transactions {
            let id = rows.len() as i64 + 1;
            rows.push(Transaction {
                id,
                date: tx.date.clone(),
                amount: tx.amount,
                description: tx.description.clone(),
                category: tx.category.clone(),
                nr_1: tx.nr_1.clone(),
                nr_2: tx.nr_2.clone(),
            });
        }
        transactions.len()
    }
}

impl TransactionStore for MemoryStore {
    fn all_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.rows().clone())
    }

    fn transactions_in_category(&self, category: &str) -> Result<Vec<Transaction>> {
        Ok(self
            .rows()
            .iter()
            .filter(|t| t.category == category)
            .cloned()
            .collect())
    }

    fn insert_transactions(&self, transactions: &[NewTransaction]) -> Result<usize> {
        Ok(self.push_all(transactions))
    }
}
