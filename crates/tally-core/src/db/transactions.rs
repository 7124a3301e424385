//! Transaction operations

use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction};
use crate::store::TransactionStore;

const SELECT_COLUMNS: &str = "id, date, amount, description, category, nr_1, nr_2";

fn row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        nr_1: row.get(5)?,
        nr_2: row.get(6)?,
    })
}

impl Database {
    /// Bulk insert transactions
    ///
    /// All rows are written in one SQL transaction: either the whole batch is
    /// stored or none of it is.
    pub fn insert_transactions(&self, transactions: &[NewTransaction]) -> Result<usize> {
        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;

        let mut count = 0;
        {
            let mut stmt = db_tx.prepare(
                "INSERT INTO transactions (date, amount, description, category, nr_1, nr_2) VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            for tx in transactions {
                count += stmt.execute(params![
                    tx.date,
                    tx.amount,
                    tx.description,
                    tx.category,
                    tx.nr_1,
                    tx.nr_2,
                ])?;
            }
        }
        db_tx.commit()?;

        info!("Inserted {} transactions into database", count);
        Ok(count)
    }

    /// Update the category of a stored transaction
    pub fn update_category(&self, transaction_id: i64, category: &str) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE transactions SET category = ? WHERE id = ?",
            params![category, transaction_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("transaction {}", transaction_id)));
        }
        debug!(
            "Updated transaction {} to category '{}'",
            transaction_id, category
        );
        Ok(())
    }

    /// Every transaction, ordered by id
    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions ORDER BY id",
            SELECT_COLUMNS
        ))?;
        let transactions = stmt
            .query_map([], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Retrieved {} transactions from database", transactions.len());
        Ok(transactions)
    }

    /// Transactions in one category, ordered by id
    pub fn get_by_category(&self, category: &str) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE category = ? ORDER BY id",
            SELECT_COLUMNS
        ))?;
        let transactions = stmt
            .query_map(params![category], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(
            "Retrieved {} transactions for category '{}'",
            transactions.len(),
            category
        );
        Ok(transactions)
    }

    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE id = ?", SELECT_COLUMNS),
                params![id],
                row_to_transaction,
            )
            .optional()?;
        Ok(tx)
    }

    pub fn transaction_count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl TransactionStore for Database {
    fn all_transactions(&self) -> Result<Vec<Transaction>> {
        self.list_transactions()
    }

    fn transactions_in_category(&self, category: &str) -> Result<Vec<Transaction>> {
        self.get_by_category(category)
    }

    fn insert_transactions(&self, transactions: &[NewTransaction]) -> Result<usize> {
        Database::insert_transactions(self, transactions)
    }
}
