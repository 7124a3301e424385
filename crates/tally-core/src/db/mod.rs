//! Database access layer with connection pooling and migrations
//!
//! - `transactions` - Transaction inserts, lookups and the `TransactionStore` impl

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{debug, info};

use crate::error::Result;

mod transactions;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Path that selects a private in-memory database
pub const MEMORY_PATH: &str = ":memory:";

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file, or `:memory:`
    db_path: String,
}

impl Database {
    /// Open (creating if needed) the database at `path`
    ///
    /// `:memory:` is accepted and behaves like [`Database::in_memory`].
    pub fn open(path: &str) -> Result<Self> {
        if path == MEMORY_PATH {
            return Self::in_memory();
        }

        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(4).build(manager)?;
        Self::with_pool(pool, path)
    }

    /// Create an in-memory database
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub fn in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)?;
        Self::with_pool(pool, MEMORY_PATH)
    }

    fn with_pool(pool: DbPool, path: &str) -> Result<Self> {
        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;
        info!("Database initialized: {}", path);
        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path == MEMORY_PATH
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Delete every stored transaction and restart id assignment
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            DELETE FROM transactions;
            DELETE FROM sqlite_sequence WHERE name = 'transactions';
            "#,
        )?;
        info!("Database cleared");
        Ok(())
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        debug!("Creating database schema");
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Transactions
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL DEFAULT 'Uncategorized',
                nr_1 TEXT,                                 -- opaque source identifier
                nr_2 TEXT,                                 -- opaque source identifier
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_category ON transactions(category);
            CREATE INDEX IF NOT EXISTS idx_description ON transactions(description);
            "#,
        )?;

        Ok(())
    }
}
