//! SQLite Database
//!
//! Document store for analyses, accounts and raw prompts, using rusqlite with
//! r2d2 connection pooling. Opened once at startup and shared by handle.

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::ensure_parent;

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Database service for managing SQLite operations
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create an in-memory database for testing.
    ///
    /// A single pooled connection keeps every caller on the same in-memory
    /// database.
    pub fn new_in_memory() -> AppResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            // a recycled connection would start from an empty database
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)
            .map_err(|e| AppError::storage(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Open the database named by a `DATABASE_URL` value: a file path,
    /// `sqlite://<path>`, or `:memory:`.
    pub fn open(url: &str) -> AppResult<Self> {
        let url = url.trim();
        let target = url.strip_prefix("sqlite://").unwrap_or(url);
        if target.is_empty() {
            return Err(AppError::config("database location is empty"));
        }
        if target == ":memory:" {
            return Self::new_in_memory();
        }
        Self::open_file(Path::new(target))
    }

    /// Open (creating if needed) a database file with connection pooling
    pub fn open_file(path: &Path) -> AppResult<Self> {
        ensure_parent(path)?;

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")
        });
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| AppError::storage(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        tracing::info!(path = %path.display(), "database opened");

        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> AppResult<()> {
        let conn = self.get_connection()?;

        // Append-only analysis log. `seq` breaks ties between equal timestamps.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS analyses (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                user_id TEXT,
                business_idea TEXT NOT NULL,
                answers TEXT NOT NULL,
                analysis TEXT NOT NULL,
                created_at TEXT NOT NULL,
                created_at_ms INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_analyses_user_created
             ON analyses(user_id, created_at_ms DESC, seq DESC)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        // Raw prompts awaiting processing; written here, never read back.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS prompts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                prompt TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> AppResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| AppError::storage(format!("Failed to get connection: {}", e)))
    }

    /// Check if the database is healthy
    pub fn is_healthy(&self) -> bool {
        if let Ok(conn) = self.pool.get() {
            conn.query_row("SELECT 1", [], |_| Ok(())).is_ok()
        } else {
            false
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("pool_size", &self.pool.state().connections)
            .finish()
    }
}
