//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `accounts` - Bank account operations
//! - `expenses` - Expense rows, read back in their raw stored encodings
//! - `enrichments` - Persisted model enrichment results
//!
//! The `expenses.amount` column is deliberately declared without a type so
//! SQLite gives it BLOB affinity and stores each value exactly as written.
//! Rows accumulated over the schema's history carry text, integer-centavo,
//! and float amounts side by side; the normalizer decodes all three.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::{Error, Result};

mod accounts;
mod enrichments;
mod expenses;

pub use accounts::Account;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "CENTAVO_DB_KEY";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the
/// same key, regardless of database path. This allows moving/renaming/
/// restoring the database freely.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Fixed application salt - changing this would invalidate all existing encrypted databases
    const APP_SALT: &[u8; 16] = b"centavo-salt-v1.";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    // Extract the hash portion for use as SQLCipher key (hex encoded)
    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool with encryption
    ///
    /// Requires `CENTAVO_DB_KEY` environment variable to be set. The database
    /// is encrypted using SQLCipher with a key derived from the passphrase
    /// via Argon2.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Create a new unencrypted database connection pool
    ///
    /// WARNING: Only use for development or testing. For production, use
    /// `new()` with `CENTAVO_DB_KEY` set.
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Create a new database with an explicit encryption key
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            // Set the key on every new connection
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(10).build(manager)?
        } else {
            Pool::builder().max_size(10).build(manager)?
        };

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create an in-memory database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because SQLCipher
    /// has issues with in-memory databases in the connection pool.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = format!("/tmp/centavo_test_{}_{}.db", std::process::id(), id);

        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path)
    }

    /// Check if the database is encrypted
    pub fn is_encrypted(&self) -> Result<bool> {
        let conn = self.conn()?;
        // SQLCipher sets cipher_version if encryption is active
        let result: rusqlite::Result<String> =
            conn.query_row("PRAGMA cipher_version;", [], |row| row.get(0));
        Ok(result.is_ok() && std::env::var(DB_KEY_ENV).is_ok())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- WAL mode: better concurrency, readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Accounts (bank accounts)
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                account_type TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Expenses
            -- amount has no declared type on purpose: BLOB affinity keeps
            -- each value in whatever encoding it was inserted with
            -- (fixed-point text, integer centavos, or legacy float rows).
            -- is_synced_from_bank is similarly loose: older sync code wrote
            -- 'true'/'false' text where newer code writes 0/1.
            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY,
                account_id INTEGER REFERENCES accounts(id),
                amount,
                description TEXT NOT NULL,
                category TEXT,
                date DATE NOT NULL,
                is_synced_from_bank DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
            CREATE INDEX IF NOT EXISTS idx_expenses_account ON expenses(account_id);
            CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category);

            -- Enrichments (one row per expense, last write wins)
            CREATE TABLE IF NOT EXISTS enrichments (
                expense_id INTEGER PRIMARY KEY REFERENCES expenses(id) ON DELETE CASCADE,
                suggested_category TEXT NOT NULL,
                tags TEXT NOT NULL,
                notes TEXT NOT NULL,
                is_recurring BOOLEAN NOT NULL,
                risk_level TEXT NOT NULL,
                merchant_info TEXT,
                payment_info TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }

    /// Insert demo rows exercising every stored amount and flag encoding.
    ///
    /// Used by `centavo seed` and by tests that need realistic mixed-encoding
    /// data without an import path.
    pub fn seed_demo_data(&self) -> Result<()> {
        let conn = self.conn()?;

        let account_id = {
            conn.execute(
                "INSERT INTO accounts (name, account_type) VALUES (?1, ?2)",
                rusqlite::params!["Nubank", "checking"],
            )?;
            conn.last_insert_rowid()
        };

        // Fixed-point text amount, joined account, integer flag
        conn.execute(
            "INSERT INTO expenses (account_id, amount, description, category, date, is_synced_from_bank)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![account_id, "42.50", "iFood almoço", "Alimentação", "2026-08-02", 1],
        )?;
        // Integer centavos, text flag
        conn.execute(
            "INSERT INTO expenses (account_id, amount, description, category, date, is_synced_from_bank)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![account_id, 1999i64, "Uber para o aeroporto", "Transporte", "2026-08-10", "true"],
        )?;
        // Legacy float row, no account, date with time-of-day
        conn.execute(
            "INSERT INTO expenses (amount, description, category, date, is_synced_from_bank)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![15.9f64, "Netflix assinatura", "Lazer", "2026-08-15 09:30:00", 0],
        )?;
        conn.execute(
            "INSERT INTO expenses (account_id, amount, description, category, date, is_synced_from_bank)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![account_id, "1200.00", "Aluguel agosto", "Moradia", "2026-08-05", 0],
        )?;
        // Category outside the vocabulary, collapses to Outros on read
        conn.execute(
            "INSERT INTO expenses (amount, description, category, date, is_synced_from_bank)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params!["35.00", "Presente de aniversário", "gifts", "2026-07-20", 0],
        )?;

        info!("Seeded demo expenses");
        Ok(())
    }
}
