//! Database access layer with connection pooling and migrations
//!
//! This module is organized by record type:
//! - `bowel_movements` - Bowel movement CRUD
//! - `meals` - Meal CRUD
//! - `symptoms` - Symptom CRUD (triggers stored as a JSON array)
//! - `medications` - Medication CRUD

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::{Error, Result};

mod bowel_movements;
mod meals;
mod medications;
mod symptoms;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "POO_DB_KEY";

/// Format used for every timestamp column
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Derive an encryption key from a passphrase using Argon2
///
/// The salt is fixed so the same passphrase always opens the same database,
/// wherever the file is moved.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this invalidates every existing encrypted database
    const APP_SALT: &[u8; 16] = b"poo-salt-v1-fix!";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let output = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(output.as_bytes()))
}

/// Render a timestamp the way it is stored
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Parse a stored timestamp
pub(crate) fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    chrono::NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

pub(crate) fn parse_optional_datetime(s: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    s.as_deref().map(parse_datetime).transpose()
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    db_path: String,
}

impl Database {
    /// Open an encrypted database
    ///
    /// Requires `POO_DB_KEY`. The SQLCipher key is derived from that
    /// passphrase with Argon2. Use `new_unencrypted()` for local testing.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for an unencrypted database.",
                DB_KEY_ENV
            ))),
        }
    }

    /// Open an unencrypted database
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open a database with an explicit passphrase (or none)
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            // Every pooled connection needs the key before first use
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

    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Backed by a temp file since SQLCipher does not share `:memory:`
    /// databases across pooled connections.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "poo_test_{}_{}.db",
            std::process::id(),
            id
        ));

        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path.to_string_lossy())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Count rows per record table, in schema order
    pub fn table_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        let conn = self.conn()?;
        let mut counts = Vec::with_capacity(4);
        for table in ["bowel_movements", "meals", "symptoms", "medications"] {
            let count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            counts.push((table, count));
        }
        Ok(counts)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- WAL: readers don't block the writer
            PRAGMA journal_mode = WAL;
            PRAGMA cache_size = 2000;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            CREATE TABLE IF NOT EXISTS bowel_movements (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                bristol_type INTEGER NOT NULL CHECK (bristol_type BETWEEN 1 AND 7),
                pain INTEGER NOT NULL CHECK (pain BETWEEN 1 AND 10),
                strain INTEGER NOT NULL CHECK (strain BETWEEN 1 AND 10),
                satisfaction INTEGER NOT NULL CHECK (satisfaction BETWEEN 1 AND 10),
                notes TEXT,
                recorded_at DATETIME NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_bowel_movements_user ON bowel_movements(user_id);
            CREATE INDEX IF NOT EXISTS idx_bowel_movements_recorded ON bowel_movements(recorded_at);

            CREATE TABLE IF NOT EXISTS meals (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                category TEXT,                              -- BREAKFAST, LUNCH, DINNER, SNACK
                calories INTEGER NOT NULL DEFAULT 0 CHECK (calories >= 0),
                fiber_rich BOOLEAN NOT NULL DEFAULT 0,
                dairy BOOLEAN NOT NULL DEFAULT 0,
                gluten BOOLEAN NOT NULL DEFAULT 0,
                spicy_level INTEGER CHECK (spicy_level BETWEEN 1 AND 10),
                meal_time DATETIME NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_meals_user ON meals(user_id);
            CREATE INDEX IF NOT EXISTS idx_meals_time ON meals(meal_time);

            CREATE TABLE IF NOT EXISTS symptoms (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                severity INTEGER NOT NULL CHECK (severity BETWEEN 1 AND 10),
                category TEXT,
                symptom_type TEXT,
                triggers TEXT NOT NULL DEFAULT '[]',        -- JSON array of strings
                recorded_at DATETIME NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_symptoms_user ON symptoms(user_id);
            CREATE INDEX IF NOT EXISTS idx_symptoms_recorded ON symptoms(recorded_at);

            CREATE TABLE IF NOT EXISTS medications (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                dosage TEXT,
                category TEXT,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                start_date DATETIME,
                end_date DATETIME,
                taken_at DATETIME,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_medications_user ON medications(user_id);
            CREATE INDEX IF NOT EXISTS idx_medications_start ON medications(start_date);
            "#,
        )?;

        info!(path = %self.db_path, "Database migrations complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
