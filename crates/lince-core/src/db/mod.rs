//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `customers` - Customers and their tracked vehicles
//! - `invoices` - Monthly invoices, generation, status toggles
//! - `expenses` - Business expenses and overdue refresh
//! - `proposals` - Commercial proposals and numbering
//! - `audit` - Audit log of API and CLI actions

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use tracing::{info, warn};

use crate::error::{Error, Result};

mod audit;
mod customers;
mod expenses;
mod invoices;
mod proposals;

pub use expenses::ExpenseFilter;
pub use invoices::InvoiceFilter;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "LINCE_DB_KEY";

/// Date format used for every date column
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this invalidates every existing encrypted database
    const APP_SALT: &[u8; 16] = b"lince-salt-v1-fx";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Read a `YYYY-MM-DD` column
pub(crate) fn date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a nullable `YYYY-MM-DD` column
pub(crate) fn opt_date_column(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<NaiveDate>> {
    let s: Option<String> = row.get(idx)?;
    s.filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

/// Read a text column holding an enum value
pub(crate) fn enum_column<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let s: String = row.get(idx)?;
    s.parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

pub(crate) fn date_param(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Run `f` inside an explicit transaction, rolling back on any error
pub(crate) fn in_transaction<T>(conn: &DbConn, f: impl FnOnce(&DbConn) -> Result<T>) -> Result<T> {
    conn.execute("BEGIN IMMEDIATE TRANSACTION", [])?;

    match f(conn) {
        Ok(value) => {
            conn.execute("COMMIT", [])?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = conn.execute("ROLLBACK", []) {
                warn!(error = %rollback_err, "Failed to roll back transaction");
            }
            Err(e)
        }
    }
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
    /// Set while the pool cannot hand out connections
    degraded: Arc<AtomicBool>,
}

impl Database {
    /// Create a new database connection pool with encryption
    ///
    /// Requires `LINCE_DB_KEY` environment variable to be set.
    /// The database will be encrypted using SQLCipher with a key derived
    /// from the passphrase via Argon2.
    pub fn new(path: &str) -> Result<Self> {
        let encryption_key = std::env::var(DB_KEY_ENV).ok();
        match encryption_key {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended for production).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Create a new unencrypted database connection pool
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Create a new database with an explicit encryption key
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        // Foreign keys are per-connection in SQLite
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let init = format!("PRAGMA key = 'x\"{}\"'; PRAGMA foreign_keys = ON;", key);
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&init)?;
                Ok(())
            });
            Pool::builder().max_size(10).build(manager)?
        } else {
            let manager =
                manager.with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
            Pool::builder().max_size(10).build(manager)?
        };

        let db = Self {
            pool,
            db_path: path.to_string(),
            degraded: Arc::new(AtomicBool::new(false)),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because SQLCipher
    /// has issues with in-memory databases in the connection pool.
    pub fn in_memory() -> Result<Self> {
        static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "lince_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let path = path.to_string_lossy().to_string();

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path, suffix));
        }

        Self::new_unencrypted(&path)
    }

    /// A database whose pool can never open a connection (for testing degraded mode)
    ///
    /// Every checkout times out quickly, so callers see `Error::Pool`.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn unavailable() -> Self {
        let path = std::env::temp_dir()
            .join(format!("lince_missing_{}", std::process::id()))
            .join("nested")
            .join("unreachable.db");
        let manager = SqliteConnectionManager::file(&path)
            .with_flags(rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE);
        let pool = Pool::builder()
            .max_size(1)
            .min_idle(Some(0))
            .connection_timeout(std::time::Duration::from_millis(200))
            .build_unchecked(manager);

        Self {
            pool,
            db_path: path.to_string_lossy().to_string(),
            degraded: Arc::new(AtomicBool::new(false)),
        }
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
    ///
    /// Failures flip the degraded flag; the next successful checkout clears it.
    pub fn conn(&self) -> Result<DbConn> {
        match self.pool.get() {
            Ok(conn) => {
                if self.degraded.swap(false, Ordering::SeqCst) {
                    info!("Database connection restored");
                }
                Ok(conn)
            }
            Err(e) => {
                if !self.degraded.swap(true, Ordering::SeqCst) {
                    warn!(error = %e, "Database unavailable, running degraded");
                }
                Err(e.into())
            }
        }
    }

    /// Whether the last connection attempt failed
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    /// Round-trip a trivial query
    pub fn health_check(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Customers of the tracking service
            CREATE TABLE IF NOT EXISTS customers (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                tax_id TEXT NOT NULL,                    -- CNPJ or CPF
                state_registration TEXT,
                birth_date TEXT,                         -- YYYY-MM-DD
                phone TEXT NOT NULL,
                email TEXT,
                address TEXT NOT NULL DEFAULT '',
                district TEXT NOT NULL DEFAULT '',
                city TEXT NOT NULL DEFAULT '',
                state TEXT NOT NULL DEFAULT 'PR',
                zip_code TEXT,
                monthly_fee REAL NOT NULL DEFAULT 79.90,
                due_day TEXT NOT NULL DEFAULT '10',      -- '1'..'31'
                active INTEGER NOT NULL DEFAULT 1,
                platform_login TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_customers_active ON customers(active);

            -- Tracked vehicles, owned by a customer
            CREATE TABLE IF NOT EXISTS vehicles (
                id INTEGER PRIMARY KEY,
                customer_id INTEGER NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
                description TEXT NOT NULL DEFAULT '',
                plate TEXT NOT NULL DEFAULT '',
                tracker_model TEXT NOT NULL DEFAULT '',
                device_id TEXT NOT NULL DEFAULT '',      -- IMEI
                has_lock INTEGER NOT NULL DEFAULT 0,
                chip_number TEXT NOT NULL DEFAULT '',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_vehicles_customer ON vehicles(customer_id);

            -- Monthly invoices
            -- customer_name is denormalized so invoices survive customer deletion
            CREATE TABLE IF NOT EXISTS invoices (
                id INTEGER PRIMARY KEY,
                customer_id INTEGER REFERENCES customers(id) ON DELETE SET NULL,
                customer_name TEXT NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                vehicle_count INTEGER NOT NULL DEFAULT 0,
                due_date TEXT NOT NULL,                  -- YYYY-MM-DD
                issue_date TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',  -- pending, paid
                whatsapp_sent INTEGER NOT NULL DEFAULT 0,
                notes TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(customer_id, due_date)
            );

            CREATE INDEX IF NOT EXISTS idx_invoices_due_date ON invoices(due_date);

            -- Business expenses
            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                category TEXT NOT NULL,                  -- Portuguese category label
                amount REAL NOT NULL,
                due_date TEXT NOT NULL,
                payment_date TEXT,
                status TEXT NOT NULL DEFAULT 'pending',  -- pending, paid, overdue
                vendor TEXT,
                notes TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_expenses_due_date ON expenses(due_date);
            CREATE INDEX IF NOT EXISTS idx_expenses_status ON expenses(status);

            -- Commercial proposals
            CREATE TABLE IF NOT EXISTS proposals (
                id INTEGER PRIMARY KEY,
                number INTEGER NOT NULL UNIQUE,
                person_type TEXT NOT NULL DEFAULT 'individual',
                prospect_name TEXT NOT NULL,
                prospect_contact TEXT NOT NULL DEFAULT '',
                prospect_email TEXT NOT NULL DEFAULT '',
                prospect_phone TEXT NOT NULL,
                prospect_document TEXT NOT NULL,
                prospect_city TEXT NOT NULL DEFAULT '',
                prospect_state TEXT NOT NULL DEFAULT 'PR',
                equipment_type TEXT NOT NULL,
                plan TEXT NOT NULL,
                monthly_price REAL NOT NULL,             -- per vehicle
                vehicle_count INTEGER NOT NULL DEFAULT 1,
                free_installation INTEGER NOT NULL DEFAULT 1,
                installation_price REAL,
                permanence_months INTEGER NOT NULL DEFAULT 12,
                notes TEXT,
                status TEXT NOT NULL DEFAULT 'pending',  -- pending, sent, approved, rejected
                valid_until TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Audit log for every API/CLI access
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                user_email TEXT NOT NULL,
                action TEXT NOT NULL,
                entity_type TEXT,
                entity_id INTEGER,
                details TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}

/// Audit log entry
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub user_email: String,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
}

#[cfg(test)]
mod tests;
