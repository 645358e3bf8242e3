//! Database Connection and Setup
//!
//! Opens the SQLite connection shared by all repositories and creates the
//! tables named by the configuration.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::TaggableConfig;
use crate::domain::DomainResult;
use super::sql::{quote, Sql};

/// How long a connection waits for another connection's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    conn: Arc<Mutex<Connection>>,
}

impl DbState {
    /// Wrap an already opened connection
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Shared handle to the connection
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }
}

/// Open the database at `db_path` (`:memory:` for a private in-memory
/// database) and run migrations for `config`
pub async fn init_db(db_path: &Path, config: &TaggableConfig) -> DomainResult<DbState> {
    config.validate()?;

    let conn = Connection::open(db_path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    run_migrations(&conn, config)?;
    log::info!("Database ready at {}", db_path.display());

    Ok(DbState::new(conn))
}

/// Begin a transaction that takes the write lock up front.
///
/// A deferred transaction that reads before writing cannot be upgraded while
/// another connection holds the lock; SQLite then fails with `SQLITE_BUSY`
/// without waiting. `BEGIN IMMEDIATE` waits for the busy timeout instead.
pub(crate) fn begin_write(conn: &mut Connection) -> DomainResult<Transaction<'_>> {
    Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote(table)))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Create owner, tag and junction tables if they don't exist
pub fn run_migrations(conn: &Connection, config: &TaggableConfig) -> DomainResult<()> {
    let o = quote(&config.owner.table);
    let o_key = quote(&config.owner.key_column);
    let t = quote(&config.tag.table);
    let t_key = quote(&config.tag.key_column);
    let t_name = quote(&config.tag.name_column);
    let j = quote(&config.junction.table);
    let j_tag = quote(&config.junction.tag_key_column);
    let j_owner = quote(&config.junction.owner_key_column);

    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {} (
                {} INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL
            )",
            o, o_key
        ),
        [],
    )?;

    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {} (
                {} INTEGER PRIMARY KEY AUTOINCREMENT,
                {} TEXT NOT NULL
            )",
            t, t_key, t_name
        ),
        [],
    )?;

    // Closes the create-on-demand race at the store level
    conn.execute(
        &format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {}({})",
            quote(&format!("idx_{}_{}", config.tag.table, config.tag.name_column)),
            t,
            t_name
        ),
        [],
    )?;

    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {} (
                {} INTEGER NOT NULL,
                {} INTEGER NOT NULL REFERENCES {}({}) ON DELETE CASCADE,
                PRIMARY KEY ({}, {})
            )",
            j, j_owner, j_tag, t, t_key, j_owner, j_tag
        ),
        [],
    )?;

    conn.execute(
        &format!(
            "CREATE INDEX IF NOT EXISTS {} ON {}({})",
            quote(&format!("idx_{}_{}", config.junction.table, config.junction.tag_key_column)),
            j,
            j_tag
        ),
        [],
    )?;

    if let Some(ord) = &config.junction.order_column {
        if !column_exists(conn, &config.junction.table, ord)? {
            conn.execute(
                &format!(
                    "ALTER TABLE {} ADD COLUMN {} INTEGER NOT NULL DEFAULT 0",
                    j,
                    quote(ord)
                ),
                [],
            )?;
        }
    }

    if let Some(count) = &config.tag.count_column {
        if !column_exists(conn, &config.tag.table, count)? {
            let c = quote(count);
            conn.execute(
                &format!("ALTER TABLE {} ADD COLUMN {} INTEGER NOT NULL DEFAULT 0", t, c),
                [],
            )?;

            // Counter added to a table that may already have links: backfill
            let backfilled = conn.execute(&Sql::new(config).recount_all, [])?;
            log::info!("Added counter column to {} ({} rows backfilled)", config.tag.table, backfilled);
        }
    }

    Ok(())
}
