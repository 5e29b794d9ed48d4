//! Database Connection and Setup
//!
//! Manages the SQLite connection and migrations.

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::{DomainError, DomainResult};

/// Shared handle to the single SQLite connection
pub type Db = Arc<Mutex<Connection>>;

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Database(e.to_string())
    }
}

/// Group name given to first-generation rows that had no `groupName`
const LEGACY_DEFAULT_GROUP: &str = "Default";

const CREATE_SHORTCUTS: &str = "CREATE TABLE IF NOT EXISTS shortcuts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    groupId INTEGER NOT NULL REFERENCES groups(id),
    orderNum INTEGER NOT NULL DEFAULT 0,
    title TEXT NOT NULL,
    icon TEXT,
    internalNetwork TEXT,
    privateNetwork TEXT
)";

/// Open (or create) the database at `db_path` and run migrations.
///
/// `:memory:` opens a private in-memory database.
pub async fn init_db(db_path: &Path) -> DomainResult<Db> {
    let mut conn = if db_path.as_os_str() == ":memory:" {
        Connection::open_in_memory()?
    } else {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DomainError::Internal(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }
        Connection::open(db_path)?
    };

    conn.execute_batch("PRAGMA foreign_keys = ON")?;
    run_migrations(&mut conn)?;

    info!(path = %db_path.display(), "database ready");
    Ok(Arc::new(Mutex::new(conn)))
}

fn table_exists(conn: &Connection, table: &str) -> DomainResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
pub(crate) fn run_migrations(conn: &mut Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS groups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            sort INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    // First-generation databases stored the group as free text on each shortcut
    if table_exists(conn, "shortcuts")?
        && column_exists(conn, "shortcuts", "groupName")?
        && !column_exists(conn, "shortcuts", "groupId")?
    {
        migrate_legacy_shortcuts(conn)?;
    }

    conn.execute(CREATE_SHORTCUTS, [])?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_shortcuts_group ON shortcuts(groupId, orderNum)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            createTime INTEGER NOT NULL,
            updateTime INTEGER NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Turn distinct `groupName` values into groups and rebuild `shortcuts` with a
/// `groupId` foreign key. All or nothing.
fn migrate_legacy_shortcuts(conn: &mut Connection) -> DomainResult<()> {
    let tx = conn.transaction()?;

    let names: Vec<String> = {
        let mut stmt = tx.prepare(
            "SELECT COALESCE(groupName, ?) AS name FROM shortcuts GROUP BY name ORDER BY MIN(id)",
        )?;
        let rows = stmt.query_map(params![LEGACY_DEFAULT_GROUP], |row| row.get(0))?;
        rows.collect::<Result<_, _>>()?
    };

    for (sort, name) in names.iter().enumerate() {
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM groups WHERE name = ?)",
            params![name],
            |row| row.get(0),
        )?;
        if !exists {
            tx.execute(
                "INSERT INTO groups (name, sort) VALUES (?, ?)",
                params![name, sort as i64],
            )?;
        }
    }

    tx.execute("ALTER TABLE shortcuts RENAME TO shortcuts_legacy", [])?;
    tx.execute(CREATE_SHORTCUTS, [])?;
    tx.execute(
        "INSERT INTO shortcuts (id, groupId, orderNum, title, icon, internalNetwork, privateNetwork)
         SELECT s.id,
                (SELECT MIN(g.id) FROM groups g WHERE g.name = COALESCE(s.groupName, ?)),
                COALESCE(s.orderNum, 0),
                COALESCE(s.title, ''),
                s.icon,
                s.internalNetwork,
                s.privateNetwork
         FROM shortcuts_legacy s",
        params![LEGACY_DEFAULT_GROUP],
    )?;
    tx.execute("DROP TABLE shortcuts_legacy", [])?;

    tx.commit()?;
    info!(groups = names.len(), "migrated legacy shortcuts table");
    Ok(())
}
