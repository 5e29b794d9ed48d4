//! User Repository
//!
//! Accounts for the database-backed login flow.

use rusqlite::{params, ErrorCode};

use crate::domain::{DomainError, DomainResult, User};
use super::db::Db;

pub struct UserRepository {
    conn: Db,
}

impl UserRepository {
    pub fn new(conn: Db) -> Self {
        Self { conn }
    }

    /// Insert a user with an already-hashed password, returning the new id
    pub async fn create(&self, username: &str, password_hash: &str) -> DomainResult<i64> {
        let conn = self.conn.lock().await;

        match conn.execute(
            "INSERT INTO users (username, password) VALUES (?, ?)",
            params![username, password_hash],
        ) {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(DomainError::InvalidInput(format!("Username {} is already taken", username)))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare("SELECT id, username, password FROM users WHERE username = ?")?;
        let mut rows = stmt.query(params![username])?;

        match rows.next()? {
            Some(row) => Ok(Some(row_to_user(row)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_id(&self, id: i64) -> DomainResult<Option<User>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare("SELECT id, username, password FROM users WHERE id = ?")?;
        let mut rows = stmt.query(params![id])?;

        match rows.next()? {
            Some(row) => Ok(Some(row_to_user(row)?)),
            None => Ok(None),
        }
    }

    pub async fn update_password(&self, id: i64, password_hash: &str) -> DomainResult<usize> {
        let conn = self.conn.lock().await;
        let changes = conn.execute(
            "UPDATE users SET password = ? WHERE id = ?",
            params![password_hash, id],
        )?;
        Ok(changes)
    }
}

fn row_to_user(row: &rusqlite::Row) -> DomainResult<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
    })
}
