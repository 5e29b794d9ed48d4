//! Group Repository
//!
//! SQLite-backed implementation of Repository<Group>.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{DomainResult, Group};
use super::db::Db;
use super::traits::Repository;

pub struct GroupRepository {
    conn: Db,
}

impl GroupRepository {
    pub fn new(conn: Db) -> Self {
        Self { conn }
    }

    /// Sort value placing a new group after all existing ones
    pub async fn next_sort(&self) -> DomainResult<i64> {
        let conn = self.conn.lock().await;
        let next = conn.query_row("SELECT COALESCE(MAX(sort), -1) + 1 FROM groups", [], |row| {
            row.get(0)
        })?;
        Ok(next)
    }
}

#[async_trait]
impl Repository<Group> for GroupRepository {
    async fn create(&self, entity: &Group) -> DomainResult<Group> {
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO groups (name, sort) VALUES (?, ?)",
            params![entity.name, entity.sort],
        )?;

        let mut group = entity.clone();
        group.id = conn.last_insert_rowid();
        Ok(group)
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Group>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare("SELECT id, name, sort FROM groups WHERE id = ?")?;
        let mut rows = stmt.query(params![id])?;

        match rows.next()? {
            Some(row) => Ok(Some(row_to_group(row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> DomainResult<Vec<Group>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare("SELECT id, name, sort FROM groups ORDER BY sort, id")?;
        let mut rows = stmt.query([])?;

        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            groups.push(row_to_group(row)?);
        }
        Ok(groups)
    }

    async fn update(&self, entity: &Group) -> DomainResult<usize> {
        let conn = self.conn.lock().await;

        let changes = conn.execute(
            "UPDATE groups SET name = ?, sort = ? WHERE id = ?",
            params![entity.name, entity.sort, entity.id],
        )?;
        Ok(changes)
    }

    /// Fails with a foreign key error while the group still owns shortcuts
    async fn delete(&self, id: i64) -> DomainResult<usize> {
        let conn = self.conn.lock().await;
        let changes = conn.execute("DELETE FROM groups WHERE id = ?", params![id])?;
        Ok(changes)
    }
}

fn row_to_group(row: &rusqlite::Row) -> DomainResult<Group> {
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        sort: row.get(2)?,
    })
}
