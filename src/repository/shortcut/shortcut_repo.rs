//! Shortcut Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for Shortcut CRUD operations.
//! Reordering lives in shortcut_positioning.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{DomainResult, Shortcut};
use super::super::db::Db;
use super::super::traits::Repository;

const SELECT_JOINED: &str = "SELECT s.id, s.groupId, s.orderNum, s.title, s.icon, s.internalNetwork, s.privateNetwork, g.name
     FROM shortcuts s
     JOIN groups g ON s.groupId = g.id";

/// SQLite implementation of Shortcut repository
pub struct ShortcutRepository {
    pub(super) conn: Db,
}

impl ShortcutRepository {
    pub fn new(conn: Db) -> Self {
        Self { conn }
    }

    /// Shortcuts of one group, in display order
    pub async fn list_by_group(&self, group_id: i64) -> DomainResult<Vec<Shortcut>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE s.groupId = ? ORDER BY s.orderNum, s.id",
            SELECT_JOINED
        ))?;
        let mut rows = stmt.query(params![group_id])?;

        let mut shortcuts = Vec::new();
        while let Some(row) = rows.next()? {
            shortcuts.push(row_to_shortcut(row)?);
        }
        Ok(shortcuts)
    }
}

#[async_trait]
impl Repository<Shortcut> for ShortcutRepository {
    async fn create(&self, entity: &Shortcut) -> DomainResult<Shortcut> {
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO shortcuts (groupId, orderNum, title, icon, internalNetwork, privateNetwork)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                entity.group_id,
                entity.order_num,
                entity.title,
                entity.icon,
                entity.internal_network,
                entity.private_network
            ],
        )?;

        let mut shortcut = entity.clone();
        shortcut.id = conn.last_insert_rowid();
        Ok(shortcut)
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Shortcut>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(&format!("{} WHERE s.id = ?", SELECT_JOINED))?;
        let mut rows = stmt.query(params![id])?;

        match rows.next()? {
            Some(row) => Ok(Some(row_to_shortcut(row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> DomainResult<Vec<Shortcut>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY g.sort, s.orderNum, s.id",
            SELECT_JOINED
        ))?;
        let mut rows = stmt.query([])?;

        let mut shortcuts = Vec::new();
        while let Some(row) = rows.next()? {
            shortcuts.push(row_to_shortcut(row)?);
        }
        Ok(shortcuts)
    }

    async fn update(&self, entity: &Shortcut) -> DomainResult<usize> {
        let conn = self.conn.lock().await;

        let changes = conn.execute(
            "UPDATE shortcuts
             SET groupId = ?, orderNum = ?, title = ?, icon = ?, internalNetwork = ?, privateNetwork = ?
             WHERE id = ?",
            params![
                entity.group_id,
                entity.order_num,
                entity.title,
                entity.icon,
                entity.internal_network,
                entity.private_network,
                entity.id
            ],
        )?;
        Ok(changes)
    }

    async fn delete(&self, id: i64) -> DomainResult<usize> {
        let conn = self.conn.lock().await;
        let changes = conn.execute("DELETE FROM shortcuts WHERE id = ?", params![id])?;
        Ok(changes)
    }
}

/// Convert a joined row to Shortcut
fn row_to_shortcut(row: &rusqlite::Row) -> DomainResult<Shortcut> {
    Ok(Shortcut {
        id: row.get(0)?,
        group_id: row.get(1)?,
        order_num: row.get(2)?,
        title: row.get(3)?,
        icon: row.get(4)?,
        internal_network: row.get(5)?,
        private_network: row.get(6)?,
        group_name: row.get(7)?,
    })
}
