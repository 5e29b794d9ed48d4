//! Shortcut Positioning Operations
//!
//! Operations for managing shortcut order within and across groups.
//! Batch updates are applied in a single transaction.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{DomainResult, ShortcutOrder, ShortcutPosition};

/// Trait for shortcut positioning operations
#[async_trait]
pub trait ShortcutPositioningOperations {
    /// Next free order number in a group (used in create)
    async fn next_order_num(&self, group_id: i64) -> DomainResult<i64>;

    /// Set group and order for each listed shortcut. Returns the number of rows
    /// matched; unknown ids count as 0. Any failure rolls the whole batch back.
    async fn apply_positions(&self, positions: &[ShortcutPosition]) -> DomainResult<usize>;

    /// Reorder shortcuts inside one group. Entries whose id belongs to another
    /// group are ignored.
    async fn reorder_in_group(&self, group_id: i64, orders: &[ShortcutOrder]) -> DomainResult<usize>;
}

#[async_trait]
impl ShortcutPositioningOperations for super::shortcut_repo::ShortcutRepository {
    async fn next_order_num(&self, group_id: i64) -> DomainResult<i64> {
        let conn = self.conn.lock().await;
        let next = conn.query_row(
            "SELECT COALESCE(MAX(orderNum), -1) + 1 FROM shortcuts WHERE groupId = ?",
            params![group_id],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    async fn apply_positions(&self, positions: &[ShortcutPosition]) -> DomainResult<usize> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let mut changes = 0;
        {
            let mut stmt = tx.prepare("UPDATE shortcuts SET groupId = ?, orderNum = ? WHERE id = ?")?;
            for position in positions {
                changes += stmt.execute(params![position.group_id, position.order_num, position.id])?;
            }
        }

        tx.commit()?;
        Ok(changes)
    }

    async fn reorder_in_group(&self, group_id: i64, orders: &[ShortcutOrder]) -> DomainResult<usize> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let mut changes = 0;
        {
            let mut stmt =
                tx.prepare("UPDATE shortcuts SET orderNum = ? WHERE id = ? AND groupId = ?")?;
            for order in orders {
                changes += stmt.execute(params![order.order_num, order.id, group_id])?;
            }
        }

        tx.commit()?;
        Ok(changes)
    }
}
