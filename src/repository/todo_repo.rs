//! Todo Repository
//!
//! Handles all todo-related database operations.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{DomainResult, Todo};
use super::db::Db;
use super::traits::Repository;

pub struct TodoRepository {
    conn: Db,
}

impl TodoRepository {
    pub fn new(conn: Db) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Repository<Todo> for TodoRepository {
    async fn create(&self, entity: &Todo) -> DomainResult<Todo> {
        let conn = self.conn.lock().await;

        let now = chrono::Utc::now().timestamp_millis();
        conn.execute(
            "INSERT INTO todos (content, completed, createTime, updateTime) VALUES (?, ?, ?, ?)",
            params![entity.content, entity.completed, now, now],
        )?;

        Ok(Todo {
            id: conn.last_insert_rowid(),
            create_time: now,
            update_time: now,
            ..entity.clone()
        })
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Todo>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(
            "SELECT id, content, completed, createTime, updateTime FROM todos WHERE id = ?",
        )?;
        let mut rows = stmt.query(params![id])?;

        match rows.next()? {
            Some(row) => Ok(Some(row_to_todo(row)?)),
            None => Ok(None),
        }
    }

    /// Incomplete first, then newest first
    async fn list(&self) -> DomainResult<Vec<Todo>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(
            "SELECT id, content, completed, createTime, updateTime FROM todos
             ORDER BY completed ASC, createTime DESC, id DESC",
        )?;
        let mut rows = stmt.query([])?;

        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(row_to_todo(row)?);
        }
        Ok(todos)
    }

    /// Also bumps `updateTime`
    async fn update(&self, entity: &Todo) -> DomainResult<usize> {
        let conn = self.conn.lock().await;

        let changes = conn.execute(
            "UPDATE todos SET content = ?, completed = ?, updateTime = ? WHERE id = ?",
            params![
                entity.content,
                entity.completed,
                chrono::Utc::now().timestamp_millis(),
                entity.id
            ],
        )?;
        Ok(changes)
    }

    async fn delete(&self, id: i64) -> DomainResult<usize> {
        let conn = self.conn.lock().await;
        let changes = conn.execute("DELETE FROM todos WHERE id = ?", params![id])?;
        Ok(changes)
    }
}

fn row_to_todo(row: &rusqlite::Row) -> DomainResult<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        content: row.get(1)?,
        completed: row.get::<_, i64>(2)? != 0,
        create_time: row.get(3)?,
        update_time: row.get(4)?,
    })
}
