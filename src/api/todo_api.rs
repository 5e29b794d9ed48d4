//! Todo Handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use super::extract::{ApiJson, ApiPath};
use super::response::ApiResponse;
use crate::domain::{require_text, DomainError, Todo, TodoPatch};
use crate::error::AppError;
use crate::repository::Repository;
use crate::state::AppState;

/// Incomplete first, newest first
pub async fn list_todos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Todo>>>, AppError> {
    Ok(ApiResponse::data(state.todos.list().await?))
}

#[derive(Debug, Deserialize)]
pub struct NewTodo {
    pub content: String,
}

pub async fn create_todo(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<NewTodo>,
) -> Result<Json<ApiResponse<Todo>>, AppError> {
    require_text("content", &body.content)?;

    let todo = state.todos.create(&Todo::new(0, body.content)).await?;
    info!(id = todo.id, "created todo");
    Ok(ApiResponse::data(todo))
}

/// Content, completion, or both; returns the stored row
pub async fn update_todo(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<TodoPatch>,
) -> Result<Json<ApiResponse<Todo>>, AppError> {
    if patch.is_empty() {
        return Err(AppError::BadRequest(
            "Nothing to update: provide content or completed".to_string(),
        ));
    }
    if let Some(content) = &patch.content {
        require_text("content", content)?;
    }

    let not_found = || DomainError::NotFound(format!("Todo {}", id));
    let existing = state.todos.find_by_id(id).await?.ok_or_else(not_found)?;

    state.todos.update(&patch.apply(existing)).await?;
    let updated = state.todos.find_by_id(id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::data(updated))
}

pub async fn delete_todo(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let changes = state.todos.delete(id).await?;
    info!(id, changes, "deleted todo");
    Ok(ApiResponse::changes(changes))
}
