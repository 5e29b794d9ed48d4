//! Shortcut and Group Handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::response::{ApiResponse, CreatedId, SUCCESS};
use crate::domain::{
    require_text, DomainError, Group, GroupPatch, Shortcut, ShortcutOrder, ShortcutPatch,
    ShortcutPosition,
};
use crate::error::AppError;
use crate::repository::{Repository, ShortcutPositioningOperations};
use crate::state::AppState;

// ========================
// Shortcuts
// ========================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutQuery {
    pub group_id: Option<i64>,
}

/// List shortcuts with their group name, optionally for one group
pub async fn list_shortcuts(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ShortcutQuery>,
) -> Result<Json<ApiResponse<Vec<Shortcut>>>, AppError> {
    let shortcuts = match query.group_id {
        Some(group_id) => state.shortcuts.list_by_group(group_id).await?,
        None => state.shortcuts.list().await?,
    };
    Ok(ApiResponse::data(shortcuts))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShortcut {
    pub group_id: i64,
    pub order_num: Option<i64>,
    pub title: String,
    pub icon: Option<String>,
    pub internal_network: Option<String>,
    pub private_network: Option<String>,
}

/// Create a shortcut, appending it to its group when no position is given
pub async fn create_shortcut(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<NewShortcut>,
) -> Result<Json<ApiResponse<CreatedId>>, AppError> {
    require_text("title", &body.title)?;

    let order_num = match body.order_num {
        Some(order_num) => order_num,
        None => state.shortcuts.next_order_num(body.group_id).await?,
    };

    let mut shortcut = Shortcut::new(0, body.group_id, order_num, body.title);
    shortcut.icon = body.icon;
    shortcut.internal_network = body.internal_network;
    shortcut.private_network = body.private_network;

    let created = state.shortcuts.create(&shortcut).await?;
    info!(id = created.id, group_id = created.group_id, "created shortcut");
    Ok(ApiResponse::data(CreatedId { id: created.id }))
}

pub async fn update_shortcut(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<ShortcutPatch>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if let Some(title) = &patch.title {
        require_text("title", title)?;
    }

    let existing = state
        .shortcuts
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Shortcut {}", id)))?;

    let changes = state.shortcuts.update(&patch.apply(existing)).await?;
    Ok(ApiResponse::changes(changes))
}

pub async fn delete_shortcut(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let changes = state.shortcuts.delete(id).await?;
    info!(id, changes, "deleted shortcut");
    Ok(ApiResponse::changes(changes))
}

#[derive(Debug, Deserialize)]
pub struct PositionBatch {
    pub shortcuts: Vec<ShortcutPosition>,
}

/// Move any number of shortcuts, possibly across groups, in one transaction
pub async fn reorder_shortcuts(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<PositionBatch>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let changes = state.shortcuts.apply_positions(&body.shortcuts).await?;
    info!(requested = body.shortcuts.len(), changes, "reordered shortcuts");
    Ok(ApiResponse::changes(changes))
}

#[derive(Debug, Deserialize)]
pub struct OrderBatch {
    pub shortcuts: Vec<ShortcutOrder>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupReorderResponse {
    pub message: String,
    pub group_id: i64,
    pub changes: usize,
}

/// Reorder shortcuts inside one group; rows from other groups are left alone
pub async fn reorder_group_shortcuts(
    State(state): State<Arc<AppState>>,
    ApiPath(group_id): ApiPath<i64>,
    ApiJson(body): ApiJson<OrderBatch>,
) -> Result<Json<GroupReorderResponse>, AppError> {
    let changes = state.shortcuts.reorder_in_group(group_id, &body.shortcuts).await?;
    Ok(Json(GroupReorderResponse {
        message: SUCCESS.to_string(),
        group_id,
        changes,
    }))
}

// ========================
// Groups
// ========================

pub async fn list_groups(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Group>>>, AppError> {
    Ok(ApiResponse::data(state.groups.list().await?))
}

#[derive(Debug, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub sort: Option<i64>,
}

pub async fn create_group(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<NewGroup>,
) -> Result<Json<ApiResponse<CreatedId>>, AppError> {
    require_text("name", &body.name)?;

    let sort = match body.sort {
        Some(sort) => sort,
        None => state.groups.next_sort().await?,
    };

    let created = state.groups.create(&Group::new(0, body.name, sort)).await?;
    info!(id = created.id, name = %created.name, "created group");
    Ok(ApiResponse::data(CreatedId { id: created.id }))
}

pub async fn update_group(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<GroupPatch>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if let Some(name) = &patch.name {
        require_text("name", name)?;
    }

    let existing = state
        .groups
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Group {}", id)))?;

    let changes = state.groups.update(&patch.apply(existing)).await?;
    Ok(ApiResponse::changes(changes))
}

/// Fails while the group still owns shortcuts
pub async fn delete_group(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let changes = state.groups.delete(id).await?;
    info!(id, changes, "deleted group");
    Ok(ApiResponse::changes(changes))
}
