//! Login, Registration and Password Handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use super::extract::ApiJson;
use super::response::ApiResponse;
use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub id: i64,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<Credentials>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = state.auth.login(&body.username, &body.password).await?;
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<Credentials>,
) -> Result<Json<RegisterResponse>, AppError> {
    let id = state.auth.register(&body.username, &body.password).await?;
    Ok(Json(RegisterResponse {
        message: "User registered".to_string(),
        id,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    ApiJson(body): ApiJson<PasswordChange>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state
        .auth
        .change_password(&claims, &body.old_password, &body.new_password)
        .await?;
    Ok(ApiResponse::message("Password changed"))
}
