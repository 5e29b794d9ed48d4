//! JSON envelope shared by the handlers: `{message, data?, changes?}`.

use axum::Json;
use serde::Serialize;

pub const SUCCESS: &str = "success";

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<usize>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Json<Self> {
        Self::with_message(SUCCESS, data)
    }

    pub fn with_message(message: &str, data: T) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            data: Some(data),
            changes: None,
        })
    }
}

impl ApiResponse<()> {
    pub fn changes(changes: usize) -> Json<Self> {
        Json(Self {
            message: SUCCESS.to_string(),
            data: None,
            changes: Some(changes),
        })
    }

    pub fn message(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            data: None,
            changes: None,
        })
    }
}

/// `data` of create responses
#[derive(Debug, Serialize)]
pub struct CreatedId {
    pub id: i64,
}
