//! Icon Upload, Fetch and Delete Handlers

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use super::extract::ApiQuery;
use super::response::ApiResponse;
use crate::error::AppError;
use crate::logo::sniff;
use crate::state::AppState;
use crate::storage::key_from_reference;

#[derive(Debug, Serialize)]
pub struct StoredObject {
    pub url: String,
    pub key: String,
}

/// Store the multipart field `file` under `uploads/`
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<StoredObject>>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let declared_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }

        let sniffed = sniff(&bytes);
        let extension = file_name
            .as_deref()
            .and_then(clean_extension)
            .or_else(|| sniffed.map(|kind| kind.extension().to_string()))
            .unwrap_or_else(|| "bin".to_string());
        let content_type = sniffed
            .map(|kind| kind.mime().to_string())
            .or_else(|| {
                file_name
                    .as_deref()
                    .and_then(|name| mime_guess::from_path(name).first_raw())
                    .map(str::to_string)
            })
            .or(declared_type)
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let hash = blake3::hash(&bytes).to_hex();
        let key = format!(
            "uploads/{}-{}.{}",
            Utc::now().timestamp_millis(),
            &hash.as_str()[..16],
            extension
        );

        let url = state.store.put(&key, bytes.to_vec(), &content_type).await?;
        info!(key = %key, size = bytes.len(), "file uploaded");
        return Ok(ApiResponse::with_message("File uploaded", StoredObject { url, key }));
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

/// Lowercase alphanumeric extension of a client-supplied file name
fn clean_extension(file_name: &str) -> Option<String> {
    let extension = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    let valid = !extension.is_empty()
        && extension.len() <= 8
        && extension.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(extension)
}

#[derive(Debug, Deserialize)]
pub struct FetchLogoQuery {
    pub url: Option<String>,
}

/// Pipeline failures are reported in a 200 body so the client can fall back
/// to a manual upload.
pub async fn fetch_logo(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<FetchLogoQuery>,
) -> Result<Response, AppError> {
    let url = query
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("url is required".to_string()))?;

    match state.logos.fetch(&url).await {
        Ok(logo) => Ok(ApiResponse::data(logo).into_response()),
        Err(e) => {
            warn!("Failed to fetch logo for {}: {}", url, e);
            Ok(Json(json!({
                "message": "Failed to fetch logo",
                "error": e.to_string(),
            }))
            .into_response())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteLogoQuery {
    pub filename: Option<String>,
}

/// Accepts an object key or a public URL returned by upload/fetch
pub async fn delete_logo(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<DeleteLogoQuery>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let reference = query
        .filename
        .ok_or_else(|| AppError::BadRequest("filename is required".to_string()))?;

    let key = key_from_reference(state.store.as_ref(), &reference)?;
    state.store.delete(&key).await?;

    info!(key = %key, "file deleted");
    Ok(ApiResponse::message("File deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_extension() {
        assert_eq!(clean_extension("Logo.PNG").as_deref(), Some("png"));
        assert_eq!(clean_extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(clean_extension("noext"), None);
        assert_eq!(clean_extension("evil.p/hp"), None);
        assert_eq!(clean_extension("x.verylongext"), None);
    }
}
