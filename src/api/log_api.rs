//! Recent Server Log

use axum::Json;

use super::response::ApiResponse;

/// Tail of the rolling log file, oldest first; empty when no file sink is configured
pub async fn recent_logs() -> Json<ApiResponse<Vec<String>>> {
    ApiResponse::data(rolling_logger::recent_lines())
}
