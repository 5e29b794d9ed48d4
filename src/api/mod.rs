//! HTTP API
//!
//! Route table for `/api`, the auth layer on the protected routes, and the
//! static file services around it.

mod auth_api;
mod extract;
mod log_api;
mod logo_api;
mod response;
mod shortcut_api;
mod todo_api;


pub use response::{ApiResponse, CreatedId};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_SECURITY_POLICY, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::auth::require_auth;
use crate::config::StorageConfig;
use crate::state::AppState;

use auth_api::{change_password, login, register};
use log_api::recent_logs;
use logo_api::{delete_logo, fetch_logo, upload};
use shortcut_api::{
    create_group, create_shortcut, delete_group, delete_shortcut, list_groups, list_shortcuts,
    reorder_group_shortcuts, reorder_shortcuts, update_group, update_shortcut,
};
use todo_api::{create_todo, delete_todo, list_todos, update_todo};

/// `/api` routes only
pub fn router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/login", post(login))
        .route("/register", post(register));

    let protected = Router::new()
        .route("/shortcuts", get(list_shortcuts).post(create_shortcut))
        .route("/shortcuts/batch", put(reorder_shortcuts))
        .route("/shortcuts/group/:group_id", put(reorder_group_shortcuts))
        .route("/shortcuts/:id", put(update_shortcut).delete(delete_shortcut))
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/:id", put(update_group).delete(delete_group))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:id", put(update_todo).delete(delete_todo))
        .route("/change-password", post(change_password))
        .route("/upload", post(upload))
        .route("/fetch-logo", get(fetch_logo))
        .route("/delete-logo", delete(delete_logo))
        .route("/logs", get(recent_logs))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let upload_limit = state.config.upload_limit_bytes;

    Router::new()
        .nest("/api", public.merge(protected))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

/// Stored objects are user content and must not run as pages on this origin
fn icon_service(dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(SetResponseHeaderLayer::overriding(
            CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; style-src 'unsafe-inline'; sandbox"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
}

/// The full application: API, stored icons, optional SPA, CORS and tracing
pub fn app(state: Arc<AppState>) -> Router {
    let mut app = router(state.clone());

    if let StorageConfig::Local { dir, url_prefix } = &state.config.storage {
        let prefix = url_prefix.trim_end_matches('/');
        if prefix.starts_with('/') && prefix.len() > 1 {
            info!("Serving stored icons from {} at {}", dir.display(), prefix);
            app = app.nest_service(prefix, icon_service(dir));
        }
    }

    if let Some(dir) = &state.config.static_dir {
        info!("Serving frontend from {}", dir.display());
        let index = dir.join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    app.layer(TraceLayer::new_for_http()).layer(cors)
}
