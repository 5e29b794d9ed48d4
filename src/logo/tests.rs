//! Logo pipeline tests against a throwaway HTTP server on localhost.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::{LogoError, LogoFetcher};
use crate::config::{BackgroundRemovalConfig, LogoConfig};
use crate::storage::{LocalStore, ObjectStore};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x10\0\0\0\x10original";
const CLEANED_PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x10\0\0\0\x10cleaned";
const ICO: &[u8] = &[0, 0, 1, 0, 1, 0, 16, 16, 0, 0];

fn png() -> impl IntoResponse {
    ([(CONTENT_TYPE, "image/png")], PNG)
}

fn site_router() -> Router {
    Router::new()
        // Page advertising a missing touch icon ahead of a real one
        .route(
            "/",
            get(|| async {
                Html(
                    r#"<html><head>
                    <link rel="apple-touch-icon" href="/missing-touch.png">
                    <link rel="icon" href="/static/icon.png">
                    </head></html>"#,
                )
            }),
        )
        .route("/static/icon.png", get(|| async { png() }))
        // Broken site: page errors, favicon.ico is a soft 404, favicon.png works
        .route("/broken/", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route(
            "/favicon.ico",
            get(|| async { Html("<html><body>Not found</body></html>") }),
        )
        .route("/favicon.png", get(|| async { png() }))
        .route(
            "/huge/",
            get(|| async { Html(r#"<link rel="icon" href="/huge.ico">"#) }),
        )
        .route("/huge.ico", get(|| async { vec![0u8; 4096] }))
        .route(
            "/remove-bg",
            post(|headers: HeaderMap| async move {
                if headers.get("x-api-key").and_then(|v| v.to_str().ok()) == Some("test-key") {
                    ([(CONTENT_TYPE, "image/png")], CLEANED_PNG).into_response()
                } else {
                    StatusCode::UNAUTHORIZED.into_response()
                }
            }),
        )
        .route(
            "/ico-only/",
            get(|| async { Html(r#"<link rel="shortcut icon" href="/static/icon.ico">"#) }),
        )
        .route("/static/icon.ico", get(|| async { ICO }))
}

async fn spawn_site() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, site_router()).await.unwrap();
    });
    addr
}

/// PNG signature padded with zeros to 4 KiB
fn large_png() -> Vec<u8> {
    let mut bytes = PNG.to_vec();
    bytes.resize(4096, 0);
    bytes
}

fn padded_page() -> Vec<u8> {
    let mut page = br#"<html><head><link rel="icon" href="/chunked-icon.png">"#.to_vec();
    page.extend(std::iter::repeat(b' ').take(2048));
    page.extend_from_slice(b"</head></html>");
    page
}

/// Raw HTTP/1.1 server that streams every body with `Transfer-Encoding: chunked`
/// and never sends a Content-Length.
async fn spawn_chunked_site() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&request).into_owned();
                let path = request.split_whitespace().nth(1).unwrap_or("/");
                let (content_type, body) = if path == "/chunked-icon.png" {
                    ("image/png", large_png())
                } else {
                    ("text/html", padded_page())
                };

                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
                    content_type
                );
                let _ = socket.write_all(head.as_bytes()).await;
                for chunk in body.chunks(512) {
                    let _ = socket.write_all(format!("{:x}\r\n", chunk.len()).as_bytes()).await;
                    let _ = socket.write_all(chunk).await;
                    let _ = socket.write_all(b"\r\n").await;
                }
                let _ = socket.write_all(b"0\r\n\r\n").await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

fn test_config() -> LogoConfig {
    LogoConfig {
        page_timeout_ms: 2_000,
        icon_timeout_ms: 2_000,
        max_icon_bytes: 1024,
        fallback_paths: vec!["/favicon.ico".to_string(), "/favicon.png".to_string()],
        ..LogoConfig::default()
    }
}

fn store(dir: &tempfile::TempDir) -> Arc<dyn ObjectStore> {
    Arc::new(LocalStore::new(dir.path().to_path_buf(), "/logo"))
}

#[tokio::test]
async fn test_link_tag_icon_after_failed_candidate() {
    let addr = spawn_site().await;
    let dir = tempfile::tempdir().unwrap();
    let fetcher = LogoFetcher::new(test_config(), store(&dir)).unwrap();

    let logo = fetcher.fetch(&format!("http://{}/", addr)).await.unwrap();

    assert_eq!(logo.source, format!("http://{}/static/icon.png", addr));
    assert_eq!(logo.content_type, "image/png");
    assert!(logo.key.starts_with("logos/127.0.0.1-"));
    assert_eq!(logo.url, format!("/logo/{}", logo.key));
    assert!(!logo.background_removed);
    assert_eq!(std::fs::read(dir.path().join(&logo.key)).unwrap(), PNG);
}

#[tokio::test]
async fn test_fallback_paths_skip_html_soft_404() {
    let addr = spawn_site().await;
    let dir = tempfile::tempdir().unwrap();
    let fetcher = LogoFetcher::new(test_config(), store(&dir)).unwrap();

    let logo = fetcher.fetch(&format!("http://{}/broken/", addr)).await.unwrap();

    assert_eq!(logo.source, format!("http://{}/favicon.png", addr));
}

#[tokio::test]
async fn test_oversized_icon_rejected() {
    let addr = spawn_site().await;
    let dir = tempfile::tempdir().unwrap();
    let config = LogoConfig {
        fallback_paths: Vec::new(),
        ..test_config()
    };
    let fetcher = LogoFetcher::new(config, store(&dir)).unwrap();

    let result = fetcher.fetch(&format!("http://{}/huge/", addr)).await;

    assert!(matches!(result, Err(LogoError::NotFound(_))));
}

#[tokio::test]
async fn test_chunked_icon_over_cap_rejected() {
    let addr = spawn_chunked_site().await;
    let dir = tempfile::tempdir().unwrap();
    let config = LogoConfig {
        fallback_paths: Vec::new(),
        ..test_config()
    };
    let fetcher = LogoFetcher::new(config, store(&dir)).unwrap();

    let result = fetcher.fetch(&format!("http://{}/", addr)).await;

    match result {
        Err(LogoError::NotFound(reason)) => assert!(reason.contains("larger than 1024")),
        other => panic!("unexpected result {:?}", other.map(|logo| logo.key)),
    }
}

#[tokio::test]
async fn test_chunked_icon_within_cap_accepted() {
    let addr = spawn_chunked_site().await;
    let dir = tempfile::tempdir().unwrap();
    let config = LogoConfig {
        max_icon_bytes: 8192,
        fallback_paths: Vec::new(),
        ..test_config()
    };
    let fetcher = LogoFetcher::new(config, store(&dir)).unwrap();

    let logo = fetcher.fetch(&format!("http://{}/", addr)).await.unwrap();

    assert_eq!(logo.source, format!("http://{}/chunked-icon.png", addr));
    assert_eq!(std::fs::read(dir.path().join(&logo.key)).unwrap(), large_png());
}

#[tokio::test]
async fn test_oversized_page_yields_no_link_candidates() {
    let addr = spawn_chunked_site().await;
    let dir = tempfile::tempdir().unwrap();
    let config = LogoConfig {
        max_icon_bytes: 8192,
        max_page_bytes: 256,
        fallback_paths: Vec::new(),
        ..test_config()
    };
    let fetcher = LogoFetcher::new(config, store(&dir)).unwrap();

    let result = fetcher.fetch(&format!("http://{}/", addr)).await;

    assert!(matches!(result, Err(LogoError::NotFound(_))));
}

#[tokio::test]
async fn test_background_removed_for_png() {
    let addr = spawn_site().await;
    let dir = tempfile::tempdir().unwrap();
    let config = LogoConfig {
        background_removal: Some(BackgroundRemovalConfig {
            api_url: format!("http://{}/remove-bg", addr),
            api_key: "test-key".to_string(),
            timeout_ms: 2_000,
        }),
        ..test_config()
    };
    let fetcher = LogoFetcher::new(config, store(&dir)).unwrap();

    let logo = fetcher.fetch(&format!("http://{}/", addr)).await.unwrap();

    assert!(logo.background_removed);
    assert_eq!(std::fs::read(dir.path().join(&logo.key)).unwrap(), CLEANED_PNG);
}

#[tokio::test]
async fn test_background_removal_failure_keeps_original() {
    let addr = spawn_site().await;
    let dir = tempfile::tempdir().unwrap();
    let config = LogoConfig {
        background_removal: Some(BackgroundRemovalConfig {
            api_url: format!("http://{}/remove-bg", addr),
            api_key: "wrong-key".to_string(),
            timeout_ms: 2_000,
        }),
        ..test_config()
    };
    let fetcher = LogoFetcher::new(config, store(&dir)).unwrap();

    let logo = fetcher.fetch(&format!("http://{}/", addr)).await.unwrap();

    assert!(!logo.background_removed);
    assert_eq!(std::fs::read(dir.path().join(&logo.key)).unwrap(), PNG);
}

#[tokio::test]
async fn test_ico_skips_background_removal() {
    let addr = spawn_site().await;
    let dir = tempfile::tempdir().unwrap();
    let config = LogoConfig {
        background_removal: Some(BackgroundRemovalConfig {
            api_url: format!("http://{}/remove-bg", addr),
            api_key: "test-key".to_string(),
            timeout_ms: 2_000,
        }),
        ..test_config()
    };
    let fetcher = LogoFetcher::new(config, store(&dir)).unwrap();

    let logo = fetcher.fetch(&format!("http://{}/ico-only/", addr)).await.unwrap();

    assert_eq!(logo.content_type, "image/x-icon");
    assert!(logo.key.ends_with(".ico"));
    assert!(!logo.background_removed);
}

#[tokio::test]
async fn test_invalid_site_url() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = LogoFetcher::new(test_config(), store(&dir)).unwrap();

    assert!(matches!(fetcher.fetch("ftp://example.com").await, Err(LogoError::InvalidUrl(_))));
}
