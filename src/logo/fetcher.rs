use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use percent_encoding::percent_decode_str;
use reqwest::{header::ACCEPT, redirect, Url};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::background::BackgroundRemover;
use super::html::icon_links;
use super::signature::{sniff, ImageKind};
use super::LogoError;
use crate::config::LogoConfig;
use crate::storage::ObjectStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedLogo {
    pub url: String,
    pub key: String,
    /// Where the icon bytes came from
    pub source: String,
    pub content_type: String,
    pub background_removed: bool,
}

pub struct LogoFetcher {
    client: reqwest::Client,
    config: LogoConfig,
    remover: Option<BackgroundRemover>,
    store: Arc<dyn ObjectStore>,
}

impl LogoFetcher {
    pub fn new(config: LogoConfig, store: Arc<dyn ObjectStore>) -> Result<Self, LogoError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::limited(5))
            .build()?;
        let remover = config
            .background_removal
            .as_ref()
            .map(|bg| BackgroundRemover::new(client.clone(), bg));

        Ok(Self {
            client,
            config,
            remover,
            store,
        })
    }

    /// Find the best icon for `site`, optionally strip its background, and
    /// store it under `logos/`.
    pub async fn fetch(&self, site: &str) -> Result<FetchedLogo, LogoError> {
        let site_url = normalize_site_url(site)?;
        let candidates = self.candidates(&site_url).await;
        debug!(site = %site_url, count = candidates.len(), "icon candidates");

        let mut last_error = None;
        let mut found = None;
        for candidate in &candidates {
            match self.download(candidate).await {
                Ok((bytes, kind)) => {
                    found = Some((candidate, bytes, kind));
                    break;
                }
                Err(e) => {
                    debug!(candidate = %candidate, "skipped: {}", e);
                    last_error = Some(e);
                }
            }
        }

        let Some((source, bytes, kind)) = found else {
            let reason = last_error.map(|e| e.to_string()).unwrap_or_default();
            return Err(LogoError::NotFound(format!("{} ({})", site_url, reason)));
        };

        let (bytes, kind, background_removed) = match &self.remover {
            Some(remover) if kind.is_photo_like() => {
                match remover.remove(bytes.clone(), kind).await {
                    Ok((cleaned, cleaned_kind)) => (cleaned, cleaned_kind, true),
                    Err(e) => {
                        warn!("Background removal failed for {}: {}", site_url, e);
                        (bytes, kind, false)
                    }
                }
            }
            _ => (bytes, kind, false),
        };

        let key = logo_key(site_url.host_str().unwrap_or("site"), &bytes, kind);
        let url = self.store.put(&key, bytes, kind.mime()).await?;

        let source = if source.scheme() == "data" {
            "data-uri".to_string()
        } else {
            source.to_string()
        };
        info!(site = %site_url, source = %source, key = %key, "logo stored");

        Ok(FetchedLogo {
            url,
            key,
            source,
            content_type: kind.mime().to_string(),
            background_removed,
        })
    }

    /// `<link>` icons from the page, then the well-known fallback paths
    async fn candidates(&self, site: &Url) -> Vec<Url> {
        let mut candidates = Vec::new();

        let origin = match self.page(site).await {
            Ok((final_url, html)) => {
                candidates.extend(icon_links(&html, &final_url));
                final_url
            }
            Err(e) => {
                debug!(site = %site, "page fetch failed: {}", e);
                site.clone()
            }
        };

        for path in &self.config.fallback_paths {
            if let Ok(url) = origin.join(path) {
                if !candidates.contains(&url) {
                    candidates.push(url);
                }
            }
        }
        candidates
    }

    async fn page(&self, url: &Url) -> Result<(Url, String), LogoError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .timeout(Duration::from_millis(self.config.page_timeout_ms))
            .send()
            .await?
            .error_for_status()?;

        let final_url = response.url().clone();
        let body = read_capped(response, self.config.max_page_bytes).await?;
        Ok((final_url, String::from_utf8_lossy(&body).into_owned()))
    }

    async fn download(&self, url: &Url) -> Result<(Vec<u8>, ImageKind), LogoError> {
        let max = self.config.max_icon_bytes;

        let bytes = if url.scheme() == "data" {
            decode_data_uri(url.as_str()).ok_or(LogoError::InvalidDataUri)?
        } else {
            let response = self
                .client
                .get(url.clone())
                .timeout(Duration::from_millis(self.config.icon_timeout_ms))
                .send()
                .await?
                .error_for_status()?;

            read_capped(response, max).await?
        };

        if bytes.len() > max {
            return Err(LogoError::TooLarge(max));
        }
        let kind = sniff(&bytes).ok_or_else(|| LogoError::NotAnImage(url.to_string()))?;
        Ok((bytes, kind))
    }
}

/// Read the body chunk by chunk, giving up as soon as it passes `max` bytes
async fn read_capped(mut response: reqwest::Response, max: usize) -> Result<Vec<u8>, LogoError> {
    if response.content_length().is_some_and(|len| len > max as u64) {
        return Err(LogoError::TooLarge(max));
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > max {
            return Err(LogoError::TooLarge(max));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Accepts bare hosts (`github.com`) as well as full http(s) URLs
pub fn normalize_site_url(site: &str) -> Result<Url, LogoError> {
    let site = site.trim();
    if site.is_empty() {
        return Err(LogoError::InvalidUrl("empty url".to_string()));
    }

    let with_scheme = if site.contains("://") {
        site.to_string()
    } else {
        format!("https://{}", site)
    };

    let url = Url::parse(&with_scheme).map_err(|e| LogoError::InvalidUrl(format!("{}: {}", site, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(LogoError::InvalidUrl(site.to_string()));
    }
    Ok(url)
}

pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;

    if meta.ends_with(";base64") {
        let cleaned: String = percent_decode_str(payload)
            .decode_utf8_lossy()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        base64::engine::general_purpose::STANDARD.decode(cleaned).ok()
    } else {
        Some(percent_decode_str(payload).collect())
    }
}

/// `logos/<host>-<content hash>.<ext>`; identical icons land on the same key
fn logo_key(host: &str, bytes: &[u8], kind: ImageKind) -> String {
    let host: String = host
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    let hash = blake3::hash(bytes).to_hex();

    format!("logos/{}-{}.{}", host, &hash.as_str()[..16], kind.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_site_url() {
        assert_eq!(normalize_site_url("github.com").unwrap().as_str(), "https://github.com/");
        assert_eq!(
            normalize_site_url(" http://nas.local:5000/dsm ").unwrap().as_str(),
            "http://nas.local:5000/dsm"
        );
        assert!(normalize_site_url("").is_err());
        assert!(normalize_site_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_decode_data_uri() {
        assert_eq!(
            decode_data_uri("data:image/svg+xml;base64,PHN2Zz48L3N2Zz4=").unwrap(),
            b"<svg></svg>".to_vec()
        );
        assert_eq!(
            decode_data_uri("data:image/svg+xml,%3Csvg%3E%3C/svg%3E").unwrap(),
            b"<svg></svg>".to_vec()
        );
        assert!(decode_data_uri("data:image/png;base64").is_none());
    }

    #[test]
    fn test_logo_key() {
        let key = logo_key("Example.COM", b"icon", ImageKind::Png);
        assert!(key.starts_with("logos/example.com-"));
        assert!(key.ends_with(".png"));
        assert_eq!(key, logo_key("example.com", b"icon", ImageKind::Png));
        assert_ne!(key, logo_key("example.com", b"other", ImageKind::Png));
    }
}
