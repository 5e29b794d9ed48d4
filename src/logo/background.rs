use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tracing::debug;

use super::signature::{sniff, ImageKind};
use super::LogoError;
use crate::config::BackgroundRemovalConfig;

/// Client for a remove.bg-compatible API: multipart `image_file` in,
/// image bytes out, keyed by `X-Api-Key`.
pub struct BackgroundRemover {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    timeout: Duration,
}

impl BackgroundRemover {
    pub fn new(client: reqwest::Client, config: &BackgroundRemovalConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    pub async fn remove(
        &self,
        bytes: Vec<u8>,
        kind: ImageKind,
    ) -> Result<(Vec<u8>, ImageKind), LogoError> {
        let part = Part::bytes(bytes)
            .file_name(format!("logo.{}", kind.extension()))
            .mime_str(kind.mime())?;
        let form = Form::new().part("image_file", part).text("size", "auto");

        let response = self
            .client
            .post(&self.api_url)
            .header("X-Api-Key", &self.api_key)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let output = response.bytes().await?;
        let kind = sniff(&output).ok_or_else(|| {
            LogoError::Background("response is not an image".to_string())
        })?;

        debug!(size = output.len(), "background removed");
        Ok((output.to_vec(), kind))
    }
}
