//! Relay client for the external media host.
//!
//! Uploaded files are forwarded as multipart form data; the host responds
//! with a durable URL that we persist and hand back to the caller.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::config::MediaConfig;

pub struct MediaHostClient {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
    enabled: bool,
}

impl MediaHostClient {
    pub fn new(config: &MediaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.into()))
            .user_agent("EdReport/1.0")
            .build()
            .context("Failed to build media host HTTP client")?;

        Ok(Self {
            client,
            upload_url: config.upload_url.clone(),
            api_key: config.api_key.clone(),
            enabled: config.enabled,
        })
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Forward one file and return the durable URL reported by the host.
    pub async fn upload(
        &self,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&content_type)
            .context("Invalid content type for upload")?;

        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.upload_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("Media host request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Media host returned {status}");
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("Media host returned invalid JSON")?;

        body.get("url")
            .and_then(|v| v.as_str())
            .map(ToString::to_string)
            .ok_or_else(|| anyhow::anyhow!("Media host response missing url field"))
    }
}
