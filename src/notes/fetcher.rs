use reqwest::Client;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::http::client_from_config;

/// Fetches the hand-written release notes pages from the website repository.
pub struct ReleaseNotesFetcher {
    client: Client,
    base_url: String,
}

impl ReleaseNotesFetcher {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            client_from_config(config)?,
            config.release_notes_base_url.clone(),
        ))
    }

    pub fn url_for(&self, filename: &str) -> String {
        format!("{}{}", self.base_url, filename)
    }

    /// Raw page bytes. Any non-success status is an error; the body is not read.
    pub async fn fetch(&self, filename: &str) -> Result<Vec<u8>> {
        let url = self.url_for(filename);
        self.get_bytes(&url)
            .await
            .inspect_err(|e| tracing::error!(url = %url, error = %e, "release_notes_fetch_error"))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::remote_fetch(url, e))?;

        // A dropped connection mid-body is still a failed fetch
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::remote_fetch(url, e))?;
        Ok(bytes.to_vec())
    }
}
