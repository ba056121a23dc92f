use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::http::client_from_config;
use crate::models::{OperatingSystem, ReleaseDownload};

use super::listing::{filter_artifact_uris, release_directory};

const LIST_ERROR: &str = "artifactory_release_list_error";
const DETAIL_ERROR: &str = "artifactory_release_detail_error";

#[derive(Debug, Deserialize)]
struct DirectoryListing {
    children: Vec<ChildEntry>,
}

#[derive(Debug, Deserialize)]
struct ChildEntry {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct ArtifactInfo {
    #[serde(rename = "downloadUri")]
    download_uri: Option<String>,
    checksums: Option<Checksums>,
}

#[derive(Debug, Deserialize)]
struct Checksums {
    sha256: Option<String>,
}

/// Client for the Artifactory storage API that hosts Boost release archives.
pub struct ArtifactoryClient {
    client: Client,
    base_url: String,
    max_concurrent_fetches: usize,
}

impl ArtifactoryClient {
    pub fn new(client: Client, base_url: impl Into<String>, max_concurrent_fetches: usize) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            max_concurrent_fetches: max_concurrent_fetches.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            client_from_config(config)?,
            config.artifactory_url.clone(),
            config.max_concurrent_fetches,
        ))
    }

    /// List the absolute URLs of the source archives published for `release`.
    pub async fn list_release_artifacts(&self, release: &str) -> Result<Vec<String>> {
        let directory = release_directory(&self.base_url, release);

        let body = self
            .get_bytes(&directory)
            .await
            .inspect_err(|e| tracing::error!(url = %directory, error = %e, "{}", LIST_ERROR))?;

        let listing: DirectoryListing = serde_json::from_slice(&body)
            .map_err(|e| AppError::malformed(&directory, e.to_string()))
            .inspect_err(|e| tracing::error!(url = %directory, error = %e, "{}", LIST_ERROR))?;

        let urls = filter_artifact_uris(
            &directory,
            release,
            listing.children.iter().map(|child| child.uri.as_str()),
        );
        tracing::debug!(
            release,
            listed = listing.children.len(),
            kept = urls.len(),
            "artifactory_release_listed"
        );
        Ok(urls)
    }

    /// Fetch checksum and download URL for one archive.
    ///
    /// The operating system and display name come from `url` itself, not from the
    /// download URI in the response.
    pub async fn fetch_artifact_metadata(&self, url: &str) -> Result<ReleaseDownload> {
        let body = self
            .get_bytes(url)
            .await
            .inspect_err(|e| tracing::error!(url, error = %e, "{}", DETAIL_ERROR))?;

        parse_artifact_info(url, &body)
            .inspect_err(|e| tracing::error!(url, error = %e, "{}", DETAIL_ERROR))
    }

    /// Fetch metadata for every URL, at most `max_concurrent_fetches` at a time.
    /// Results come back in input order; the first failure aborts the batch.
    pub async fn fetch_release_downloads(&self, urls: &[String]) -> Result<Vec<ReleaseDownload>> {
        stream::iter(urls)
            .map(|url| self.fetch_artifact_metadata(url))
            .buffered(self.max_concurrent_fetches)
            .try_collect()
            .await
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::remote_fetch(url, e))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::remote_fetch(url, e))?;
        Ok(bytes.to_vec())
    }
}

fn parse_artifact_info(url: &str, body: &[u8]) -> Result<ReleaseDownload> {
    let info: ArtifactInfo =
        serde_json::from_slice(body).map_err(|e| AppError::malformed(url, e.to_string()))?;

    let download_uri = info
        .download_uri
        .ok_or_else(|| AppError::malformed(url, "missing downloadUri"))?;
    let checksum = info
        .checksums
        .and_then(|c| c.sha256)
        .ok_or_else(|| AppError::malformed(url, "missing checksums.sha256"))?;

    Ok(ReleaseDownload {
        url: download_uri,
        operating_system: OperatingSystem::from_artifact_url(url),
        checksum,
        display_name: url.rsplit('/').next().unwrap_or(url).to_string(),
    })
}
