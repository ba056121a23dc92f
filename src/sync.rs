use crate::artifactory::ArtifactoryClient;
use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{ReleaseDownload, RenderedContent, Version, VersionFile, CONTENT_TYPE_HTML};
use crate::notes::{extract_body, ReleaseNotesFetcher};

/// Pulls release data from the remote services into the local store.
pub struct ReleaseSync {
    pub repository: Repository,
    artifactory: ArtifactoryClient,
    notes: ReleaseNotesFetcher,
}

impl ReleaseSync {
    pub fn new(
        repository: Repository,
        artifactory: ArtifactoryClient,
        notes: ReleaseNotesFetcher,
    ) -> Self {
        Self {
            repository,
            artifactory,
            notes,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        let artifactory = ArtifactoryClient::from_config(config)?;
        let notes = ReleaseNotesFetcher::from_config(config)?;
        Ok(Self::new(repository, artifactory, notes))
    }

    // Release notes

    /// Raw release notes page for a version. Fails with `VersionNotFound` before
    /// any request is made if the version doesn't exist.
    pub async fn fetch_release_notes(&self, version_id: i64) -> Result<Vec<u8>> {
        let version = self.repository.get_version(version_id).await?;
        self.notes.fetch(&version.release_notes_filename()).await
    }

    /// Fetch a version's release notes and cache them as rendered content.
    pub async fn store_release_notes(&self, version_id: i64) -> Result<RenderedContent> {
        let content = self.fetch_release_notes(version_id).await?;
        let original = String::from_utf8_lossy(&content);
        let stripped = extract_body(&original);

        // Looked up again: the version may have been deleted while the page downloaded.
        let version = match self.repository.get_version(version_id).await {
            Ok(version) => version,
            Err(e @ AppError::VersionNotFound(_)) => {
                tracing::warn!(version_id, "release_notes_version_not_found");
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let rendered = self
            .repository
            .upsert_rendered_content(
                &version.release_notes_cache_key(),
                CONTENT_TYPE_HTML,
                &original,
                &stripped,
            )
            .await?;

        tracing::info!(
            rendered_content_id = rendered.id,
            version_id,
            "release_notes_stored"
        );
        Ok(rendered)
    }

    // Downloads

    /// Upsert one file per download, keyed by `(version, checksum)`. Each upsert
    /// stands alone; a failure part way leaves earlier rows in place.
    pub async fn store_release_downloads(
        &self,
        version: &Version,
        release_data: &[ReleaseDownload],
    ) -> Result<Vec<VersionFile>> {
        let mut files = Vec::with_capacity(release_data.len());
        for download in release_data {
            files.push(
                self.repository
                    .upsert_version_file(version.id, download)
                    .await?,
            );
        }
        Ok(files)
    }

    /// List a version's archives on Artifactory, fetch their metadata and store it.
    pub async fn sync_release_downloads(&self, version_id: i64) -> Result<Vec<VersionFile>> {
        let version = self.repository.get_version(version_id).await?;
        let urls = self
            .artifactory
            .list_release_artifacts(version.release_label())
            .await?;
        let downloads = self.artifactory.fetch_release_downloads(&urls).await?;
        let files = self.store_release_downloads(&version, &downloads).await?;

        tracing::info!(version_id, count = files.len(), "release_downloads_stored");
        Ok(files)
    }
}
