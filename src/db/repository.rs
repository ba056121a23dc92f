use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{
    NewVersion, OperatingSystem, ReleaseDownload, RenderedContent, Version, VersionFile,
};

use super::schema::SCHEMA;

const VERSION_COLUMNS: &str = "id, name, slug, release_date, active, created_at, updated_at";
const VERSION_FILE_COLUMNS: &str =
    "id, version_id, checksum, url, operating_system, display_name, created_at, updated_at";
const RENDERED_CONTENT_COLUMNS: &str =
    "id, cache_key, content_type, content_original, content_html, created_at, updated_at";

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::init(conn).await
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Version operations

    pub async fn insert_version(&self, version: NewVersion) -> Result<Version> {
        // Reject blank names before touching the database
        let (name, slug) = version.validated_name_and_slug()?;
        let release_date = version.release_date.map(|d| d.format("%Y-%m-%d").to_string());
        let active = version.active;

        let version = self
            .conn
            .call(move |conn| {
                let version = conn.query_row(
                    &format!(
                        "INSERT INTO versions (name, slug, release_date, active) VALUES (?1, ?2, ?3, ?4) RETURNING {}",
                        VERSION_COLUMNS
                    ),
                    params![name, slug, release_date, active],
                    version_from_row,
                )?;
                Ok(version)
            })
            .await?;
        Ok(version)
    }

    /// Fetch a version by primary key. A missing row is `AppError::VersionNotFound`.
    pub async fn get_version(&self, id: i64) -> Result<Version> {
        let version = self
            .conn
            .call(move |conn| {
                let version = conn
                    .query_row(
                        &format!("SELECT {} FROM versions WHERE id = ?1", VERSION_COLUMNS),
                        params![id],
                        version_from_row,
                    )
                    .optional()?;
                Ok(version)
            })
            .await?;
        version.ok_or(AppError::VersionNotFound(id))
    }

    #[cfg(test)]
    pub async fn delete_version(&self, id: i64) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM versions WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn get_version_by_name(&self, name: &str) -> Result<Option<Version>> {
        let name = name.to_string();
        let version = self
            .conn
            .call(move |conn| {
                let version = conn
                    .query_row(
                        &format!("SELECT {} FROM versions WHERE name = ?1", VERSION_COLUMNS),
                        params![name],
                        version_from_row,
                    )
                    .optional()?;
                Ok(version)
            })
            .await?;
        Ok(version)
    }

    pub async fn get_all_versions(&self) -> Result<Vec<Version>> {
        let versions = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM versions ORDER BY name",
                    VERSION_COLUMNS
                ))?;
                let versions = stmt
                    .query_map([], version_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(versions)
            })
            .await?;
        Ok(versions)
    }

    // Version file operations

    /// Insert or update the file identified by `(version_id, checksum)`.
    pub async fn upsert_version_file(
        &self,
        version_id: i64,
        download: &ReleaseDownload,
    ) -> Result<VersionFile> {
        // Moved into the connection thread
        let download = download.clone();
        let file = self
            .conn
            .call(move |conn| {
                let file = conn.query_row(
                    &format!(
                        // Same checksum under the same version updates in place
                        r#"INSERT INTO version_files (version_id, checksum, url, operating_system, display_name)
                           VALUES (?1, ?2, ?3, ?4, ?5)
                           ON CONFLICT(version_id, checksum) DO UPDATE SET
                               url = excluded.url,
                               operating_system = excluded.operating_system,
                               display_name = excluded.display_name,
                               updated_at = datetime('now')
                           RETURNING {}"#,
                        VERSION_FILE_COLUMNS
                    ),
                    params![
                        version_id,
                        download.checksum,
                        download.url,
                        download.operating_system.as_str(),
                        download.display_name,
                    ],
                    version_file_from_row,
                )?;
                Ok(file)
            })
            .await?;
        Ok(file)
    }

    pub async fn get_version_files(&self, version_id: i64) -> Result<Vec<VersionFile>> {
        let files = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM version_files WHERE version_id = ?1 ORDER BY display_name",
                    VERSION_FILE_COLUMNS
                ))?;
                let files = stmt
                    .query_map(params![version_id], version_file_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(files)
            })
            .await?;
        Ok(files)
    }

    // Rendered content operations

    pub async fn upsert_rendered_content(
        &self,
        cache_key: &str,
        content_type: &str,
        content_original: &str,
        content_html: &str,
    ) -> Result<RenderedContent> {
        let cache_key = cache_key.to_string();
        let content_type = content_type.to_string();
        let content_original = content_original.to_string();
        let content_html = content_html.to_string();

        let content = self
            .conn
            .call(move |conn| {
                let content = conn.query_row(
                    &format!(
                        // One row per cache key, the latest fetch wins
                        r#"INSERT INTO rendered_content (cache_key, content_type, content_original, content_html)
                           VALUES (?1, ?2, ?3, ?4)
                           ON CONFLICT(cache_key) DO UPDATE SET
                               content_type = excluded.content_type,
                               content_original = excluded.content_original,
                               content_html = excluded.content_html,
                               updated_at = datetime('now')
                           RETURNING {}"#,
                        RENDERED_CONTENT_COLUMNS
                    ),
                    params![cache_key, content_type, content_original, content_html],
                    rendered_content_from_row,
                )?;
                Ok(content)
            })
            .await?;
        Ok(content)
    }

    pub async fn get_rendered_content(&self, cache_key: &str) -> Result<Option<RenderedContent>> {
        let cache_key = cache_key.to_string();
        let content = self
            .conn
            .call(move |conn| {
                let content = conn
                    .query_row(
                        &format!(
                            "SELECT {} FROM rendered_content WHERE cache_key = ?1",
                            RENDERED_CONTENT_COLUMNS
                        ),
                        params![cache_key],
                        rendered_content_from_row,
                    )
                    .optional()?;
                Ok(content)
            })
            .await?;
        Ok(content)
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first, e.g. "2026-01-11T12:34:56+00:00"
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // SQLite datetime('now') format, e.g. "2026-01-11 12:34:56"
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_datetime(&raw).ok_or_else(|| conversion_error(idx, format!("invalid timestamp: {}", raw)))
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn version_from_row(row: &Row) -> rusqlite::Result<Version> {
    let release_date = row
        .get::<_, Option<String>>(3)?
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map_err(|e| conversion_error(3, e.to_string()))
        })
        .transpose()?;

    Ok(Version {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        release_date,
        active: row.get::<_, i64>(4)? != 0,
        created_at: timestamp(row, 5)?,
        updated_at: timestamp(row, 6)?,
    })
}

fn version_file_from_row(row: &Row) -> rusqlite::Result<VersionFile> {
    let operating_system = row
        .get::<_, String>(4)?
        .parse::<OperatingSystem>()
        .map_err(|e: String| conversion_error(4, e))?;

    Ok(VersionFile {
        id: row.get(0)?,
        version_id: row.get(1)?,
        checksum: row.get(2)?,
        url: row.get(3)?,
        operating_system,
        display_name: row.get(5)?,
        created_at: timestamp(row, 6)?,
        updated_at: timestamp(row, 7)?,
    })
}

fn rendered_content_from_row(row: &Row) -> rusqlite::Result<RenderedContent> {
    Ok(RenderedContent {
        id: row.get(0)?,
        cache_key: row.get(1)?,
        content_type: row.get(2)?,
        content_original: row.get(3)?,
        content_html: row.get(4)?,
        created_at: timestamp(row, 5)?,
        updated_at: timestamp(row, 6)?,
    })
}
