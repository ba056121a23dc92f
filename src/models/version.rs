use chrono::{DateTime, NaiveDate, Utc};
use rslug::slugify;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub release_date: Option<NaiveDate>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Version {
    pub fn is_beta(&self) -> bool {
        self.name.contains("beta")
    }

    /// Label Artifactory uses for this release, e.g. `1.81.0` for `boost-1.81.0`.
    pub fn release_label(&self) -> &str {
        self.name.strip_prefix("boost-").unwrap_or(&self.name)
    }

    pub fn release_notes_cache_key(&self) -> String {
        format!("release_notes_{}", self.slug)
    }

    /// File name of the hand-written notes on the website repo: `boost-1-81-0` becomes
    /// `version_1_81_0.html`.
    pub fn release_notes_filename(&self) -> String {
        format!("{}.html", self.slug.replace("boost", "version").replace('-', "_"))
    }
}

#[derive(Debug, Clone)]
pub struct NewVersion {
    pub name: String,
    pub release_date: Option<NaiveDate>,
    pub active: bool,
}

impl NewVersion {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            release_date: None,
            active: true,
        }
    }

    /// Checks the name and returns it trimmed along with its slug.
    pub fn validated_name_and_slug(&self) -> Result<(String, String)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("version name cannot be empty".to_string()));
        }
        let slug = slugify!(name);
        if slug.is_empty() {
            return Err(AppError::Validation(format!(
                "version name {:?} has no usable characters",
                name
            )));
        }
        Ok((name.to_string(), slug))
    }
}
