use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatingSystem {
    Unix,
    Windows,
}

impl OperatingSystem {
    /// Tarballs are for Unix, everything else (.zip, .7z) for Windows.
    pub fn from_artifact_url(url: &str) -> Self {
        if url.contains(".tar") {
            OperatingSystem::Unix
        } else {
            OperatingSystem::Windows
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingSystem::Unix => "Unix",
            OperatingSystem::Windows => "Windows",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatingSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unix" => Ok(OperatingSystem::Unix),
            "Windows" => Ok(OperatingSystem::Windows),
            other => Err(format!("unknown operating system: {}", other)),
        }
    }
}

/// Download details for one release archive, as reported by Artifactory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDownload {
    pub url: String,
    pub operating_system: OperatingSystem,
    pub checksum: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionFile {
    pub id: i64,
    pub version_id: i64,
    pub checksum: String,
    pub url: String,
    pub operating_system: OperatingSystem,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
