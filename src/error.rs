use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Request to {url} failed: {source}")]
    RemoteFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("Version {0} does not exist")]
    VersionNotFound(i64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn remote_fetch(url: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::RemoteFetch {
            url: url.into(),
            source,
        }
    }

    pub fn malformed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::MalformedResponse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Transport failures may succeed on a later attempt; bad payloads will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::RemoteFetch { .. })
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
