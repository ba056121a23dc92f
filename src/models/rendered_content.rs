use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CONTENT_TYPE_HTML: &str = "text/html";

/// Cached page content, keyed by a string derived from whatever it renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedContent {
    pub id: i64,
    pub cache_key: String,
    pub content_type: String,
    pub content_original: String,
    pub content_html: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
