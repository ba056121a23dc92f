pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- versions table
CREATE TABLE IF NOT EXISTS versions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    slug TEXT NOT NULL UNIQUE,
    release_date TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- version_files table (one row per downloadable archive)
CREATE TABLE IF NOT EXISTS version_files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    version_id INTEGER NOT NULL REFERENCES versions(id) ON DELETE CASCADE,
    checksum TEXT NOT NULL,
    url TEXT NOT NULL,
    operating_system TEXT NOT NULL,
    display_name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(version_id, checksum)
);

CREATE INDEX IF NOT EXISTS idx_version_files_version_id ON version_files(version_id);

-- rendered_content table
CREATE TABLE IF NOT EXISTS rendered_content (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cache_key TEXT NOT NULL UNIQUE,
    content_type TEXT NOT NULL,
    content_original TEXT NOT NULL,
    content_html TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
