//! `SQLite` schema definitions for the local archive.
//!
//! This module contains the SQL statements for creating and managing
//! the archive database schema.

/// SQL statement to create the items table.
pub const CREATE_ITEMS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    captured_at TEXT NOT NULL,
    category TEXT NOT NULL,
    kind TEXT NOT NULL,
    content TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    asset_id TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create an index on `captured_at` for efficient queries.
pub const CREATE_TIMESTAMP_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_items_captured_at ON items(captured_at DESC)
";

/// SQL statement to create an index on `content_hash` for deduplication.
pub const CREATE_HASH_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_items_hash ON items(content_hash)
";

/// SQL statement to create an index on `category` for filtering.
pub const CREATE_CATEGORY_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_items_category ON items(category)
";

/// SQL statement to create an index on `kind` for filtering.
pub const CREATE_KIND_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_items_kind ON items(kind)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_ITEMS_TABLE,
    CREATE_TIMESTAMP_INDEX,
    CREATE_HASH_INDEX,
    CREATE_CATEGORY_INDEX,
    CREATE_KIND_INDEX,
    CREATE_METADATA_TABLE,
];
