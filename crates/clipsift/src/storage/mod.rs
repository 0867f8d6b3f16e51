//! Local archive for sanitized content.
//!
//! This module provides `SQLite`-based persistent storage for content that
//! made it through the security filter, including duplicate suppression at
//! insert, search, and pruning capabilities. The archive is the local
//! backup: items land here whether or not the remote sink accepted them.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::classify::ContentCategory;
use crate::content::ContentKind;
use crate::error::{Error, Result};

/// A sanitized content item as stored in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedItem {
    /// Row id assigned by the archive.
    pub id: Option<i64>,
    /// When the item was captured.
    pub captured_at: DateTime<Utc>,
    /// Category the item was classified into.
    pub category: ContentCategory,
    /// Kind of the original payload.
    pub kind: ContentKind,
    /// The sanitized content.
    pub content: String,
    /// BLAKE3 hash of the ORIGINAL payload (the pipeline identity).
    pub content_hash: String,
    /// Identifier returned by the sink, when the upload succeeded.
    pub asset_id: Option<String>,
}

impl ArchivedItem {
    /// Create an archive row for a sanitized item.
    #[must_use]
    pub fn new(
        captured_at: DateTime<Utc>,
        category: ContentCategory,
        kind: ContentKind,
        content: String,
        content_hash: String,
        asset_id: Option<String>,
    ) -> Self {
        Self {
            id: None,
            captured_at,
            category,
            kind,
            content,
            content_hash,
            asset_id,
        }
    }
}

/// Storage engine for the local archive.
#[derive(Debug)]
pub struct Archive {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Archive {
    /// Open or create an archive database at the given path.
    ///
    /// Creates the parent directories and database file if they don't
    /// exist. Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening archive at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Archive opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory archive for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert an item into the archive.
    ///
    /// Returns the assigned ID, or `None` if an item with the same content
    /// hash already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, item: &ArchivedItem) -> Result<Option<i64>> {
        if self.exists_by_hash(&item.content_hash)? {
            debug!(
                "Skipping duplicate archive item with hash {}",
                &item.content_hash[..item.content_hash.len().min(16)]
            );
            return Ok(None);
        }

        self.conn.execute(
            r"
            INSERT INTO items (captured_at, category, kind, content, content_hash, asset_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                item.captured_at.to_rfc3339(),
                item.category.to_string(),
                item.kind.to_string(),
                item.content,
                item.content_hash,
                item.asset_id,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Archived item with id {}", id);
        Ok(Some(id))
    }

    /// Check if an item with the given hash already exists.
    fn exists_by_hash(&self, hash: &str) -> Result<bool> {
        let count: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM items WHERE content_hash = ?1",
            [hash],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get an item by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<ArchivedItem>> {
        let result = self
            .conn
            .query_row(
                r"
                SELECT id, captured_at, category, kind, content, content_hash, asset_id
                FROM items WHERE id = ?1
                ",
                [id],
                Self::row_to_item,
            )
            .optional()?;
        Ok(result)
    }

    /// Get the most recent items.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_recent(&self, limit: usize) -> Result<Vec<ArchivedItem>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, captured_at, category, kind, content, content_hash, asset_id
            FROM items ORDER BY captured_at DESC LIMIT ?1
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let items = stmt
            .query_map([limit_i64], Self::row_to_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Get items of a specific category.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_by_category(
        &self,
        category: ContentCategory,
        limit: usize,
    ) -> Result<Vec<ArchivedItem>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, captured_at, category, kind, content, content_hash, asset_id
            FROM items WHERE category = ?1
            ORDER BY captured_at DESC LIMIT ?2
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let items = stmt
            .query_map(params![category.to_string(), limit_i64], Self::row_to_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Search items by content.
    ///
    /// Performs a case-insensitive substring search.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<ArchivedItem>> {
        let pattern = format!("%{query}%");
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, captured_at, category, kind, content, content_hash, asset_id
            FROM items WHERE content LIKE ?1
            ORDER BY captured_at DESC LIMIT ?2
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let items = stmt
            .query_map(params![pattern, limit_i64], Self::row_to_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Count total items in the archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete an item by ID.
    ///
    /// Returns `true` if an item was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM items WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Prune items older than the given duration.
    ///
    /// Returns the number of items deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_older_than(&self, max_age: Duration) -> Result<usize> {
        let cutoff = Utc::now() - max_age;

        let affected = self.conn.execute(
            "DELETE FROM items WHERE captured_at < ?1",
            [cutoff.to_rfc3339()],
        )?;

        if affected > 0 {
            info!("Pruned {} old archive items", affected);
        }
        Ok(affected)
    }

    /// Prune items to keep only the most recent N entries.
    ///
    /// Returns the number of items deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_keep_recent(&self, keep_count: usize) -> Result<usize> {
        let keep_i64 = i64::try_from(keep_count).unwrap_or(i64::MAX);
        let affected = self.conn.execute(
            r"
            DELETE FROM items WHERE id NOT IN (
                SELECT id FROM items ORDER BY captured_at DESC LIMIT ?1
            )
            ",
            [keep_i64],
        )?;

        if affected > 0 {
            info!("Pruned {} items to keep {} recent", affected, keep_count);
        }
        Ok(affected)
    }

    /// Get archive statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<ArchiveStats> {
        let total_items = self.count()?;

        let oldest: Option<String> = self
            .conn
            .query_row(
                "SELECT captured_at FROM items ORDER BY captured_at ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let newest: Option<String> = self
            .conn
            .query_row(
                "SELECT captured_at FROM items ORDER BY captured_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let uploaded: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM items WHERE asset_id IS NOT NULL",
            [],
            |row| row.get(0),
        )?;

        let oldest_item = oldest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let newest_item = newest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(ArchiveStats {
            total_items,
            uploaded_items: uploaded,
            oldest_item,
            newest_item,
            db_size_bytes,
        })
    }

    /// Convert a database row to an `ArchivedItem`.
    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<ArchivedItem> {
        let id: i64 = row.get(0)?;
        let captured_at_str: String = row.get(1)?;
        let category_str: String = row.get(2)?;
        let kind_str: String = row.get(3)?;
        let content: String = row.get(4)?;
        let content_hash: String = row.get(5)?;
        let asset_id: Option<String> = row.get(6)?;

        let captured_at = DateTime::parse_from_rfc3339(&captured_at_str)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        let category = match category_str.as_str() {
            "code" => ContentCategory::Code,
            "image" => ContentCategory::Image,
            "text" => ContentCategory::Text,
            "config" => ContentCategory::Config,
            "log" => ContentCategory::Log,
            "data" => ContentCategory::Data,
            "unknown" => ContentCategory::Unknown,
            _ => {
                warn!("Unknown category: {}, defaulting to unknown", category_str);
                ContentCategory::Unknown
            }
        };

        let kind = match kind_str.as_str() {
            "image" => ContentKind::Image,
            "text" => ContentKind::Text,
            _ => {
                warn!("Unknown kind: {}, defaulting to text", kind_str);
                ContentKind::Text
            }
        };

        Ok(ArchivedItem {
            id: Some(id),
            captured_at,
            category,
            kind,
            content,
            content_hash,
            asset_id,
        })
    }
}

/// Statistics about the archive.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ArchiveStats {
    /// Total number of items archived.
    pub total_items: i64,
    /// Items that also have a sink asset id.
    pub uploaded_items: i64,
    /// Timestamp of the oldest item.
    pub oldest_item: Option<DateTime<Utc>>,
    /// Timestamp of the newest item.
    pub newest_item: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
