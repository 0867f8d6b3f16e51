//! Concrete boundary adapters.
//!
//! `DirectorySink` writes sanitized content into a backup directory the
//! way the original service mirrored uploads to disk, and `SpoolSource`
//! feeds the pipeline from files dropped into a spool directory. Both are
//! stand-ins for heavier integrations (upload SDKs, OS clipboard hooks)
//! that live outside this crate.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::content::{ContentItem, ContentKind, ContentSource, Sink};
use crate::error::Result;

/// Base64 payload prefixes that mark image data on the clipboard.
const IMAGE_PREFIXES: &[&str] = &["iVBORw0KGgo", "/9j/", "data:image"];

/// A sink that writes sanitized content to a backup directory.
///
/// Each upload produces a content file plus a JSON metadata side-file;
/// the content filename doubles as the returned asset id.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    uploads: u64,
}

impl DirectorySink {
    /// Create a sink writing into the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|source| crate::error::Error::DirectoryCreate {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(Self { dir, uploads: 0 })
    }

    /// The directory this sink writes into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_filename(&self) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d_%H-%M-%S");
        format!("Clip_{timestamp}_{:04}.txt", self.uploads)
    }
}

#[async_trait::async_trait]
impl Sink for DirectorySink {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn upload(&mut self, content: &str, description: &str) -> Option<String> {
        let filename = self.next_filename();
        let file_path = self.dir.join(&filename);

        if let Err(e) = std::fs::write(&file_path, content) {
            warn!(error = %e, path = %file_path.display(), "backup write failed");
            return None;
        }

        let metadata = serde_json::json!({
            "filename": filename,
            "description": description,
            "timestamp": Utc::now().to_rfc3339(),
            "source": "clipsift",
        });
        let metadata_path = self.dir.join(format!("{filename}.meta.json"));
        if let Err(e) = std::fs::write(&metadata_path, metadata.to_string()) {
            warn!(error = %e, "metadata write failed");
        }

        self.uploads += 1;
        debug!(filename, "content backed up");
        Some(filename)
    }
}

/// A source that feeds the pipeline from files dropped into a directory.
///
/// Files are consumed oldest-name-first and deleted once read. Payloads
/// carrying a base64 image signature are reported as image content, the
/// way the original detector sniffed clipboard text.
#[derive(Debug)]
pub struct SpoolSource {
    dir: PathBuf,
}

impl SpoolSource {
    /// Create a source watching the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|source| crate::error::Error::DirectoryCreate {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(Self { dir })
    }

    /// Classify a payload as text or base64 image data.
    #[must_use]
    pub fn detect_kind(payload: &str) -> ContentKind {
        if IMAGE_PREFIXES.iter().any(|p| payload.starts_with(p)) {
            ContentKind::Image
        } else {
            ContentKind::Text
        }
    }

    fn next_file(&self) -> std::io::Result<Option<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        Ok(files.into_iter().next())
    }
}

#[async_trait::async_trait]
impl ContentSource for SpoolSource {
    fn name(&self) -> &'static str {
        "spool"
    }

    async fn poll(&mut self) -> Result<Option<ContentItem>> {
        let Some(path) = self
            .next_file()
            .map_err(|e| crate::error::Error::source_poll("spool", e.to_string()))?
        else {
            return Ok(None);
        };

        let payload = match std::fs::read_to_string(&path) {
            Ok(p) => p,
            Err(e) => {
                // Unreadable files (binary, permissions) are dropped so one
                // bad file cannot wedge the spool.
                warn!(path = %path.display(), error = %e, "skipping unreadable spool file");
                let _ = std::fs::remove_file(&path);
                return Ok(None);
            }
        };
        let _ = std::fs::remove_file(&path);

        if payload.trim().is_empty() {
            return Ok(None);
        }

        let kind = Self::detect_kind(&payload);
        debug!(path = %path.display(), %kind, "spool file consumed");
        Ok(Some(ContentItem::new(payload, kind)))
    }
}
