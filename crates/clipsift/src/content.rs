//! Core content types for clipsift.
//!
//! This module defines the fundamental data structures for representing
//! captured clipboard content and the boundary traits that connect the
//! pipeline to the outside world.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of payload a content item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Plain text copied to the clipboard.
    Text,
    /// Image data (raw bytes or a base64 payload).
    Image,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// A single captured content item.
///
/// The BLAKE3 hash of the payload serves as the item's stable identifier
/// throughout the pipeline: the dedup gate, the state tracker, and the
/// archive all key off it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// When this item was captured.
    pub captured_at: DateTime<Utc>,

    /// The payload text. Image payloads are carried base64-encoded.
    pub payload: String,

    /// BLAKE3 hash of the payload, the item's stable identity.
    pub content_hash: String,

    /// The kind of payload.
    pub kind: ContentKind,
}

impl ContentItem {
    /// Create a new content item with the given payload.
    ///
    /// Automatically computes the content hash and stamps the capture time.
    #[must_use]
    pub fn new(payload: String, kind: ContentKind) -> Self {
        let content_hash = Self::compute_hash(&payload);
        Self {
            captured_at: Utc::now(),
            payload,
            content_hash,
            kind,
        }
    }

    /// Compute the BLAKE3 hash of the given payload.
    #[must_use]
    pub fn compute_hash(payload: &str) -> String {
        blake3::hash(payload.as_bytes()).to_hex().to_string()
    }

    /// Get the length of the payload in bytes.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Check if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Trait for external content producers.
///
/// Implementors wrap whatever actually watches the clipboard (or any other
/// feed) and hand items to the pipeline one at a time. A `None` return
/// means nothing new was available this poll.
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// The name of this source (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Poll for the next content item, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source fails in a way that should
    /// be logged; the pipeline treats errors like an empty poll.
    async fn poll(&mut self) -> crate::error::Result<Option<ContentItem>>;
}

/// Trait for external delivery targets.
///
/// Failure is signaled by returning `None`, never by an error crossing this
/// boundary; the pipeline records the failure and consults the state
/// tracker for retry permission.
#[async_trait::async_trait]
pub trait Sink: Send + Sync {
    /// The name of this sink (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Upload sanitized content, returning an opaque asset identifier on
    /// success and `None` on failure.
    async fn upload(&mut self, content: &str, description: &str) -> Option<String>;
}
