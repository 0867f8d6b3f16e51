//! Duplicate suppression for content items.
//!
//! The gate remembers when each content hash was last seen and rejects
//! reprocessing of the same hash within a rolling time window. It is
//! identity-based only: success or failure of downstream processing is
//! the state tracker's business, not the gate's.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

/// Suppresses reprocessing of identical content within a time window.
///
/// Driven by a single polling loop; callers sharing a gate across tasks
/// must wrap it in their own lock, since check-and-record is a
/// read-modify-write.
#[derive(Debug)]
pub struct DeduplicationGate {
    window: Duration,
    max_cache_size: usize,
    seen: HashMap<String, DateTime<Utc>>,
}

impl DeduplicationGate {
    /// Create a gate with the given window and cache bound.
    #[must_use]
    pub fn new(window: Duration, max_cache_size: usize) -> Self {
        Self {
            window,
            max_cache_size,
            seen: HashMap::new(),
        }
    }

    /// Check whether the item with this hash should be processed now.
    ///
    /// Returns `false` iff the hash was last seen within the window (the
    /// caller must skip the item). Otherwise the observation time is
    /// recorded and `true` is returned.
    pub fn should_process(&mut self, content_hash: &str, now: DateTime<Utc>) -> bool {
        if let Some(last_seen) = self.seen.get(content_hash) {
            let elapsed = now.signed_duration_since(*last_seen);
            if elapsed
                < chrono::Duration::from_std(self.window).unwrap_or(chrono::Duration::MAX)
            {
                debug!(
                    hash = &content_hash[..content_hash.len().min(16)],
                    elapsed_secs = elapsed.num_seconds(),
                    "duplicate within window, skipping"
                );
                return false;
            }
        }

        self.seen.insert(content_hash.to_string(), now);
        self.trim();
        true
    }

    /// Forget everything the gate has seen.
    pub fn clear(&mut self) {
        self.seen.clear();
    }

    /// Number of hashes currently remembered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if the gate remembers nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Evict oldest entries when the cache outgrows its bound.
    fn trim(&mut self) {
        if self.seen.len() <= self.max_cache_size {
            return;
        }

        let mut entries: Vec<(String, DateTime<Utc>)> =
            self.seen.drain().collect();
        entries.sort_by_key(|(_, t)| *t);
        let excess = entries.len() - self.max_cache_size;
        self.seen = entries.into_iter().skip(excess).collect();
    }
}
