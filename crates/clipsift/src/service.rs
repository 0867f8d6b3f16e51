//! The content processing pipeline.
//!
//! Ties the whole system together: items polled from a `ContentSource`
//! pass through the deduplication gate and the security filter, survivors
//! are handed to the `Sink` with retries governed by the state tracker,
//! and every processed item lands in the local archive whether or not the
//! sink accepted it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::classify::ContentAnalyzer;
use crate::config::{Config, SecurityConfig};
use crate::content::{ContentItem, ContentSource, Sink};
use crate::dedup::DeduplicationGate;
use crate::error::Result;
use crate::security::{FilterStats, SecurityFilter};
use crate::state::{ProcessingStateTracker, ProcessingStats};
use crate::storage::{Archive, ArchiveStats, ArchivedItem};

/// Polls between maintenance sweeps in the run loop.
const MAINTENANCE_EVERY: u64 = 1000;

/// What happened to one content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The payload length was outside the configured bounds.
    Ignored,
    /// The same content was processed within the dedup window.
    Duplicate,
    /// A high-severity match under the skip policy; nothing forwarded.
    SkippedSensitive,
    /// The sink accepted the sanitized content.
    Delivered {
        /// Identifier returned by the sink.
        asset_id: String,
        /// Attempts it took.
        attempts: u32,
    },
    /// Every permitted attempt failed; the item is archived locally only.
    Failed {
        /// Attempts made before giving up.
        attempts: u32,
    },
}

/// A cloneable stop signal for the run loop.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stop_signal: Arc<AtomicBool>,
}

impl StopHandle {
    /// Create a new handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the run loop to stop.
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Check if the stop signal has been sent.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop_signal.load(Ordering::SeqCst)
    }
}

/// The content-safety pipeline.
pub struct Pipeline {
    config: Config,
    gate: DeduplicationGate,
    filter: SecurityFilter,
    tracker: ProcessingStateTracker,
    analyzer: ContentAnalyzer,
    archive: Archive,
    source: Box<dyn ContentSource>,
    sink: Box<dyn Sink>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source.name())
            .field("sink", &self.sink.name())
            .field("gate", &self.gate)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Build a pipeline with file-backed state and archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the security filter or archive cannot be built.
    pub fn new(
        config: Config,
        source: Box<dyn ContentSource>,
        sink: Box<dyn Sink>,
    ) -> Result<Self> {
        let archive = Archive::open(config.database_path())?;
        let tracker = ProcessingStateTracker::with_persistence(
            config.state_path(),
            config.processing.max_retry_attempts,
        );
        Self::assemble(config, source, sink, archive, tracker)
    }

    /// Build a pipeline with in-memory state and archive, for tests and
    /// dry runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the security filter cannot be built.
    pub fn in_memory(
        config: Config,
        source: Box<dyn ContentSource>,
        sink: Box<dyn Sink>,
    ) -> Result<Self> {
        let archive = Archive::open_in_memory()?;
        let tracker = ProcessingStateTracker::new(config.processing.max_retry_attempts);
        Self::assemble(config, source, sink, archive, tracker)
    }

    fn assemble(
        config: Config,
        source: Box<dyn ContentSource>,
        sink: Box<dyn Sink>,
        archive: Archive,
        tracker: ProcessingStateTracker,
    ) -> Result<Self> {
        let filter = SecurityFilter::from_config(&config.security)?;
        let gate = DeduplicationGate::new(config.dedup_window(), config.dedup.max_cache_size);

        Ok(Self {
            config,
            gate,
            filter,
            tracker,
            analyzer: ContentAnalyzer::new(),
            archive,
            source,
            sink,
        })
    }

    /// Poll the source once and process whatever it yields.
    ///
    /// Returns `None` when the source had nothing.
    ///
    /// # Errors
    ///
    /// Returns an error only if the source itself fails; item-level
    /// problems are absorbed into the returned outcome.
    pub async fn process_next(&mut self) -> Result<Option<ProcessOutcome>> {
        match self.source.poll().await {
            Ok(Some(item)) => Ok(Some(self.process_item(item).await)),
            Ok(None) => Ok(None),
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "source poll failed");
                Err(e)
            }
        }
    }

    /// Run one content item through the pipeline.
    pub async fn process_item(&mut self, item: ContentItem) -> ProcessOutcome {
        let len = item.payload_len();
        if len < self.config.service.min_content_length
            || len > self.config.service.max_content_length
        {
            debug!(len, "payload outside configured bounds, ignoring");
            return ProcessOutcome::Ignored;
        }

        if !self.gate.should_process(&item.content_hash, Utc::now()) {
            return ProcessOutcome::Duplicate;
        }

        let classification = self.analyzer.analyze(&item.payload, item.kind);
        let strategy = self.tracker.optimal_strategy(classification.category);

        let outcome = self.filter.filter(&item.payload);
        if outcome.should_skip {
            info!(
                matches = outcome.matches.len(),
                "item skipped by security policy"
            );
            return ProcessOutcome::SkippedSensitive;
        }
        if !outcome.matches.is_empty() {
            debug!(matches = outcome.matches.len(), "sensitive spans handled");
        }

        let sanitized = outcome.content;
        let description = format!("{} content captured from clipboard", classification.category);

        self.tracker
            .start_processing(&item.content_hash, classification.category, strategy);

        let mut attempts: u32 = 1;
        let mut asset_id = self.attempt_upload(&item.content_hash, &sanitized, &description).await;

        while asset_id.is_none() && self.tracker.retry_processing(&item.content_hash) {
            attempts += 1;
            asset_id = self.attempt_upload(&item.content_hash, &sanitized, &description).await;
        }

        self.archive_item(&item, classification.category, sanitized, asset_id.clone());

        match asset_id {
            Some(asset_id) => {
                info!(%asset_id, attempts, "item delivered");
                ProcessOutcome::Delivered { asset_id, attempts }
            }
            None => {
                warn!(attempts, "item failed after all permitted attempts");
                ProcessOutcome::Failed { attempts }
            }
        }
    }

    /// One timed sink attempt, recorded against the tracker.
    async fn attempt_upload(
        &mut self,
        id: &str,
        content: &str,
        description: &str,
    ) -> Option<String> {
        let started = std::time::Instant::now();
        let result = self.sink.upload(content, description).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Some(_) => self.tracker.complete_processing(id, true, Some(elapsed), None),
            None => self.tracker.complete_processing(
                id,
                false,
                Some(elapsed),
                Some(format!("sink '{}' returned no asset id", self.sink.name())),
            ),
        }
        result
    }

    /// Archive failure is logged and swallowed: losing the backup row must
    /// not fail the item.
    fn archive_item(
        &mut self,
        item: &ContentItem,
        category: crate::classify::ContentCategory,
        sanitized: String,
        asset_id: Option<String>,
    ) {
        let row = ArchivedItem::new(
            item.captured_at,
            category,
            item.kind,
            sanitized,
            item.content_hash.clone(),
            asset_id,
        );
        if let Err(e) = self.archive.insert(&row) {
            warn!(error = %e, "archive insert failed");
        }
    }

    /// Run the polling loop until the handle signals stop.
    pub async fn run(&mut self, handle: &StopHandle) {
        info!(
            source = self.source.name(),
            sink = self.sink.name(),
            interval_ms = self.config.service.poll_interval_ms,
            "pipeline started"
        );

        let mut interval = tokio::time::interval(self.config.poll_interval());
        let mut polls: u64 = 0;

        while !handle.should_stop() {
            interval.tick().await;
            polls += 1;

            if let Ok(Some(outcome)) = self.process_next().await {
                debug!(?outcome, "poll processed an item");
            }

            if polls % MAINTENANCE_EVERY == 0 {
                self.maintenance();
            }
        }

        info!("pipeline stopped");
    }

    /// Sweep old processing records and prune the archive.
    pub fn maintenance(&mut self) {
        let removed = self
            .tracker
            .cleanup_old_records(self.config.processing.record_max_age_hours);
        if removed > 0 {
            debug!(removed, "processing records swept");
        }

        if let Some(max_age) = self.config.archive_max_age() {
            if let Ok(age) = chrono::Duration::from_std(max_age) {
                if let Err(e) = self.archive.prune_older_than(age) {
                    warn!(error = %e, "archive age prune failed");
                }
            }
        }
        if self.config.storage.max_items > 0 {
            if let Err(e) = self.archive.prune_keep_recent(self.config.storage.max_items) {
                warn!(error = %e, "archive size prune failed");
            }
        }
    }

    /// Swap in a rebuilt security filter between processing cycles.
    ///
    /// # Errors
    ///
    /// Returns an error (leaving the current filter active) if the new
    /// configuration contains an invalid pattern.
    pub fn reload_filter(&mut self, security: &SecurityConfig) -> Result<()> {
        self.filter = self.filter.reload(security)?;
        self.config.security = security.clone();
        info!("security filter reloaded");
        Ok(())
    }

    /// Snapshot of the security filter counters.
    #[must_use]
    pub fn filter_stats(&self) -> FilterStats {
        self.filter.statistics()
    }

    /// Aggregate processing statistics from the tracker.
    #[must_use]
    pub fn processing_stats(&self) -> ProcessingStats {
        self.tracker.processing_stats()
    }

    /// Archive statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn archive_stats(&self) -> Result<ArchiveStats> {
        self.archive.stats()
    }

    /// Access the archive (read paths for the CLI).
    #[must_use]
    pub fn archive(&self) -> &Archive {
        &self.archive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentKind;
    use std::collections::VecDeque;

    /// Source yielding a fixed queue of items.
    struct QueueSource {
        items: VecDeque<ContentItem>,
    }

    #[async_trait::async_trait]
    impl ContentSource for QueueSource {
        fn name(&self) -> &'static str {
            "queue"
        }

        async fn poll(&mut self) -> Result<Option<ContentItem>> {
            Ok(self.items.pop_front())
        }
    }

    /// Sink failing a set number of times before succeeding.
    struct FlakySink {
        failures_left: u32,
        uploads: Vec<String>,
    }

    impl FlakySink {
        fn reliable() -> Self {
            Self {
                failures_left: 0,
                uploads: Vec::new(),
            }
        }

        fn failing(failures: u32) -> Self {
            Self {
                failures_left: failures,
                uploads: Vec::new(),
            }
        }
    }

    #[async_trait::async_trait]
    impl Sink for FlakySink {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn upload(&mut self, content: &str, _description: &str) -> Option<String> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return None;
            }
            self.uploads.push(content.to_string());
            Some(format!("asset-{}", self.uploads.len()))
        }
    }

    fn pipeline_with(
        config: Config,
        items: Vec<ContentItem>,
        sink: FlakySink,
    ) -> Pipeline {
        Pipeline::in_memory(
            config,
            Box::new(QueueSource {
                items: items.into(),
            }),
            Box::new(sink),
        )
        .unwrap()
    }

    fn text_item(payload: &str) -> ContentItem {
        ContentItem::new(payload.to_string(), ContentKind::Text)
    }

    #[tokio::test]
    async fn test_clean_item_delivered_and_archived() {
        let mut pipeline = pipeline_with(
            Config::default(),
            vec![text_item("just a plain sentence")],
            FlakySink::reliable(),
        );

        let outcome = pipeline.process_next().await.unwrap().unwrap();
        assert!(matches!(
            outcome,
            ProcessOutcome::Delivered { attempts: 1, .. }
        ));

        let stats = pipeline.archive_stats().unwrap();
        assert_eq!(stats.total_items, 1);
        assert_eq!(stats.uploaded_items, 1);
    }

    #[tokio::test]
    async fn test_empty_source_yields_none() {
        let mut pipeline =
            pipeline_with(Config::default(), Vec::new(), FlakySink::reliable());
        assert!(pipeline.process_next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_suppressed() {
        let item = text_item("same thing twice");
        let mut pipeline = pipeline_with(
            Config::default(),
            vec![item.clone(), item],
            FlakySink::reliable(),
        );

        let first = pipeline.process_next().await.unwrap().unwrap();
        let second = pipeline.process_next().await.unwrap().unwrap();

        assert!(matches!(first, ProcessOutcome::Delivered { .. }));
        assert_eq!(second, ProcessOutcome::Duplicate);
    }

    #[tokio::test]
    async fn test_sensitive_item_redacted_before_sink() {
        let mut pipeline = pipeline_with(
            Config::default(),
            vec![text_item("password: hunter2")],
            FlakySink::reliable(),
        );

        let outcome = pipeline.process_next().await.unwrap().unwrap();
        assert!(matches!(outcome, ProcessOutcome::Delivered { .. }));

        // The archive holds the sanitized content only.
        let archived = pipeline.archive().get_recent(1).unwrap();
        assert!(archived[0].content.contains("[REDACTED_PASSWORDS]"));
        assert!(!archived[0].content.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_skip_policy_blocks_item_entirely() {
        let mut config = Config::default();
        config.security.skip_sensitive = true;

        let mut pipeline = pipeline_with(
            config,
            vec![text_item("password: hunter2")],
            FlakySink::reliable(),
        );

        let outcome = pipeline.process_next().await.unwrap().unwrap();
        assert_eq!(outcome, ProcessOutcome::SkippedSensitive);

        // Nothing reached the sink or the archive.
        assert_eq!(pipeline.archive_stats().unwrap().total_items, 0);
        assert_eq!(pipeline.processing_stats().total, 0);
        assert_eq!(pipeline.filter_stats().skipped_items, 1);
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        let mut pipeline = pipeline_with(
            Config::default(),
            vec![text_item("flaky delivery")],
            FlakySink::failing(1),
        );

        let outcome = pipeline.process_next().await.unwrap().unwrap();
        assert!(matches!(
            outcome,
            ProcessOutcome::Delivered { attempts: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_retries_exhausted_archives_locally() {
        let mut pipeline = pipeline_with(
            Config::default(),
            vec![text_item("never delivered")],
            FlakySink::failing(99),
        );

        let outcome = pipeline.process_next().await.unwrap().unwrap();
        // max_retry_attempts defaults to 3.
        assert_eq!(outcome, ProcessOutcome::Failed { attempts: 3 });

        // Local backup still happened, with no asset id.
        let archived = pipeline.archive().get_recent(1).unwrap();
        assert_eq!(archived.len(), 1);
        assert!(archived[0].asset_id.is_none());

        let stats = pipeline.archive_stats().unwrap();
        assert_eq!(stats.uploaded_items, 0);
    }

    #[tokio::test]
    async fn test_attempts_never_exceed_ceiling() {
        let mut config = Config::default();
        config.processing.max_retry_attempts = 2;

        let mut pipeline = pipeline_with(
            config,
            vec![text_item("capped retries")],
            FlakySink::failing(99),
        );

        let outcome = pipeline.process_next().await.unwrap().unwrap();
        assert_eq!(outcome, ProcessOutcome::Failed { attempts: 2 });

        let stats = pipeline.processing_stats();
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn test_too_short_payload_ignored() {
        let mut config = Config::default();
        config.service.min_content_length = 10;

        let mut pipeline =
            pipeline_with(config, vec![text_item("short")], FlakySink::reliable());

        let outcome = pipeline.process_next().await.unwrap().unwrap();
        assert_eq!(outcome, ProcessOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_learning_records_sink_outcomes() {
        let mut pipeline = pipeline_with(
            Config::default(),
            vec![text_item("learned delivery")],
            FlakySink::reliable(),
        );
        pipeline.process_next().await.unwrap();

        let stats = pipeline.processing_stats();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.completed, 1);
        assert!((stats.success_rate - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_filter_stats_accumulate() {
        let mut pipeline = pipeline_with(
            Config::default(),
            vec![
                text_item("plain one"),
                text_item("email bob@example.com inside"),
            ],
            FlakySink::reliable(),
        );
        pipeline.process_next().await.unwrap();
        pipeline.process_next().await.unwrap();

        let stats = pipeline.filter_stats();
        assert_eq!(stats.total_processed, 2);
        assert_eq!(stats.sensitive_detected, 1);
        assert_eq!(stats.redacted_items, 1);
    }

    #[tokio::test]
    async fn test_reload_filter_between_cycles() {
        let mut pipeline = pipeline_with(
            Config::default(),
            vec![text_item("ssn 123-45-6789"), text_item("ssn 987-65-4321")],
            FlakySink::reliable(),
        );

        pipeline.process_next().await.unwrap();

        let mut audit_only = SecurityConfig::default();
        audit_only.enable_redaction = false;
        pipeline.reload_filter(&audit_only).unwrap();

        pipeline.process_next().await.unwrap();

        let archived = pipeline.archive().get_recent(2).unwrap();
        // Newest first: audit-only passed the second item through intact.
        assert!(archived[0].content.contains("987-65-4321"));
        assert!(archived[1].content.contains("[REDACTED_SSN]"));
        // Counters carried across the reload.
        assert_eq!(pipeline.filter_stats().total_processed, 2);
    }

    #[tokio::test]
    async fn test_maintenance_runs_clean() {
        let mut pipeline = pipeline_with(
            Config::default(),
            vec![text_item("kept item")],
            FlakySink::reliable(),
        );
        pipeline.process_next().await.unwrap();
        pipeline.maintenance();

        // Fresh records and items survive a sweep.
        assert_eq!(pipeline.processing_stats().total, 1);
        assert_eq!(pipeline.archive_stats().unwrap().total_items, 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_signal() {
        let mut pipeline =
            pipeline_with(Config::default(), Vec::new(), FlakySink::reliable());

        let handle = StopHandle::new();
        handle.stop();
        // Returns promptly once the signal is set.
        pipeline.run(&handle).await;
    }

    #[test]
    fn test_stop_handle_clone_shares_signal() {
        let handle = StopHandle::new();
        let clone = handle.clone();

        assert!(!clone.should_stop());
        handle.stop();
        assert!(clone.should_stop());
    }
}
