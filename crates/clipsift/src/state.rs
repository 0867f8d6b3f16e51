//! Processing state tracking and strategy learning.
//!
//! Every content item gets a lifecycle record keyed by its content hash:
//! attempts, terminal outcome, timing, and error text. Completed records
//! feed per-category learning data that biases future strategy selection
//! toward whatever has actually worked.
//!
//! The tracker's full state survives restarts as a JSON blob. Loading
//! tolerates a missing or corrupt store by starting empty; saving is a
//! synchronous best-effort write whose failure is logged and swallowed,
//! never aborting content processing.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::{default_strategy, ContentCategory, Strategy};
use crate::error::{Error, Result};

/// Lifecycle state of a processing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    /// Known but not yet attempted.
    Pending,
    /// An attempt is underway.
    Processing,
    /// Terminal success.
    Completed,
    /// Terminal failure (or awaiting retry).
    Failed,
    /// A retry was granted and is about to run.
    Retrying,
}

impl std::fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Retrying => "retrying",
        };
        write!(f, "{s}")
    }
}

/// One item's processing lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingRecord {
    /// Stable content-derived identifier (the content hash).
    pub id: String,
    /// Category the item was classified into.
    pub category: ContentCategory,
    /// Strategy chosen for the item.
    pub strategy: Strategy,
    /// Current lifecycle state.
    pub state: ProcessingState,
    /// When processing first started (restamped on retry).
    pub created_at: DateTime<Utc>,
    /// Delivery attempts so far.
    pub attempts: u32,
    /// Whether the item ultimately succeeded.
    pub success: bool,
    /// Error text from the last failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Wall-clock processing time of the last attempt, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_secs: Option<f64>,
}

/// Accumulated outcomes for one (category, strategy) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningStats {
    /// Completed attempts recorded.
    pub total: u64,
    /// Successful attempts recorded.
    pub successes: u64,
    /// `successes / total`, as a percentage.
    pub success_rate: f64,
    /// Running mean of processing time, in seconds.
    pub avg_processing_time: f64,
}

/// Learning data for one content category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryLearning {
    /// Per-strategy outcome statistics.
    pub strategies: BTreeMap<Strategy, LearningStats>,
}

/// Aggregate statistics over all records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingStats {
    /// Total records tracked.
    pub total: usize,
    /// Records in the completed state.
    pub completed: usize,
    /// Records in the failed state.
    pub failed: usize,
    /// Records in the pending state.
    pub pending: usize,
    /// Completed share of all records, as a percentage.
    pub success_rate: f64,
    /// Per-strategy totals and successes.
    pub strategy_performance: BTreeMap<Strategy, StrategyPerformance>,
}

/// Totals for one strategy across all records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StrategyPerformance {
    /// Records using this strategy.
    pub total: usize,
    /// Records using this strategy that succeeded.
    pub successes: usize,
}

/// The on-disk shape of the tracker's state.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    records: BTreeMap<String, ProcessingRecord>,
    learning: BTreeMap<ContentCategory, CategoryLearning>,
    timestamp: Option<DateTime<Utc>>,
}

/// Tracks processing lifecycles and learns per-category strategies.
#[derive(Debug)]
pub struct ProcessingStateTracker {
    path: Option<PathBuf>,
    max_attempts: u32,
    records: BTreeMap<String, ProcessingRecord>,
    learning: BTreeMap<ContentCategory, CategoryLearning>,
}

impl ProcessingStateTracker {
    /// Create an in-memory tracker (no persistence).
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            path: None,
            max_attempts,
            records: BTreeMap::new(),
            learning: BTreeMap::new(),
        }
    }

    /// Create a tracker persisting to the given path.
    ///
    /// Existing state is loaded; a missing file starts empty, and a
    /// corrupt one is logged and discarded rather than failing.
    #[must_use]
    pub fn with_persistence(path: PathBuf, max_attempts: u32) -> Self {
        let mut tracker = Self::new(max_attempts);
        tracker.path = Some(path);

        match tracker.load() {
            Ok(loaded) => {
                if loaded {
                    info!(
                        records = tracker.records.len(),
                        "loaded processing state"
                    );
                }
            }
            Err(e) => {
                warn!(error = %e, "discarding unreadable processing state, starting empty");
                tracker.records.clear();
                tracker.learning.clear();
            }
        }

        tracker
    }

    /// The configured attempt ceiling.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Start processing an item, creating or overwriting its record.
    pub fn start_processing(
        &mut self,
        id: &str,
        category: ContentCategory,
        strategy: Strategy,
    ) -> ProcessingRecord {
        let record = ProcessingRecord {
            id: id.to_string(),
            category,
            strategy,
            state: ProcessingState::Processing,
            created_at: Utc::now(),
            attempts: 1,
            success: false,
            error_message: None,
            processing_time_secs: None,
        };
        self.records.insert(id.to_string(), record.clone());
        self.persist();
        record
    }

    /// Record the outcome of a processing attempt.
    ///
    /// Transitions the record to completed or failed, stores timing and
    /// error text, and folds the outcome into the learning data. Unknown
    /// ids are a no-op.
    pub fn complete_processing(
        &mut self,
        id: &str,
        success: bool,
        processing_time_secs: Option<f64>,
        error_message: Option<String>,
    ) {
        let Some(record) = self.records.get_mut(id) else {
            return;
        };

        record.state = if success {
            ProcessingState::Completed
        } else {
            ProcessingState::Failed
        };
        record.success = success;
        record.processing_time_secs = processing_time_secs;
        record.error_message = error_message;

        let category = record.category;
        let strategy = record.strategy;
        self.update_learning(category, strategy, success, processing_time_secs);
        self.persist();
    }

    /// Ask for another attempt at a failed item.
    ///
    /// Grants the retry (incrementing attempts, restamping the record) and
    /// returns `true` while the attempt count is below the ceiling;
    /// returns `false` once `attempts == max_attempts`, which the caller
    /// must treat as terminal failure. Unknown ids return `false`.
    pub fn retry_processing(&mut self, id: &str) -> bool {
        let Some(record) = self.records.get_mut(id) else {
            return false;
        };

        if record.attempts >= self.max_attempts {
            debug!(id, attempts = record.attempts, "retry refused, ceiling reached");
            return false;
        }

        record.attempts += 1;
        record.state = ProcessingState::Retrying;
        record.created_at = Utc::now();
        self.persist();
        true
    }

    /// The best strategy for a category, judged by observed success rates.
    ///
    /// With learning history the strategy with the highest success rate
    /// wins; ties resolve to the first strategy in declaration order
    /// (immediate, batch, priority, defer). Without history the fixed
    /// per-category default applies.
    #[must_use]
    pub fn optimal_strategy(&self, category: ContentCategory) -> Strategy {
        if let Some(learning) = self.learning.get(&category) {
            let mut best: Option<(Strategy, f64)> = None;
            for (strategy, stats) in &learning.strategies {
                match best {
                    Some((_, rate)) if stats.success_rate <= rate => {}
                    _ => best = Some((*strategy, stats.success_rate)),
                }
            }
            if let Some((strategy, _)) = best {
                return strategy;
            }
        }

        default_strategy(category)
    }

    /// Learning statistics for a (category, strategy) pair, if recorded.
    #[must_use]
    pub fn learning_stats(
        &self,
        category: ContentCategory,
        strategy: Strategy,
    ) -> Option<LearningStats> {
        self.learning
            .get(&category)
            .and_then(|l| l.strategies.get(&strategy))
            .copied()
    }

    /// Remove records older than the given horizon.
    ///
    /// Returns the number of records removed.
    pub fn cleanup_old_records(&mut self, max_age_hours: u32) -> usize {
        let cutoff = Utc::now() - chrono::Duration::hours(i64::from(max_age_hours));
        let before = self.records.len();
        self.records.retain(|_, r| r.created_at >= cutoff);
        let removed = before - self.records.len();

        if removed > 0 {
            info!(removed, "cleaned up old processing records");
            self.persist();
        }
        removed
    }

    /// Aggregate statistics over all tracked records.
    #[must_use]
    pub fn processing_stats(&self) -> ProcessingStats {
        let total = self.records.len();
        if total == 0 {
            return ProcessingStats::default();
        }

        let mut stats = ProcessingStats {
            total,
            ..ProcessingStats::default()
        };

        for record in self.records.values() {
            match record.state {
                ProcessingState::Completed => stats.completed += 1,
                ProcessingState::Failed => stats.failed += 1,
                ProcessingState::Pending => stats.pending += 1,
                ProcessingState::Processing | ProcessingState::Retrying => {}
            }

            let perf = stats
                .strategy_performance
                .entry(record.strategy)
                .or_default();
            perf.total += 1;
            if record.success {
                perf.successes += 1;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        {
            stats.success_rate = (stats.completed as f64 / total as f64) * 100.0;
        }
        stats
    }

    /// Look up a record by id.
    #[must_use]
    pub fn record(&self, id: &str) -> Option<&ProcessingRecord> {
        self.records.get(id)
    }

    /// Number of tracked records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no records are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fold one completed attempt into the learning data.
    fn update_learning(
        &mut self,
        category: ContentCategory,
        strategy: Strategy,
        success: bool,
        processing_time_secs: Option<f64>,
    ) {
        let stats = self
            .learning
            .entry(category)
            .or_default()
            .strategies
            .entry(strategy)
            .or_default();

        stats.total += 1;
        if success {
            stats.successes += 1;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            stats.success_rate = (stats.successes as f64 / stats.total as f64) * 100.0;
        }

        if let Some(sample) = processing_time_secs {
            #[allow(clippy::cast_precision_loss)]
            let total = stats.total as f64;
            stats.avg_processing_time =
                ((stats.avg_processing_time * (total - 1.0)) + sample) / total;
        }
    }

    /// Best-effort synchronous save; failure is logged and swallowed.
    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "failed to persist processing state");
        }
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let state = PersistedState {
            records: self.records.clone(),
            learning: self.learning.clone(),
            timestamp: Some(Utc::now()),
        };
        let json = serde_json::to_string_pretty(&state)?;
        std::fs::write(path, json)
            .map_err(|e| Error::state_save(path.clone(), e.to_string()))?;
        Ok(())
    }

    /// Load persisted state. Returns `Ok(true)` if a file was read.
    fn load(&mut self) -> Result<bool> {
        let Some(path) = &self.path else {
            return Ok(false);
        };
        if !path.exists() {
            return Ok(false);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::state_load(path.clone(), e.to_string()))?;
        let state: PersistedState = serde_json::from_str(&raw)
            .map_err(|e| Error::state_load(path.clone(), e.to_string()))?;

        self.records = state.records;
        self.learning = state.learning;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ProcessingStateTracker {
        ProcessingStateTracker::new(3)
    }

    #[test]
    fn test_start_processing_creates_record() {
        let mut t = tracker();
        let record = t.start_processing("x", ContentCategory::Text, Strategy::Immediate);

        assert_eq!(record.id, "x");
        assert_eq!(record.state, ProcessingState::Processing);
        assert_eq!(record.attempts, 1);
        assert!(!record.success);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_start_processing_overwrites() {
        let mut t = tracker();
        t.start_processing("x", ContentCategory::Text, Strategy::Immediate);
        t.complete_processing("x", false, None, Some("boom".to_string()));
        t.start_processing("x", ContentCategory::Text, Strategy::Batch);

        let record = t.record("x").unwrap();
        assert_eq!(record.attempts, 1);
        assert_eq!(record.strategy, Strategy::Batch);
        assert_eq!(record.state, ProcessingState::Processing);
        assert!(record.error_message.is_none());
    }

    #[test]
    fn test_complete_processing_success() {
        let mut t = tracker();
        t.start_processing("x", ContentCategory::Text, Strategy::Immediate);
        t.complete_processing("x", true, Some(0.5), None);

        let record = t.record("x").unwrap();
        assert_eq!(record.state, ProcessingState::Completed);
        assert!(record.success);
        assert_eq!(record.processing_time_secs, Some(0.5));
    }

    #[test]
    fn test_complete_processing_failure() {
        let mut t = tracker();
        t.start_processing("x", ContentCategory::Code, Strategy::Priority);
        t.complete_processing("x", false, Some(1.2), Some("sink refused".to_string()));

        let record = t.record("x").unwrap();
        assert_eq!(record.state, ProcessingState::Failed);
        assert!(!record.success);
        assert_eq!(record.error_message.as_deref(), Some("sink refused"));
    }

    #[test]
    fn test_complete_unknown_id_is_noop() {
        let mut t = tracker();
        t.complete_processing("ghost", true, None, None);
        assert!(t.is_empty());
    }

    #[test]
    fn test_retry_until_ceiling() {
        let mut t = tracker();
        t.start_processing("x", ContentCategory::Text, Strategy::Immediate);

        // attempts: 1 -> 2 -> 3, then refused
        assert!(t.retry_processing("x"));
        assert!(t.retry_processing("x"));
        assert!(!t.retry_processing("x"));

        let record = t.record("x").unwrap();
        assert_eq!(record.attempts, 3);
        assert_eq!(record.state, ProcessingState::Retrying);
    }

    #[test]
    fn test_retry_never_exceeds_ceiling() {
        let mut t = tracker();
        t.start_processing("x", ContentCategory::Text, Strategy::Immediate);

        for _ in 0..10 {
            t.retry_processing("x");
        }
        assert_eq!(t.record("x").unwrap().attempts, 3);
    }

    #[test]
    fn test_retry_unknown_id_returns_false() {
        let mut t = tracker();
        assert!(!t.retry_processing("ghost"));
    }

    #[test]
    fn test_retry_refused_exactly_at_ceiling() {
        let mut t = ProcessingStateTracker::new(1);
        t.start_processing("x", ContentCategory::Text, Strategy::Immediate);
        // attempts == max_attempts from the start
        assert!(!t.retry_processing("x"));
        assert_eq!(t.record("x").unwrap().attempts, 1);
    }

    #[test]
    fn test_optimal_strategy_defaults_without_history() {
        let t = tracker();
        assert_eq!(t.optimal_strategy(ContentCategory::Code), Strategy::Priority);
        assert_eq!(
            t.optimal_strategy(ContentCategory::Image),
            Strategy::Immediate
        );
        assert_eq!(t.optimal_strategy(ContentCategory::Log), Strategy::Batch);
        assert_eq!(
            t.optimal_strategy(ContentCategory::Unknown),
            Strategy::Immediate
        );
    }

    #[test]
    fn test_optimal_strategy_scenario() {
        let mut t = tracker();
        t.start_processing("x", ContentCategory::Text, Strategy::Immediate);
        t.complete_processing("x", true, Some(0.5), None);

        assert_eq!(t.optimal_strategy(ContentCategory::Text), Strategy::Immediate);
        let stats = t
            .learning_stats(ContentCategory::Text, Strategy::Immediate)
            .unwrap();
        assert!((stats.success_rate - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_optimal_strategy_prefers_higher_success_rate() {
        let mut t = tracker();

        // batch: 1/2 succeed
        t.start_processing("a", ContentCategory::Log, Strategy::Batch);
        t.complete_processing("a", true, None, None);
        t.start_processing("b", ContentCategory::Log, Strategy::Batch);
        t.complete_processing("b", false, None, None);

        // immediate: 1/1 succeeds
        t.start_processing("c", ContentCategory::Log, Strategy::Immediate);
        t.complete_processing("c", true, None, None);

        assert_eq!(t.optimal_strategy(ContentCategory::Log), Strategy::Immediate);
    }

    #[test]
    fn test_optimal_strategy_tie_break_declaration_order() {
        let mut t = tracker();

        // Both strategies at 100%; immediate comes first in declaration order.
        t.start_processing("a", ContentCategory::Data, Strategy::Priority);
        t.complete_processing("a", true, None, None);
        t.start_processing("b", ContentCategory::Data, Strategy::Immediate);
        t.complete_processing("b", true, None, None);

        assert_eq!(t.optimal_strategy(ContentCategory::Data), Strategy::Immediate);
    }

    #[test]
    fn test_learning_rates_recomputed_exactly() {
        let mut t = tracker();
        for (id, success) in [("a", true), ("b", true), ("c", false), ("d", true)] {
            t.start_processing(id, ContentCategory::Text, Strategy::Immediate);
            t.complete_processing(id, success, None, None);
        }

        let stats = t
            .learning_stats(ContentCategory::Text, Strategy::Immediate)
            .unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.successes, 3);
        assert!((stats.success_rate - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_learning_running_mean_processing_time() {
        let mut t = tracker();
        t.start_processing("a", ContentCategory::Text, Strategy::Immediate);
        t.complete_processing("a", true, Some(1.0), None);
        t.start_processing("b", ContentCategory::Text, Strategy::Immediate);
        t.complete_processing("b", true, Some(3.0), None);

        let stats = t
            .learning_stats(ContentCategory::Text, Strategy::Immediate)
            .unwrap();
        assert!((stats.avg_processing_time - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_learning_ignores_missing_time_sample() {
        let mut t = tracker();
        t.start_processing("a", ContentCategory::Text, Strategy::Immediate);
        t.complete_processing("a", true, Some(2.0), None);
        t.start_processing("b", ContentCategory::Text, Strategy::Immediate);
        t.complete_processing("b", true, None, None);

        let stats = t
            .learning_stats(ContentCategory::Text, Strategy::Immediate)
            .unwrap();
        // The second completion contributed no sample, so the mean is
        // untouched.
        assert_eq!(stats.total, 2);
        assert!((stats.avg_processing_time - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cleanup_old_records() {
        let mut t = tracker();
        t.start_processing("old", ContentCategory::Text, Strategy::Immediate);
        t.start_processing("new", ContentCategory::Text, Strategy::Immediate);

        // Backdate one record past the horizon.
        if let Some(r) = t.records.get_mut("old") {
            r.created_at = Utc::now() - chrono::Duration::hours(48);
        }

        let removed = t.cleanup_old_records(24);
        assert_eq!(removed, 1);
        assert!(t.record("old").is_none());
        assert!(t.record("new").is_some());
    }

    #[test]
    fn test_cleanup_nothing_to_remove() {
        let mut t = tracker();
        t.start_processing("x", ContentCategory::Text, Strategy::Immediate);
        assert_eq!(t.cleanup_old_records(24), 0);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_processing_stats_empty() {
        let t = tracker();
        let stats = t.processing_stats();
        assert_eq!(stats.total, 0);
        assert!(stats.strategy_performance.is_empty());
    }

    #[test]
    fn test_processing_stats_counts() {
        let mut t = tracker();
        t.start_processing("a", ContentCategory::Text, Strategy::Immediate);
        t.complete_processing("a", true, None, None);
        t.start_processing("b", ContentCategory::Code, Strategy::Priority);
        t.complete_processing("b", false, None, None);
        t.start_processing("c", ContentCategory::Log, Strategy::Batch);

        let stats = t.processing_stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.pending, 0);

        let immediate = stats.strategy_performance[&Strategy::Immediate];
        assert_eq!(immediate.total, 1);
        assert_eq!(immediate.successes, 1);
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let mut t = ProcessingStateTracker::with_persistence(path.clone(), 3);
            t.start_processing("x", ContentCategory::Text, Strategy::Immediate);
            t.complete_processing("x", true, Some(0.5), None);
        }

        let t = ProcessingStateTracker::with_persistence(path, 3);
        assert_eq!(t.len(), 1);
        assert_eq!(t.record("x").unwrap().state, ProcessingState::Completed);
        assert_eq!(t.optimal_strategy(ContentCategory::Text), Strategy::Immediate);
    }

    #[test]
    fn test_persistence_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let t = ProcessingStateTracker::with_persistence(dir.path().join("absent.json"), 3);
        assert!(t.is_empty());
    }

    #[test]
    fn test_persistence_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not valid json").unwrap();

        let t = ProcessingStateTracker::with_persistence(path, 3);
        assert!(t.is_empty());
    }

    #[test]
    fn test_persistence_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/state.json");

        let mut t = ProcessingStateTracker::with_persistence(path.clone(), 3);
        t.start_processing("x", ContentCategory::Text, Strategy::Immediate);

        assert!(path.exists());
    }

    #[test]
    fn test_persisted_layout_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut t = ProcessingStateTracker::with_persistence(path.clone(), 3);
        t.start_processing("x", ContentCategory::Text, Strategy::Immediate);
        t.complete_processing("x", true, Some(0.5), None);

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.get("records").is_some());
        assert!(value.get("learning").is_some());
        assert!(value.get("timestamp").is_some());
        assert_eq!(
            value["records"]["x"]["state"],
            serde_json::json!("completed")
        );
        assert!(value["learning"]["text"]["strategies"]["immediate"]["success_rate"].is_number());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ProcessingState::Pending.to_string(), "pending");
        assert_eq!(ProcessingState::Retrying.to_string(), "retrying");
    }

    #[test]
    fn test_unknown_state_rejected_at_boundary() {
        let result: std::result::Result<ProcessingState, _> =
            serde_json::from_str(r#""exploded""#);
        assert!(result.is_err());
    }
}
