//! Security filter orchestration.
//!
//! Ties the detector and redactor together under the configured policy
//! and keeps lifetime statistics for the filter instance.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SecurityConfig;
use crate::error::Result;

use super::detector::{SensitiveContentDetector, SensitiveMatch};
use super::patterns::{PatternRegistry, RuleCategory, Severity};
use super::redactor::redact;

/// Lifetime counters for one filter instance.
///
/// Counters only move forward; they are reset solely by
/// [`SecurityFilter::reset_statistics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    /// Items passed through `filter`.
    pub total_processed: u64,
    /// Items with at least one match.
    pub sensitive_detected: u64,
    /// Items that were redacted.
    pub redacted_items: u64,
    /// Items skipped under the skip-sensitive policy.
    pub skipped_items: u64,
}

/// The result of one `filter` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// The content to forward. Unchanged when nothing matched, redacted
    /// when redaction ran, and the ORIGINAL payload when `should_skip` is
    /// set (the caller must discard it, not forward it).
    pub content: String,
    /// The caller must drop this item entirely.
    pub should_skip: bool,
    /// Every match found, in detection order.
    pub matches: Vec<SensitiveMatch>,
}

/// Detects and strips sensitive content per the configured policy.
#[derive(Debug)]
pub struct SecurityFilter {
    enable_redaction: bool,
    skip_sensitive: bool,
    detector: SensitiveContentDetector,
    stats: FilterStats,
}

impl SecurityFilter {
    /// Create a filter with the default policy (redaction on, skipping off)
    /// and the built-in rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enable_redaction: true,
            skip_sensitive: false,
            detector: SensitiveContentDetector::with_builtins(),
            stats: FilterStats::default(),
        }
    }

    /// Build a filter from configuration.
    ///
    /// Custom patterns are registered on top of the built-ins.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::InvalidPattern`] if a custom pattern
    /// does not compile.
    pub fn from_config(config: &SecurityConfig) -> Result<Self> {
        let mut registry = PatternRegistry::with_builtins();
        for custom in &config.custom_patterns {
            let category = RuleCategory::from_group(&custom.group);
            registry.register(category, &custom.name, &custom.pattern)?;
        }

        Ok(Self {
            enable_redaction: config.enable_redaction,
            skip_sensitive: config.skip_sensitive,
            detector: SensitiveContentDetector::new(registry),
            stats: FilterStats::default(),
        })
    }

    /// Build a replacement filter from new configuration, carrying the
    /// lifetime statistics over.
    ///
    /// The host swaps the returned instance in between processing cycles,
    /// so every in-flight `filter` call completes against one consistent
    /// rule set.
    ///
    /// # Errors
    ///
    /// Returns an error if a custom pattern in the new configuration does
    /// not compile; the current filter stays valid in that case.
    pub fn reload(&self, config: &SecurityConfig) -> Result<Self> {
        let mut replacement = Self::from_config(config)?;
        replacement.stats = self.stats;
        Ok(replacement)
    }

    /// Filter one content payload.
    ///
    /// With no matches the payload passes through untouched. A
    /// high-severity match under the skip policy returns the original
    /// payload flagged for discard. Otherwise matches are redacted, or, if
    /// redaction is disabled, reported while the payload passes through
    /// (audit-only mode).
    pub fn filter(&mut self, content: &str) -> FilterOutcome {
        self.stats.total_processed += 1;

        let matches = self.detector.detect(content);
        if matches.is_empty() {
            return FilterOutcome {
                content: content.to_string(),
                should_skip: false,
                matches,
            };
        }

        self.stats.sensitive_detected += 1;

        if self.skip_sensitive && matches.iter().any(|m| m.severity == Severity::High) {
            self.stats.skipped_items += 1;
            warn!(
                matches = matches.len(),
                "high-severity content skipped"
            );
            return FilterOutcome {
                content: content.to_string(),
                should_skip: true,
                matches,
            };
        }

        if self.enable_redaction {
            let sanitized = redact(content, &matches);
            self.stats.redacted_items += 1;
            debug!(matches = matches.len(), "content redacted");
            return FilterOutcome {
                content: sanitized,
                should_skip: false,
                matches,
            };
        }

        // Audit-only mode: report matches, pass content through unmodified.
        debug!(matches = matches.len(), "sensitive content reported (audit only)");
        FilterOutcome {
            content: content.to_string(),
            should_skip: false,
            matches,
        }
    }

    /// Get a snapshot copy of the lifetime statistics.
    #[must_use]
    pub fn statistics(&self) -> FilterStats {
        self.stats
    }

    /// Reset the lifetime statistics to zero.
    pub fn reset_statistics(&mut self) {
        self.stats = FilterStats::default();
    }

    /// Check whether redaction is enabled.
    #[must_use]
    pub fn redaction_enabled(&self) -> bool {
        self.enable_redaction
    }

    /// Check whether the skip-sensitive policy is enabled.
    #[must_use]
    pub fn skip_sensitive_enabled(&self) -> bool {
        self.skip_sensitive
    }
}

impl Default for SecurityFilter {
    fn default() -> Self {
        Self::new()
    }
}
