//! Content classification for routing decisions.
//!
//! This module assigns a category to captured content by scoring the first
//! few lines against per-category pattern sets, and maps categories to
//! processing strategies used by the state tracker.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::content::ContentKind;

/// Number of leading lines inspected during classification.
const SAMPLE_LINES: usize = 10;

/// Minimum number of matching lines for a category to win.
const MATCH_THRESHOLD: usize = 2;

/// The category a content item was classified into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    /// Source code.
    Code,
    /// Image data.
    Image,
    /// Free-form text.
    Text,
    /// Configuration (key/value assignments, TOML/INI sections).
    Config,
    /// Log output.
    Log,
    /// Structured data (JSON, XML, key-value dumps).
    Data,
    /// Nothing matched.
    Unknown,
}

impl std::fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Code => "code",
            Self::Image => "image",
            Self::Text => "text",
            Self::Config => "config",
            Self::Log => "log",
            Self::Data => "data",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// The processing strategy recommended for a content item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Process as soon as the item is seen.
    Immediate,
    /// Queue for batched processing.
    Batch,
    /// Process ahead of queued work.
    Priority,
    /// Hold until explicitly released.
    Defer,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Immediate => "immediate",
            Self::Batch => "batch",
            Self::Priority => "priority",
            Self::Defer => "defer",
        };
        write!(f, "{s}")
    }
}

/// The fixed default strategy for a category, used when no learning history
/// exists for it.
#[must_use]
pub fn default_strategy(category: ContentCategory) -> Strategy {
    match category {
        ContentCategory::Code | ContentCategory::Config => Strategy::Priority,
        ContentCategory::Log => Strategy::Batch,
        ContentCategory::Image
        | ContentCategory::Text
        | ContentCategory::Data
        | ContentCategory::Unknown => Strategy::Immediate,
    }
}

/// The result of classifying a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The detected category.
    pub category: ContentCategory,
    /// The default strategy for that category.
    pub strategy: Strategy,
    /// Processing priority, 1-10, higher is more important.
    pub priority: u8,
}

/// Classifies content by scoring line patterns.
#[derive(Debug)]
pub struct ContentAnalyzer {
    code_patterns: Vec<Regex>,
    config_patterns: Vec<Regex>,
    log_patterns: Vec<Regex>,
    data_patterns: Vec<Regex>,
}

impl ContentAnalyzer {
    /// Create a new analyzer with the built-in pattern sets.
    #[must_use]
    pub fn new() -> Self {
        Self {
            code_patterns: compile_all(&[
                r"(?i)^(function|def|class|import|from|const|let|var|#include|fn|pub|use)\b",
                r"(?i)^\s*(if|for|while|switch|match|case|try|catch)\b",
                r"^\s*[{}()\[\]]",
                r"^\s*//|^\s*#!|^\s*/\*",
                r"(?i)^\s*<\?php|^\s*<script|^\s*<html",
            ]),
            config_patterns: compile_all(&[
                r"^\s*[a-zA-Z_][a-zA-Z0-9_]*\s*[:=]",
                r"^\s*\[.*\]\s*$",
                r"^\s*\{.*\}\s*$",
                r"^\s*<!--.*-->\s*$",
            ]),
            log_patterns: compile_all(&[
                r"^\d{4}-\d{2}-\d{2}",
                r"^\d{2}:\d{2}:\d{2}",
                r"(?i)\[(ERROR|WARN|INFO|DEBUG|TRACE)\]",
                r"(?i)\b(Exception|Error|Warning|Traceback)\b",
            ]),
            data_patterns: compile_all(&[
                r"^\s*[\{\[]\s*$",
                r#"^\s*".*":\s*"#,
                r"^\s*\d+\.\d+",
                r"^\s*[A-Z_]{3,}",
            ]),
        }
    }

    /// Classify a content item.
    ///
    /// Image payloads are categorized directly; text payloads are scored
    /// line by line, with precedence code, config, log, data, then text.
    #[must_use]
    pub fn analyze(&self, payload: &str, kind: ContentKind) -> Classification {
        let category = if kind == ContentKind::Image {
            ContentCategory::Image
        } else {
            self.detect_category(payload)
        };

        Classification {
            category,
            strategy: default_strategy(category),
            priority: Self::priority_for(category, payload),
        }
    }

    fn detect_category(&self, payload: &str) -> ContentCategory {
        let lines: Vec<&str> = payload.lines().take(SAMPLE_LINES).collect();

        let score = |patterns: &[Regex]| {
            lines
                .iter()
                .filter(|line| patterns.iter().any(|p| p.is_match(line)))
                .count()
        };

        if score(&self.code_patterns) >= MATCH_THRESHOLD {
            ContentCategory::Code
        } else if score(&self.config_patterns) >= MATCH_THRESHOLD {
            ContentCategory::Config
        } else if score(&self.log_patterns) >= MATCH_THRESHOLD {
            ContentCategory::Log
        } else if score(&self.data_patterns) >= MATCH_THRESHOLD {
            ContentCategory::Data
        } else {
            ContentCategory::Text
        }
    }

    /// Compute a 1-10 processing priority for the content.
    fn priority_for(category: ContentCategory, payload: &str) -> u8 {
        let base: u8 = match category {
            ContentCategory::Code => 8,
            ContentCategory::Image => 7,
            ContentCategory::Config => 6,
            ContentCategory::Data => 5,
            ContentCategory::Text => 4,
            ContentCategory::Log => 3,
            ContentCategory::Unknown => 2,
        };

        let mut priority = base;
        if payload.len() > 1000 {
            priority += 1;
        }
        let lower = payload.to_lowercase();
        if ["error", "exception", "fail"].iter().any(|k| lower.contains(k)) {
            priority += 2;
        }

        priority.min(10)
    }
}

impl Default for ContentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("built-in classifier pattern must compile"))
        .collect()
}
