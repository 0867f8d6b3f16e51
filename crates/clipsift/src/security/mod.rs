//! Sensitive-content detection and filtering.
//!
//! This module keeps secrets out of the pipeline's output:
//!
//! - **Pattern registry**: named detection rules grouped by sensitivity
//!   category, with built-in rules for passwords, API keys, tokens,
//!   database URLs, private keys, emails, credit cards, and SSNs, plus
//!   runtime registration of custom rules.
//!
//! - **Detection**: every rule is scanned case-insensitively across the
//!   whole payload, producing positioned matches with a severity.
//!
//! - **Redaction**: matched spans are replaced with category-tagged
//!   markers, applied back to front so earlier offsets stay valid.
//!
//! - **Policy**: the filter either redacts, skips the item outright on a
//!   high-severity hit, or passes content through in audit-only mode,
//!   keeping lifetime counters either way.
//!
//! # Example
//!
//! ```
//! use clipsift::security::SecurityFilter;
//!
//! let mut filter = SecurityFilter::new();
//! let outcome = filter.filter("password: hunter2");
//!
//! assert!(!outcome.matches.is_empty());
//! assert!(outcome.content.contains("[REDACTED_PASSWORDS]"));
//! ```

mod detector;
mod filter;
mod patterns;
mod redactor;

pub use detector::{SensitiveContentDetector, SensitiveMatch};
pub use filter::{FilterOutcome, FilterStats, SecurityFilter};
pub use patterns::{PatternRegistry, PatternRule, RuleCategory, RuleId, Severity};
pub use redactor::redact;
