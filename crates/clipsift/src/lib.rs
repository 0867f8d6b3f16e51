//! `clipsift` - a content-safety pipeline for clipboard capture
//!
//! This library takes raw captured content through duplicate suppression,
//! sensitive-data detection and redaction, and delivery to a pluggable
//! sink, while a state tracker records outcomes and learns which
//! processing strategy works best per content category. Sanitized items
//! are archived locally as a backup regardless of delivery success.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod classify;
pub mod cli;
pub mod config;
pub mod content;
pub mod dedup;
pub mod error;
pub mod logging;
pub mod security;
pub mod service;
pub mod sinks;
pub mod state;
pub mod storage;

pub use classify::{ContentAnalyzer, ContentCategory, Strategy};
pub use config::Config;
pub use content::{ContentItem, ContentKind, ContentSource, Sink};
pub use dedup::DeduplicationGate;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use security::{FilterOutcome, SecurityFilter};
pub use service::{Pipeline, ProcessOutcome, StopHandle};
pub use state::ProcessingStateTracker;
pub use storage::{Archive, ArchiveStats};
