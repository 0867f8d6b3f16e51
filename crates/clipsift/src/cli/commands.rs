//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::classify::ContentCategory;

/// Run command arguments.
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Process a single poll and exit instead of looping
    #[arg(long)]
    pub once: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Search command arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// The search query (searches sanitized content)
    pub query: String,

    /// Filter by content category
    #[arg(short = 'g', long, value_enum)]
    pub category: Option<CategoryArg>,

    /// Maximum number of results
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Recent command arguments.
#[derive(Debug, Args)]
pub struct RecentCommand {
    /// Show the last N archived items
    #[arg(short, long, default_value = "10")]
    pub last: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Clean command arguments.
#[derive(Debug, Args)]
pub struct CleanCommand {
    /// Apply the sweep without asking
    #[arg(short, long)]
    pub yes: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the configuration file path
    Path,

    /// Validate a configuration file
    Validate {
        /// Path to the file to validate (defaults to the standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns.
    Table,
    /// Content only, one item per block.
    Plain,
    /// JSON array.
    Json,
}

/// Content category as a CLI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    /// Source code.
    Code,
    /// Image data.
    Image,
    /// Free-form text.
    Text,
    /// Configuration.
    Config,
    /// Log output.
    Log,
    /// Structured data.
    Data,
    /// Unclassified.
    Unknown,
}

impl From<CategoryArg> for ContentCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Code => Self::Code,
            CategoryArg::Image => Self::Image,
            CategoryArg::Text => Self::Text,
            CategoryArg::Config => Self::Config,
            CategoryArg::Log => Self::Log,
            CategoryArg::Data => Self::Data,
            CategoryArg::Unknown => Self::Unknown,
        }
    }
}
