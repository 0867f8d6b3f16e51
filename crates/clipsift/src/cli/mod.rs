//! Command-line interface for clipsift.
//!
//! This module provides the CLI structure and command handlers for the
//! `clipsift` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CategoryArg, CleanCommand, ConfigCommand, OutputFormat, RecentCommand, RunCommand,
    SearchCommand, StatusCommand,
};

/// clipsift - keep secrets out of your clipboard pipeline
///
/// Watches a content feed, strips or blocks sensitive data, forwards
/// sanitized items to a sink, and keeps a local archive with duplicate
/// suppression.
#[derive(Debug, Parser)]
#[command(name = "clipsift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the processing pipeline
    Run(RunCommand),

    /// Show pipeline and archive status
    Status(StatusCommand),

    /// Search archived content
    Search(SearchCommand),

    /// List recently archived items
    Recent(RecentCommand),

    /// Sweep old processing records and prune the archive
    Clean(CleanCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
