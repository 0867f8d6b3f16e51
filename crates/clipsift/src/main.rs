//! `clipsift` - CLI for the clipboard content-safety pipeline.
//!
//! This binary wires the pipeline to a spool-directory source and a
//! backup-directory sink, and provides commands for inspecting the
//! archive and processing state.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use clipsift::cli::{
    CleanCommand, Cli, Command, ConfigCommand, OutputFormat, RecentCommand, RunCommand,
    SearchCommand,
};
use clipsift::service::{Pipeline, StopHandle};
use clipsift::sinks::{DirectorySink, SpoolSource};
use clipsift::state::ProcessingStateTracker;
use clipsift::storage::{Archive, ArchivedItem};
use clipsift::{init_logging, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Run(run_cmd) => handle_run(config, &run_cmd).await,
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Search(search_cmd) => handle_search(&config, &search_cmd),
        Command::Recent(recent_cmd) => handle_recent(&config, &recent_cmd),
        Command::Clean(clean_cmd) => handle_clean(&config, &clean_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_run(config: Config, cmd: &RunCommand) -> anyhow::Result<()> {
    let spool_dir = config.spool_dir();
    let backup_dir = config.backup_dir();

    let source = SpoolSource::new(&spool_dir).context("creating spool source")?;
    let sink = DirectorySink::new(&backup_dir).context("creating backup sink")?;
    let mut pipeline =
        Pipeline::new(config, Box::new(source), Box::new(sink)).context("building pipeline")?;

    if cmd.once {
        match pipeline.process_next().await? {
            Some(outcome) => println!("Processed: {outcome:?}"),
            None => println!("Nothing to process."),
        }
        return Ok(());
    }

    println!("Watching spool: {}", spool_dir.display());
    println!("Backups in:     {}", backup_dir.display());
    println!("Press Ctrl+C to stop.");

    let handle = StopHandle::new();
    let signal_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_handle.stop();
        }
    });

    pipeline.run(&handle).await;
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let archive = Archive::open(config.database_path()).context("opening archive")?;
    let archive_stats = archive.stats()?;
    let tracker = ProcessingStateTracker::with_persistence(
        config.state_path(),
        config.processing.max_retry_attempts,
    );
    let processing = tracker.processing_stats();

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "state_path": config.state_path(),
            "archive": archive_stats,
            "processing": processing,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("clipsift status");
        println!("---------------");
        println!("Database:       {}", config.database_path().display());
        println!("State file:     {}", config.state_path().display());
        println!();
        println!("[Archive]");
        println!("  Items:          {}", archive_stats.total_items);
        println!("  Uploaded:       {}", archive_stats.uploaded_items);
        if let Some(newest) = archive_stats.newest_item {
            println!("  Newest:         {newest}");
        }
        println!("  Size (bytes):   {}", archive_stats.db_size_bytes);
        println!();
        println!("[Processing]");
        println!("  Records:        {}", processing.total);
        println!("  Completed:      {}", processing.completed);
        println!("  Failed:         {}", processing.failed);
        println!("  Success rate:   {:.1}%", processing.success_rate);
        for (strategy, perf) in &processing.strategy_performance {
            println!(
                "  {:<14}  {}/{} succeeded",
                strategy.to_string(),
                perf.successes,
                perf.total
            );
        }
    }
    Ok(())
}

fn handle_search(config: &Config, cmd: &SearchCommand) -> anyhow::Result<()> {
    let archive = Archive::open(config.database_path()).context("opening archive")?;

    let items = match cmd.category {
        Some(category) => {
            let all = archive.get_by_category(category.into(), cmd.limit * 10)?;
            all.into_iter()
                .filter(|i| i.content.contains(&cmd.query))
                .take(cmd.limit)
                .collect()
        }
        None => archive.search(&cmd.query, cmd.limit)?,
    };

    print_items(&items, cmd.format)
}

fn handle_recent(config: &Config, cmd: &RecentCommand) -> anyhow::Result<()> {
    let archive = Archive::open(config.database_path()).context("opening archive")?;
    let items = archive.get_recent(cmd.last)?;
    print_items(&items, cmd.format)
}

fn print_items(items: &[ArchivedItem], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = items
                .iter()
                .map(|i| {
                    serde_json::json!({
                        "id": i.id,
                        "captured_at": i.captured_at.to_rfc3339(),
                        "category": i.category.to_string(),
                        "kind": i.kind.to_string(),
                        "content": i.content,
                        "asset_id": i.asset_id,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Plain => {
            for item in items {
                println!("{}", item.content);
                println!();
            }
        }
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No items.");
                return Ok(());
            }
            println!("{:<6} {:<22} {:<8} {}", "ID", "CAPTURED", "CATEGORY", "CONTENT");
            for item in items {
                let preview: String = item.content.chars().take(48).collect();
                let preview = preview.replace('\n', " ");
                println!(
                    "{:<6} {:<22} {:<8} {}",
                    item.id.unwrap_or(0),
                    item.captured_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    item.category.to_string(),
                    preview
                );
            }
        }
    }
    Ok(())
}

fn handle_clean(config: &Config, cmd: &CleanCommand) -> anyhow::Result<()> {
    if !cmd.yes {
        println!("This will sweep old processing records and prune the archive.");
        println!("Use --yes to confirm.");
        return Ok(());
    }

    let mut tracker = ProcessingStateTracker::with_persistence(
        config.state_path(),
        config.processing.max_retry_attempts,
    );
    let swept = tracker.cleanup_old_records(config.processing.record_max_age_hours);
    println!("Swept {swept} processing records.");

    let archive = Archive::open(config.database_path()).context("opening archive")?;
    let mut pruned = 0;
    if let Some(max_age) = config.archive_max_age() {
        if let Ok(age) = chrono::Duration::from_std(max_age) {
            pruned += archive.prune_older_than(age)?;
        }
    }
    if config.storage.max_items > 0 {
        pruned += archive.prune_keep_recent(config.storage.max_items)?;
    }
    println!("Pruned {pruned} archived items.");
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Security]");
                println!("  Redaction:          {}", config.security.enable_redaction);
                println!("  Skip sensitive:     {}", config.security.skip_sensitive);
                println!(
                    "  Custom patterns:    {}",
                    config.security.custom_patterns.len()
                );
                println!();
                println!("[Dedup]");
                println!("  Window (seconds):   {}", config.dedup.window_seconds);
                println!("  Max cache size:     {}", config.dedup.max_cache_size);
                println!();
                println!("[Processing]");
                println!(
                    "  Max attempts:       {}",
                    config.processing.max_retry_attempts
                );
                println!(
                    "  Record max age (h): {}",
                    config.processing.record_max_age_hours
                );
                println!("  State file:         {}", config.state_path().display());
                println!();
                println!("[Storage]");
                println!("  Database:           {}", config.database_path().display());
                println!("  Max items:          {}", config.storage.max_items);
                println!("  Max age (days):     {}", config.storage.max_age_days);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
