//! Storyline CLI viewer.
//!
//! # Responsibility
//! - Wire configuration, logging, and the timeline service together.
//! - Render one chapter as Graphviz DOT (or a plain list) on stdout.
//!
//! # Invariants
//! - A missing database id is fatal for the invocation; an unknown
//!   chapter is not.

use clap::Parser;
use log::warn;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use storyline_core::{
    chapter_flowchart, init_logging, plain_list, Entry, SnapshotCache, StaticRecordStore,
    TimelineConfig, TimelineService,
};

/// Story timeline flowchart viewer.
#[derive(Debug, Parser)]
#[command(name = "storyline", version, about)]
struct Cli {
    /// Chapter to render; defaults to the first main chapter.
    #[arg(long)]
    chapter: Option<String>,

    /// Poll the external source now and update the local snapshot
    /// (otherwise the local cache is preferred).
    #[arg(long)]
    refresh: bool,

    /// Render a plain event list instead of Graphviz DOT.
    #[arg(long)]
    list: bool,

    /// Print the chapter selector (asides indented under their main
    /// chapters) and exit.
    #[arg(long)]
    chapters: bool,

    /// JSON file of raw entries served through the in-memory record
    /// store; without it, a refresh fetches from an empty store.
    #[arg(long, value_name = "FILE")]
    source: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Pick up a local .env before reading configuration.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match TimelineConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, &log_dir.to_string_lossy()) {
            // Logging is optional for the CLI; keep rendering.
            eprintln!("logging disabled: {err}");
        }
    }

    let store = match &cli.source {
        Some(path) => match load_source_entries(path) {
            Ok(entries) => StaticRecordStore::new(entries),
            Err(err) => {
                eprintln!("cannot read --source {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => StaticRecordStore::new(Vec::new()),
    };

    let cache = SnapshotCache::new(&config.cache_path);
    let mut service = TimelineService::new(store, cache);
    let model = service.build_timeline_model(&config.database_id, cli.refresh);

    if model.dropped_entry_count > 0 {
        warn!(
            "event=entries_skipped module=cli status=ok count={}",
            model.dropped_entry_count
        );
    }

    if model.chapters.is_empty() {
        eprintln!("no chapters found in database {}", config.database_id);
        return ExitCode::FAILURE;
    }

    if cli.chapters {
        print_chapter_selector(&model);
        return ExitCode::SUCCESS;
    }

    let selected = cli
        .chapter
        .clone()
        .unwrap_or_else(|| model.chapters[0].clone());
    let nodes = model.nodes_for_chapter(&selected);

    if nodes.is_empty() {
        println!("No events found for {selected}");
        return ExitCode::SUCCESS;
    }

    if cli.list {
        println!("{}", plain_list(nodes));
    } else {
        println!("{}", chapter_flowchart(&model, &selected));
    }
    ExitCode::SUCCESS
}

fn load_source_entries(path: &PathBuf) -> Result<Vec<Entry>, String> {
    let raw = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&raw).map_err(|err| err.to_string())
}

fn print_chapter_selector(model: &storyline_core::TimelineModel) {
    for main_chapter in &model.chapters {
        println!("{main_chapter}");
        for aside in model.asides_for_chapter(main_chapter) {
            println!("    \u{21B3} {aside}");
        }
    }
}
