//! # tb - personal task tracker
//!
//! ```bash
//! # Open the terminal UI (the default when no command is given)
//! tb
//!
//! # Add a task
//! tb add "Write report" --due friday --category work
//!
//! # List this week's work tasks, latest first
//! tb list --category work --due this-week --sort desc
//!
//! # Move a card on the board
//! tb move 3 in-progress
//! ```
//!
//! Configuration is read from `<config dir>/taskboard/config.toml`,
//! `./.taskboard.toml` and `TASKBOARD_*` variables. Tasks are stored in a JSON
//! snapshot under the user data directory unless `--db` points elsewhere.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskboard::cli::Cli;
use taskboard::cmd::*;
use taskboard::config::TrackerConfig;
use taskboard::filter::FilterCriteria;
use taskboard::store::TaskStore;
use taskboard::tui;

fn main() {
    if let Err(error) = run() {
        eprintln!("tb error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = TrackerConfig::load().context("failed to load configuration")?;
    let db_path = cli.db.clone().unwrap_or_else(|| config.data_path());

    let interactive = matches!(cli.command, None | Some(Commands::Ui { .. }));
    init_tracing(&config.log_level, cli.verbose, interactive.then_some(db_path.as_path()))?;

    dispatch(cli.command, &db_path, &config)
}

/// Run one command. Only commands that touch tasks read the snapshot.
fn dispatch(command: Option<Commands>, db_path: &Path, config: &TrackerConfig) -> anyhow::Result<()> {
    match command {
        Some(Commands::Completions { shell }) => {
            cmd_completions(shell);
            Ok(())
        }

        None => tui::run::run(load_store(db_path)?, db_path, config, None),
        Some(Commands::Ui { view }) => tui::run::run(load_store(db_path)?, db_path, config, view),

        Some(Commands::Add { title, due, category, status, desc, attachment }) => {
            let mut store = load_store(db_path)?;
            cmd_add(&mut store, db_path, title, due, category, status, desc, attachment)
        }

        Some(Commands::List { category, due, search, sort, status }) => {
            let criteria = FilterCriteria {
                category,
                due,
                search: search.unwrap_or_default(),
                sort: sort.unwrap_or(config.sort),
            };
            cmd_list(&load_store(db_path)?, criteria, status)
        }

        Some(Commands::Board { category, due, search }) => {
            let criteria = FilterCriteria {
                category,
                due,
                search: search.unwrap_or_default(),
                sort: config.sort,
            };
            cmd_board(&load_store(db_path)?, criteria)
        }

        Some(Commands::Edit {
            id, title, desc, category, due, status, attachment, clear_attachment,
        }) => {
            let mut store = load_store(db_path)?;
            cmd_edit(&mut store, db_path, id, title, desc, category, due, status,
                     attachment, clear_attachment)
        }

        Some(Commands::Move { id, status }) => cmd_move(&mut load_store(db_path)?, db_path, id, status),

        Some(Commands::Delete { ids }) => cmd_delete(&mut load_store(db_path)?, db_path, ids),
    }
}

fn load_store(db_path: &Path) -> anyhow::Result<TaskStore> {
    TaskStore::load(db_path)
        .with_context(|| format!("failed to load tasks from {}", db_path.display()))
}

/// `TASKBOARD_LOG` wins over the configured level; `-v` raises the default.
/// The terminal UI owns stdout, so its logs go to a file next to the snapshot.
fn init_tracing(configured: &str, verbose: u8, log_beside: Option<&Path>) -> anyhow::Result<()> {
    let level = match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("TASKBOARD_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match log_beside {
        Some(db_path) => {
            let dir = db_path.parent().unwrap_or_else(|| Path::new("."));
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            let log_path = dir.join("taskboard.log");
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .with_context(|| format!("failed to open {}", log_path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}
