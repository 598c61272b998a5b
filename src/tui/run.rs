//! Terminal UI entry point and setup.

use std::{io, path::Path};

use anyhow::Context;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tracing::info;

use crate::config::TrackerConfig;
use crate::fields::ViewMode;
use crate::store::TaskStore;
use crate::tui::app::App;

/// Run the terminal interface until the user quits.
/// The terminal is restored even when the event loop fails.
pub fn run(
    store: TaskStore,
    db_path: &Path,
    config: &TrackerConfig,
    view: Option<ViewMode>,
) -> anyhow::Result<()> {
    info!(path = %db_path.display(), tasks = store.len(), "starting terminal ui");
    let mut app = App::new(store, db_path, config, view);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.context("terminal ui failed")
}
