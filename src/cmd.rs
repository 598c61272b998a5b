//! Command implementations for the CLI interface.
//!
//! Each handler works on the loaded store, routes mutations through the same
//! core operations the terminal UI uses, and saves the snapshot afterwards.

use std::path::Path;

use anyhow::{bail, Context};
use chrono::Local;
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::board::{Board, DropTarget, DragOutcome};
use crate::cli::Cli;
use crate::dates::{format_due_relative, local_date, parse_due_input};
use crate::fields::*;
use crate::filter::{partition_by_status, FilterCriteria};
use crate::session::Editor;
use crate::store::TaskStore;
use crate::task::{Attachment, Task};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive terminal interface.
    Ui {
        /// Start in this view instead of the configured default.
        #[arg(long, value_enum)]
        view: Option<ViewMode>,
    },

    /// Add a task. Re-adding the same title and due date updates it instead.
    Add {
        /// Task title.
        title: String,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", a weekday, or "in Nd".
        #[arg(long)]
        due: String,
        /// Category: work | personal.
        #[arg(long, value_enum, default_value_t = Category::Work)]
        category: Category,
        /// Status: to-do | in-progress | completed.
        #[arg(long, value_enum, default_value_t = Status::ToDo)]
        status: Status,
        /// Longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Attachment reference (URL or upload handle).
        #[arg(long)]
        attachment: Option<String>,
    },

    /// List tasks grouped by status.
    List {
        /// Filter by category.
        #[arg(long, value_enum)]
        category: Option<Category>,
        /// Due filter: today | this-week.
        #[arg(long, value_enum)]
        due: Option<DueFilter>,
        /// Case-insensitive title search.
        #[arg(long)]
        search: Option<String>,
        /// Due-date sort direction.
        #[arg(long, value_enum)]
        sort: Option<SortOrder>,
        /// Only show one status section.
        #[arg(long, value_enum)]
        status: Option<Status>,
    },

    /// Print the board columns.
    Board {
        #[arg(long, value_enum)]
        category: Option<Category>,
        #[arg(long, value_enum)]
        due: Option<DueFilter>,
        #[arg(long)]
        search: Option<String>,
    },

    /// Edit fields on a task.
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        category: Option<Category>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long)]
        attachment: Option<String>,
        /// Remove the attachment.
        #[arg(long, conflicts_with = "attachment")]
        clear_attachment: bool,
    },

    /// Move a task to another status column.
    Move {
        id: u64,
        #[arg(value_enum)]
        status: Status,
    },

    /// Delete one or more tasks by id.
    Delete {
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Add a task through a create session.
pub fn cmd_add(
    store: &mut TaskStore,
    db_path: &Path,
    title: String,
    due: String,
    category: Category,
    status: Status,
    desc: Option<String>,
    attachment: Option<String>,
) -> anyhow::Result<()> {
    let due_date = parse_due_input(&due)?;
    let before = store.len();

    let mut editor = Editor::new();
    let session = editor.open_create();
    session.draft.title = title;
    session.draft.description = desc.unwrap_or_default();
    session.draft.category = Some(category);
    session.draft.due_date = Some(due_date);
    session.draft.status = Some(status);
    session.draft.attachment = attachment.as_deref().and_then(Attachment::from_input);

    let id = editor.commit(store)?;
    save(store, db_path)?;
    if store.len() == before {
        println!("Updated existing task {id}");
    } else {
        println!("Added task {id}");
    }
    Ok(())
}

/// Print the filtered, sorted list grouped into status sections.
pub fn cmd_list(
    store: &TaskStore,
    criteria: FilterCriteria,
    only: Option<Status>,
) -> anyhow::Result<()> {
    let groups = partition_by_status(store.list(), &criteria);
    for status in Status::ALL {
        if only.is_some_and(|s| s != status) {
            continue;
        }
        let tasks = &groups[status.index()];
        println!("{} ({})", status.section_title(), tasks.len());
        if tasks.is_empty() {
            println!("  No Tasks in {}", status.section_title());
        } else {
            print_table(tasks.iter());
        }
        println!();
    }
    Ok(())
}

/// Print the three board columns.
pub fn cmd_board(store: &TaskStore, criteria: FilterCriteria) -> anyhow::Result<()> {
    let mut board = Board::default();
    board.set_criteria(criteria, store);
    for status in Status::ALL {
        let cards = board.bucket_tasks(status, store);
        println!("{} ({})", status.key(), cards.len());
        for task in cards {
            println!("  [{}] {} - {} - {}", task.id, task.title, task.category, due_label(task));
        }
        println!();
    }
    Ok(())
}

/// Edit a task through an edit session.
pub fn cmd_edit(
    store: &mut TaskStore,
    db_path: &Path,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    category: Option<Category>,
    due: Option<String>,
    status: Option<Status>,
    attachment: Option<String>,
    clear_attachment: bool,
) -> anyhow::Result<()> {
    let due_date = due.as_deref().map(parse_due_input).transpose()?;

    let mut editor = Editor::new();
    if !editor.open_edit(id, store) {
        bail!("Task {id} not found");
    }
    let Some(session) = editor.current_mut() else {
        bail!("Task {id} not found");
    };
    let draft = &mut session.draft;
    if let Some(title) = title {
        draft.title = title;
    }
    if let Some(desc) = desc {
        draft.description = desc;
    }
    if category.is_some() {
        draft.category = category;
    }
    if due_date.is_some() {
        draft.due_date = due_date;
    }
    if status.is_some() {
        draft.status = status;
    }
    if clear_attachment {
        draft.attachment = None;
    } else if let Some(a) = attachment {
        draft.attachment = Attachment::from_input(&a);
    }

    editor.commit(store)?;
    save(store, db_path)?;
    println!("Updated task {id}");
    Ok(())
}

/// Move a task between board columns.
pub fn cmd_move(store: &mut TaskStore, db_path: &Path, id: u64, status: Status) -> anyhow::Result<()> {
    let mut board = Board::from_store(store);
    match board.handle_drag_end(id, Some(DropTarget::Bucket(status)), store) {
        DragOutcome::Moved { from, to, .. } => {
            save(store, db_path)?;
            println!("Moved task {id} from {from} to {to}");
        }
        DragOutcome::Unchanged => println!("Task {id} is already {status}"),
        DragOutcome::Aborted => bail!("Task {id} not found"),
    }
    Ok(())
}

/// Delete tasks by id.
pub fn cmd_delete(store: &mut TaskStore, db_path: &Path, ids: Vec<u64>) -> anyhow::Result<()> {
    let removed = store.delete_many(&ids);
    if removed == 0 {
        println!("No matching tasks.");
        return Ok(());
    }
    save(store, db_path)?;
    println!("Deleted {removed} task(s).");
    Ok(())
}

/// Write completion scripts for `shell` to stdout.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "tb", &mut std::io::stdout());
}

fn save(store: &TaskStore, db_path: &Path) -> anyhow::Result<()> {
    store
        .save(db_path)
        .with_context(|| format!("failed to save tasks to {}", db_path.display()))
}

fn due_label(task: &Task) -> String {
    let today = Local::now().date_naive();
    format_due_relative(local_date(&task.due_date, &Local), today)
}

/// Print tasks in a formatted table.
pub fn print_table<'a>(tasks: impl Iterator<Item = &'a Task>) {
    println!("  {:<6} {:<12} {:<10} {:<12} {}", "ID", "Status", "Category", "Due", "Title");
    for t in tasks {
        let attachment = if t.attachment.is_some() { " [+]" } else { "" };
        println!(
            "  {:<6} {:<12} {:<10} {:<12} {}{}",
            t.id,
            t.status.key(),
            t.category.label(),
            due_label(t),
            truncate(&t.title, 48),
            attachment
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
