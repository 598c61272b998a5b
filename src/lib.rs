//! # taskboard
//!
//! A personal task tracker that shows one task collection two ways: a flat
//! list grouped into To-Do / In-Progress / Completed sections, and a board
//! whose cards can be dragged between status columns.
//!
//! ## Core
//!
//! - [`store::TaskStore`] is the single system of record. Every view reads
//!   from it and every create, edit, delete or status change goes through it.
//! - [`filter`] derives the list view: category, due-date ("Today",
//!   "This Week") and title search predicates, sorted by due date.
//! - [`board::Board`] caches the store partitioned by status and reconciles
//!   drag-and-drop moves into the store.
//! - [`session::Editor`] stages create/edit drafts and gates commits on
//!   validation.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use taskboard::board::{Board, DropTarget};
//! use taskboard::fields::{Category, Status};
//! use taskboard::store::TaskStore;
//! use taskboard::task::TaskFields;
//!
//! let mut store = TaskStore::new();
//! let due = Utc.with_ymd_and_hms(2024, 12, 20, 9, 0, 0).unwrap();
//! let id = store.add(TaskFields::new("Write report", Category::Work, due, Status::ToDo));
//!
//! let mut board = Board::from_store(&store);
//! board.handle_drag_end(id, Some(DropTarget::Bucket(Status::InProgress)), &mut store);
//! assert_eq!(store.get(id).unwrap().status, Status::InProgress);
//! assert_eq!(board.bucket(Status::InProgress), &[id]);
//! ```
//!
//! The `tb` binary wraps the core in a CLI and a terminal UI. Tasks are kept
//! in a JSON snapshot under the user data directory between runs.

pub mod board;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod dates;
pub mod error;
pub mod fields;
pub mod filter;
pub mod identity;
pub mod session;
pub mod store;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod board_view;
    pub mod colors;
    pub mod input;
    pub mod list_view;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}
