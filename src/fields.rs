//! Enumerations and field types for task tracking.
//!
//! This module defines the closed value sets a task is classified by
//! (category and status) together with the view-side enumerations used to
//! filter, sort and present tasks.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    #[serde(alias = "work")]
    Work,
    #[serde(alias = "personal")]
    Personal,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Work, Category::Personal];

    pub fn label(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Task status, the partition key of the board.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    #[serde(rename = "TO-DO", alias = "to-do")]
    ToDo,
    #[serde(rename = "IN-PROGRESS", alias = "in-progress")]
    InProgress,
    #[serde(rename = "COMPLETED", alias = "completed")]
    Completed,
}

impl Status {
    /// Board order: left to right.
    pub const ALL: [Status; 3] = [Status::ToDo, Status::InProgress, Status::Completed];

    /// Position of this status in [`Status::ALL`].
    pub fn index(self) -> usize {
        match self {
            Status::ToDo => 0,
            Status::InProgress => 1,
            Status::Completed => 2,
        }
    }

    /// Bucket key as shown on the board.
    pub fn key(self) -> &'static str {
        match self {
            Status::ToDo => "TO-DO",
            Status::InProgress => "IN-PROGRESS",
            Status::Completed => "COMPLETED",
        }
    }

    /// Section heading as shown in the list view.
    pub fn section_title(self) -> &'static str {
        match self {
            Status::ToDo => "To-Do",
            Status::InProgress => "In-Progress",
            Status::Completed => "Completed",
        }
    }

    /// Neighbouring status to the left or right, if any.
    pub fn neighbour(self, right: bool) -> Option<Status> {
        let idx = self.index();
        if right {
            Status::ALL.get(idx + 1).copied()
        } else {
            idx.checked_sub(1).map(|i| Status::ALL[i])
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Filtering options for tasks based on due dates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DueFilter {
    Today,
    ThisWeek,
}

impl DueFilter {
    pub fn label(self) -> &'static str {
        match self {
            DueFilter::Today => "Today",
            DueFilter::ThisWeek => "This Week",
        }
    }
}

/// Sort direction for the due-date ordering of the list view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Which presentation of the task collection is on screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    List,
    Board,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::List => ViewMode::Board,
            ViewMode::Board => ViewMode::List,
        }
    }
}

/// Draft fields that must be resolved before a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Title,
    Category,
    DueDate,
    Status,
}

impl DraftField {
    /// Inline error text shown next to the field after a failed submit.
    pub fn error_text(self) -> &'static str {
        match self {
            DraftField::Title => "Title is required",
            DraftField::Category => "Category is required",
            DraftField::DueDate => "Due date is required",
            DraftField::Status => "Status is required",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DraftField::Title => "title",
            DraftField::Category => "category",
            DraftField::DueDate => "due date",
            DraftField::Status => "status",
        };
        f.write_str(name)
    }
}
