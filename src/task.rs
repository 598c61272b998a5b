//! Task data structure and related functionality.
//!
//! This module defines the committed `Task` record held by the store, the
//! `TaskFields` payload written through the store's mutation operations, and
//! the `TaskDraft` staged by an editing session before it is validated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::{Category, DraftField, Status};

/// Opaque reference to a binary blob carried alongside a task.
///
/// The core never interprets the handle beyond presence or absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reference", rename_all = "kebab-case")]
pub enum Attachment {
    /// Handle returned by an upload collaborator.
    Upload(String),
    /// A stored URL.
    Url(String),
}

impl Attachment {
    /// Build an attachment from free-form input: anything with a URL scheme is
    /// kept as a URL, everything else as an upload handle.
    pub fn from_input(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            None
        } else if s.contains("://") {
            Some(Attachment::Url(s.to_string()))
        } else {
            Some(Attachment::Upload(s.to_string()))
        }
    }

    pub fn reference(&self) -> &str {
        match self {
            Attachment::Upload(r) | Attachment::Url(r) => r,
        }
    }
}

/// A committed unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub due_date: DateTime<Utc>,
    pub status: Status,
    #[serde(default)]
    pub attachment: Option<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// The user-editable fields of this task.
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            due_date: self.due_date,
            status: self.status,
            attachment: self.attachment.clone(),
        }
    }

    /// Overwrite every user-editable field, keeping id and creation time.
    pub(crate) fn apply(&mut self, fields: TaskFields, now: DateTime<Utc>) {
        self.title = fields.title;
        self.description = fields.description;
        self.category = fields.category;
        self.due_date = fields.due_date;
        self.status = fields.status;
        self.attachment = fields.attachment;
        self.updated_at = now;
    }
}

/// Fully resolved field set written through the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub due_date: DateTime<Utc>,
    pub status: Status,
    pub attachment: Option<Attachment>,
}

impl TaskFields {
    pub fn new(title: &str, category: Category, due_date: DateTime<Utc>, status: Status) -> Self {
        Self {
            title: title.to_string(),
            description: String::new(),
            category,
            due_date,
            status,
            attachment: None,
        }
    }
}

/// An uncommitted, possibly incomplete copy of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub id: Option<u64>,
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<Status>,
    pub attachment: Option<Attachment>,
}

impl TaskDraft {
    /// Snapshot an existing task into a draft.
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: Some(task.id),
            title: task.title.clone(),
            description: task.description.clone(),
            category: Some(task.category),
            due_date: Some(task.due_date),
            status: Some(task.status),
            attachment: task.attachment.clone(),
        }
    }

    /// Resolve the draft into a committable field set.
    pub fn to_fields(&self) -> Result<TaskFields, Validation> {
        let validation = validate_for_commit(self);
        match (self.category, self.due_date, self.status) {
            (Some(category), Some(due_date), Some(status)) if validation.is_valid() => {
                Ok(TaskFields {
                    title: self.title.trim().to_string(),
                    description: self.description.clone(),
                    category,
                    due_date,
                    status,
                    attachment: self.attachment.clone(),
                })
            }
            _ => Err(validation),
        }
    }
}

/// Result of checking a draft against the committed-task invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub missing: Vec<DraftField>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn is_missing(&self, field: DraftField) -> bool {
        self.missing.contains(&field)
    }
}

/// Check a draft for the fields every committed task must carry.
///
/// Shared by the create and edit flows. A title made only of whitespace
/// counts as empty.
pub fn validate_for_commit(draft: &TaskDraft) -> Validation {
    let mut missing = Vec::new();
    if draft.title.trim().is_empty() {
        missing.push(DraftField::Title);
    }
    if draft.category.is_none() {
        missing.push(DraftField::Category);
    }
    if draft.due_date.is_none() {
        missing.push(DraftField::DueDate);
    }
    if draft.status.is_none() {
        missing.push(DraftField::Status);
    }
    Validation { missing }
}
