//! Task form handling for the terminal user interface.
//!
//! The form holds the raw text the user is typing and pushes it into the open
//! session's draft after every keystroke, so validation always sees what is on
//! screen.

use chrono::{DateTime, Local, Utc};

use crate::dates::{local_date, parse_due_input};
use crate::fields::{Category, Status};
use crate::task::{Attachment, TaskDraft};
use crate::tui::input::InputField;

/// Field order for navigation and layout.
pub const TITLE_FIELD: usize = 0;
pub const DESCRIPTION_FIELD: usize = 1;
pub const DUE_FIELD: usize = 2;
pub const CATEGORY_FIELD: usize = 3;
pub const STATUS_FIELD: usize = 4;
pub const ATTACHMENT_FIELD: usize = 5;
const FIELD_COUNT: usize = 6;

/// Task form for the create and edit modals.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub due: InputField,
    pub attachment: InputField,
    pub category: Option<Category>,
    pub status: Option<Status>,
    pub current_field: usize,
    /// Parse error for the due text, shown regardless of submit state.
    pub due_error: Option<String>,
    /// Text and value the due field opened with, so an untouched field keeps
    /// the task's exact timestamp.
    initial_due: Option<(String, DateTime<Utc>)>,
    /// Attachment the form opened with; its kind survives untouched text.
    initial_attachment: Option<Attachment>,
}

impl TaskForm {
    /// Populate a form from a session draft.
    pub fn from_draft(draft: &TaskDraft) -> Self {
        let initial_due = draft
            .due_date
            .map(|d| (local_date(&d, &Local).format("%Y-%m-%d").to_string(), d));
        Self {
            title: InputField::with_value(&draft.title),
            description: InputField::with_value(&draft.description),
            due: InputField::with_value(initial_due.as_ref().map_or("", |(text, _)| text.as_str())),
            attachment: InputField::with_value(
                draft.attachment.as_ref().map_or("", Attachment::reference),
            ),
            category: draft.category,
            status: draft.status,
            current_field: TITLE_FIELD,
            due_error: None,
            initial_due,
            initial_attachment: draft.attachment.clone(),
        }
    }

    /// Write the form's current contents into `draft`.
    pub fn sync_into(&mut self, draft: &mut TaskDraft) {
        draft.title = self.title.value.clone();
        draft.description = self.description.value.clone();
        draft.category = self.category;
        draft.status = self.status;
        draft.attachment = match &self.initial_attachment {
            Some(initial) if initial.reference() == self.attachment.value.trim() => {
                Some(initial.clone())
            }
            _ => Attachment::from_input(&self.attachment.value),
        };

        let text = self.due.value.trim();
        self.due_error = None;
        draft.due_date = match &self.initial_due {
            Some((initial, value)) if initial == text => Some(*value),
            _ if text.is_empty() => None,
            _ => match parse_due_input(text) {
                Ok(due) => Some(due),
                Err(e) => {
                    self.due_error = Some(e.to_string());
                    None
                }
            },
        };
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    fn active_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_FIELD => Some(&mut self.title),
            DESCRIPTION_FIELD => Some(&mut self.description),
            DUE_FIELD => Some(&mut self.due),
            ATTACHMENT_FIELD => Some(&mut self.attachment),
            _ => None,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(input) = self.active_input() {
            input.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(input) = self.active_input() {
            input.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(input) = self.active_input() {
            input.handle_delete();
        }
    }

    /// Clear the active text field, or unset the active selector.
    pub fn clear_field(&mut self) {
        match self.current_field {
            CATEGORY_FIELD => self.category = None,
            STATUS_FIELD => self.status = None,
            _ => {
                if let Some(input) = self.active_input() {
                    input.clear();
                }
            }
        }
    }

    /// Left/right moves the cursor in text fields and cycles selectors.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            CATEGORY_FIELD => self.category = cycle(&Category::ALL, self.category, right),
            STATUS_FIELD => self.status = cycle(&Status::ALL, self.status, right),
            _ => {
                if let Some(input) = self.active_input() {
                    if right {
                        input.move_cursor_right();
                    } else {
                        input.move_cursor_left();
                    }
                }
            }
        }
    }
}

/// Step through `options`; an unset selector starts at either end.
fn cycle<T: Copy + PartialEq>(options: &[T], current: Option<T>, right: bool) -> Option<T> {
    let n = options.len();
    let next = match current.and_then(|c| options.iter().position(|o| *o == c)) {
        None if right => 0,
        None => n - 1,
        Some(i) if right => (i + 1) % n,
        Some(i) => (i + n - 1) % n,
    };
    options.get(next).copied()
}
