//! Task editing sessions.
//!
//! A session stages edits to a [`TaskDraft`] and commits them to the store
//! through one validation gate shared by the create and edit flows. At most
//! one session is open at a time; opening another discards the first.

use tracing::{debug, info};

use crate::error::CommitError;
use crate::fields::DraftField;
use crate::store::TaskStore;
use crate::task::{validate_for_commit, TaskDraft};

/// What a session will do on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Create,
    Edit(u64),
}

/// A draft plus the submit flag that gates error display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingSession {
    mode: SessionMode,
    pub draft: TaskDraft,
    is_submitted: bool,
}

impl EditingSession {
    fn new(mode: SessionMode, draft: TaskDraft) -> Self {
        Self { mode, draft, is_submitted: false }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// True once a commit has been attempted.
    pub fn is_submitted(&self) -> bool {
        self.is_submitted
    }

    /// Inline error text per missing field; empty until the first submit.
    pub fn field_errors(&self) -> Vec<(DraftField, &'static str)> {
        if !self.is_submitted {
            return Vec::new();
        }
        validate_for_commit(&self.draft)
            .missing
            .into_iter()
            .map(|f| (f, f.error_text()))
            .collect()
    }

    /// Error text for one field, if it should be shown.
    pub fn error_for(&self, field: DraftField) -> Option<&'static str> {
        self.field_errors().into_iter().find(|(f, _)| *f == field).map(|(_, msg)| msg)
    }
}

/// The single modal slot holding the open session, if any.
#[derive(Debug, Default)]
pub struct Editor {
    session: Option<EditingSession>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a create session on an empty draft.
    pub fn open_create(&mut self) -> &mut EditingSession {
        debug!("opened create session");
        self.session.insert(EditingSession::new(SessionMode::Create, TaskDraft::default()))
    }

    /// Open a create session pre-filled with `draft`, e.g. from a quick-add row.
    pub fn open_create_with(&mut self, draft: TaskDraft) -> &mut EditingSession {
        debug!("opened prefilled create session");
        self.session.insert(EditingSession::new(SessionMode::Create, draft))
    }

    /// Open an edit session on the store's current snapshot of `id`.
    ///
    /// Returns false, leaving any open session untouched, if `id` is unknown.
    pub fn open_edit(&mut self, id: u64, store: &TaskStore) -> bool {
        let Some(task) = store.get(id) else {
            return false;
        };
        self.session = Some(EditingSession::new(SessionMode::Edit(id), TaskDraft::from_task(task)));
        debug!(id, "opened edit session");
        true
    }

    /// Close without committing; the store is untouched.
    pub fn close(&mut self) {
        if self.session.take().is_some() {
            debug!("discarded editing session");
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn current(&self) -> Option<&EditingSession> {
        self.session.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut EditingSession> {
        self.session.as_mut()
    }

    /// Validate the open draft and write it to the store.
    ///
    /// On failure the session stays open with its submitted flag set so the
    /// renderer can show per-field errors. On success the session is closed
    /// and the resulting task id is returned.
    pub fn commit(&mut self, store: &mut TaskStore) -> Result<u64, CommitError> {
        let session = self.session.as_mut().ok_or(CommitError::NoSession)?;
        session.is_submitted = true;
        let fields = session
            .draft
            .to_fields()
            .map_err(|v| CommitError::Invalid(v.missing))?;

        let mode = session.mode;
        let id = match mode {
            SessionMode::Create => store.add(fields),
            SessionMode::Edit(id) => {
                if !store.update(id, fields) {
                    self.session = None;
                    return Err(CommitError::TaskGone(id));
                }
                id
            }
        };
        info!(id, "committed task");
        self.session = None;
        Ok(id)
    }
}
