//! Error types for the task tracker.

use thiserror::Error;

use crate::fields::DraftField;

/// Errors raised while reading or writing a store snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access task snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed task snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("task snapshot lists id {0} more than once")]
    DuplicateId(u64),

    #[error("task snapshot id {0} is out of range")]
    IdOutOfRange(u64),
}

/// Errors returned when an editing session cannot commit its draft.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommitError {
    /// Required fields are unset; the store is untouched.
    #[error("draft is incomplete: missing {}", join_fields(.0))]
    Invalid(Vec<DraftField>),

    #[error("no editing session is open")]
    NoSession,

    /// The task being edited was deleted while the session was open.
    #[error("task {0} no longer exists")]
    TaskGone(u64),
}

fn join_fields(fields: &[DraftField]) -> String {
    fields.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Figment(Box::new(e))
    }
}

/// Due-date input that could not be understood.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unrecognised due date '{0}': use YYYY-MM-DD, today, tomorrow, a weekday or 'in 3d'")]
pub struct DueParseError(pub String);
