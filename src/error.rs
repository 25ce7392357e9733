//! Crate-wide error type.
//!
//! Only invalid call sequences and unusable configuration are errors.
//! Conditions the engine can correct or tolerate (unknown dependency targets,
//! inverted intervals, non-convergence) are handled locally and reported
//! through [`EditReport`](crate::session::EditReport) instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Edit session {0} is still open")]
    SessionInProgress(u64),

    #[error("Edit session {0} is not open")]
    SessionClosed(u64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EditError>;
