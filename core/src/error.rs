//! Error types for board operations.

use thiserror::Error;

use crate::model::task::TaskId;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Please enter a task title")]
    EmptyTitle,

    #[error("Task #{0} not found")]
    TaskNotFound(TaskId),

    #[error("No task ids left")]
    IdsExhausted,

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl BoardError {
    /// Validation failures leave the store untouched and are meant to be shown
    /// to the user; everything else is an environment problem.
    pub fn is_validation(&self) -> bool {
        matches!(self, BoardError::EmptyTitle | BoardError::TaskNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
