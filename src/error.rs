//! Error types for the workout log core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Name must not be empty")]
    EmptyName,

    #[error("An option named '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid weight: {0}")]
    InvalidWeight(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

impl TrackerError {
    pub(crate) fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    /// True for refusals raised before anything was written
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyName
                | Self::DuplicateName(_)
                | Self::InvalidWeight(_)
                | Self::InvalidInput(_)
                | Self::IndexOutOfRange { .. }
        )
    }
}
