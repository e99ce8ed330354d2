//! Error types shared across the deal store, cell editing and preference storage.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DealError {
    #[error("deal '{0}' not found")]
    NotFound(String),
    #[error("deal '{0}' already exists")]
    DuplicateId(String),
    #[error("invalid field: {0}")]
    InvalidField(String),
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("serialization failure: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for DealError {
    fn from(value: std::io::Error) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<serde_json::Error> for DealError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DealError>;
