//! Error types for Centavo

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed input to a create/update operation. Rejected before any
    /// normalization or model call; names the offending field.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Persisted data violates the canonical record invariants. Indicates a
    /// storage-layer inconsistency; names the offending field.
    #[error("Cannot normalize {field}: {message}")]
    Normalization { field: String, message: String },

    /// The model collaborator is unreachable or returned unusable content.
    #[error("Model error: {0}")]
    ExternalModel(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn normalization(field: &str, message: impl Into<String>) -> Self {
        Self::Normalization {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
