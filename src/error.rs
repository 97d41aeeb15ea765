//! Error types for flux

use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum FluxError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("Repository not open")]
    RepositoryNotOpen,

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Dialog error: {0}")]
    Dialog(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("{0}")]
    Custom(String),
}

impl FluxError {
    /// Stable machine-readable code sent alongside the message over IPC
    pub fn code(&self) -> &'static str {
        match self {
            FluxError::Git(_) => "GIT_ERROR",
            FluxError::Io(_) => "IO_ERROR",
            FluxError::Serialization(_) => "SERIALIZATION_ERROR",
            FluxError::RepositoryNotFound(_) => "REPO_NOT_FOUND",
            FluxError::RepositoryNotOpen => "REPO_NOT_OPEN",
            FluxError::InvalidPath(_) => "INVALID_PATH",
            FluxError::Storage(_) => "STORAGE_ERROR",
            FluxError::Dialog(_) => "DIALOG_ERROR",
            FluxError::OperationFailed(_) => "OPERATION_FAILED",
            FluxError::Custom(_) => "CUSTOM_ERROR",
        }
    }
}

/// Serializable error response for IPC
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl From<&FluxError> for ErrorResponse {
    fn from(error: &FluxError) -> Self {
        ErrorResponse {
            code: error.code().to_string(),
            message: error.to_string(),
            details: None,
        }
    }
}

// Lets command handlers return `Result<T>` directly
impl serde::Serialize for FluxError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        ErrorResponse::from(self).serialize(serializer)
    }
}

/// Result type alias for flux operations
pub type Result<T> = std::result::Result<T, FluxError>;
