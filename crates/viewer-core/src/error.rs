//! Errors from the repository API.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepoError {
    /// The path does not exist. Expected during existence probes.
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// The API answered with an unexpected HTTP status.
    #[error("HTTP {status} for {path}")]
    Status { path: String, status: u16 },

    /// The listing body carried an `errors` array.
    #[error("Upstream error for {path}: {message}")]
    Upstream { path: String, message: String },

    /// The request never produced a response.
    #[error("Request failed for {path}: {message}")]
    Transport { path: String, message: String },

    /// The response body could not be decoded.
    #[error("Invalid response for {path}: {message}")]
    Decode { path: String, message: String },
}

impl RepoError {
    /// Absence, as opposed to "could not determine".
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound { .. })
    }

    pub fn path(&self) -> &str {
        match self {
            RepoError::NotFound { path }
            | RepoError::Status { path, .. }
            | RepoError::Upstream { path, .. }
            | RepoError::Transport { path, .. }
            | RepoError::Decode { path, .. } => path,
        }
    }

    /// HTTP status, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            RepoError::NotFound { .. } => Some(404),
            RepoError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RepoError>;
