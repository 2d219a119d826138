//! Failure kinds callers need to tell apart.

use thiserror::Error;

pub use crate::gateway::GatewayError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LibraryError {
    #[error("Failed to load swings: {0}")]
    Load(#[source] GatewayError),

    #[error("Nothing to update for swing {0}")]
    EmptyPatch(String),

    #[error("A comparison needs at least {min} swings")]
    TooFewSwings { min: usize },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UploadError {
    #[error("File size must be less than {}MB", .max / (1024 * 1024))]
    FileTooLarge { size: u64, max: u64 },

    #[error("Unsupported file type '{content_type}'. Please choose a video file.")]
    UnsupportedType { content_type: String },

    #[error("Could not read {path}: {detail}")]
    Unreadable { path: String, detail: String },

    #[error("Invalid response from presigned URL endpoint: {0}")]
    InvalidPresignedResponse(String),

    #[error("Missing required upload fields: {}", .missing.join(", "))]
    MissingUploadFields { missing: Vec<String> },

    #[error("Failed to get upload URL: {0}")]
    Gateway(#[source] GatewayError),

    #[error("Upload failed: {status} {body}")]
    StorageRejected { status: u16, body: String },

    #[error("Upload failed: storage unreachable ({0})")]
    StorageUnreachable(String),

    /// The file is stored at `file_url` but no swing record points at it yet.
    #[error("Video uploaded to {file_url} but the swing could not be created: {source}")]
    SwingCreationFailed {
        file_url: String,
        #[source]
        source: GatewayError,
    },
}

impl UploadError {
    /// The stored location when phase two can be retried without re-uploading.
    pub fn stored_file_url(&self) -> Option<&str> {
        match self {
            UploadError::SwingCreationFailed { file_url, .. } => Some(file_url),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            UploadError::FileTooLarge { .. }
                | UploadError::UnsupportedType { .. }
                | UploadError::Unreadable { .. }
                | UploadError::InvalidPresignedResponse(_)
                | UploadError::MissingUploadFields { .. }
        )
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    #[error("Failed to fetch analysis for swing {swing_id}: {source}")]
    Fetch {
        swing_id: String,
        #[source]
        source: GatewayError,
    },

    /// The generate request itself failed. A backend `failed` status is a
    /// value, not this error.
    #[error("Failed to start analysis for swing {swing_id}: {source}")]
    GenerateFailed {
        swing_id: String,
        #[source]
        source: GatewayError,
    },
}

impl AnalysisError {
    pub fn swing_id(&self) -> &str {
        match self {
            AnalysisError::Fetch { swing_id, .. } | AnalysisError::GenerateFailed { swing_id, .. } => {
                swing_id
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PlayerError {
    #[error("No video slot {0}; the player has two")]
    InvalidSlot(usize),
}
