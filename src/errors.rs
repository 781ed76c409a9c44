// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the archiver

use std::fmt;
use std::path::PathBuf;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Archiving errors
    Archive(ArchiveError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Errors produced while archiving a single export item, or a whole batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    /// Image could not be encoded
    EncodingFailed(String),
    /// Encoded data could not be written
    SaveFailed(String),
    /// Metadata could not be embedded or read
    MetadataFailed(String),
    /// Edited and original assets are of different kinds
    KindMismatch {
        result: &'static str,
        original: &'static str,
    },
    /// A destination directory is missing or not a directory
    DestinationUnavailable(PathBuf),
    /// The batch was cancelled before this item finished
    Cancelled,
    /// The item's task ended without reporting (panic or runtime shutdown)
    TaskAborted(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Archive(e) => write!(f, "Archive error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            ArchiveError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
            ArchiveError::MetadataFailed(msg) => write!(f, "Metadata failed: {}", msg),
            ArchiveError::KindMismatch { result, original } => write!(
                f,
                "Edited asset is {} but original asset is {}",
                result, original
            ),
            ArchiveError::DestinationUnavailable(path) => {
                write!(f, "Destination unavailable: {}", path.display())
            }
            ArchiveError::Cancelled => write!(f, "Archiving cancelled"),
            ArchiveError::TaskAborted(msg) => write!(f, "Archive task aborted: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for ArchiveError {}

impl From<ArchiveError> for AppError {
    fn from(err: ArchiveError) -> Self {
        AppError::Archive(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        ArchiveError::SaveFailed(err.to_string())
    }
}

impl From<image::ImageError> for ArchiveError {
    fn from(err: image::ImageError) -> Self {
        ArchiveError::EncodingFailed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ArchiveError {
    fn from(err: tokio::task::JoinError) -> Self {
        ArchiveError::TaskAborted(err.to_string())
    }
}
