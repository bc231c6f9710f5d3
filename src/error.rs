//! Centralized error types for tgdl.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the tgdl library.
#[derive(Error, Debug)]
pub enum TgdlError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Missing or invalid configuration (credentials, config file syntax).
    #[error("Configuration error: {0}")]
    Config(String),

    /// No session file was found. The user has to run `tgdl login`.
    #[error("Session file not found at '{0}'. Please log in first with `tgdl login`")]
    SessionMissing(PathBuf),

    /// A session file exists but the platform no longer accepts it.
    #[error("Session is not authorized. Please log in again with `tgdl login`")]
    Unauthorized,

    /// Connecting to the platform failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// This build carries no chat backend.
    #[error("This build has no Telegram backend; rebuild with `--features telegram`")]
    BackendUnavailable,

    /// Enumerating dialogs or messages failed.
    #[error("Failed to list {what}: {reason}")]
    Listing { what: &'static str, reason: String },

    /// No dialog matched the user's query.
    #[error("No chat matches '{0}'")]
    DialogNotFound(String),

    /// More than one dialog matched the user's query.
    #[error("'{query}' matches several chats: {candidates}")]
    AmbiguousDialog { query: String, candidates: String },

    /// A single attachment transfer failed.
    #[error("Transfer of '{file_name}' failed: {reason}")]
    Transfer { file_name: String, reason: String },

    /// The current listing has nothing to download.
    #[error("The current chat has no downloadable files")]
    NothingToDownload,

    /// A date argument could not be parsed.
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A file category name is not known.
    #[error("Unknown file category '{0}' (expected images, videos, audio, documents or archives)")]
    UnknownCategory(String),

    /// Reading from an interactive terminal prompt failed.
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// The user cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,
}

/// Convenience alias for `Result<T, TgdlError>`.
pub type Result<T> = std::result::Result<T, TgdlError>;

impl TgdlError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a `Listing` error from any displayable backend error.
    pub fn listing(what: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Listing {
            what,
            reason: reason.to_string(),
        }
    }

    /// `true` when the user must redo the login flow to recover.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::SessionMissing(_) | Self::Unauthorized)
    }
}
