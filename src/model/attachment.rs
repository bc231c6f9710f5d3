//! Messages that carry a downloadable file.
//!
//! The file content is NOT fetched when listing. Only metadata and an opaque
//! backend handle are kept; bytes are pulled at download time.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::category::FileCategory;
use super::handle::RemoteHandle;

/// A chat message with a file attachment.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentMessage {
    /// Message id, unique within its chat.
    pub id: i32,
    /// Id of the chat the message was listed from.
    pub dialog_id: i64,
    /// Original file name, if the sender provided one.
    pub file_name: Option<String>,
    /// File size in bytes, when the platform reports it.
    pub size: Option<u64>,
    /// MIME type, when the platform reports it.
    pub mime_type: Option<String>,
    /// When the message was posted.
    pub date: DateTime<Utc>,
    /// Backend message used to fetch the bytes.
    #[serde(skip)]
    pub handle: RemoteHandle,
}

impl AttachmentMessage {
    /// Lowercase extension including the leading dot (`".pdf"`).
    ///
    /// `None` when there is no file name or the name has no extension.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let ext = Path::new(name).extension()?.to_str()?;
        if ext.is_empty() {
            return None;
        }
        Some(format!(".{}", ext.to_lowercase()))
    }

    /// Name shown in lists.
    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("<unnamed>")
    }

    /// Category of the file, judged by its extension.
    pub fn category(&self) -> Option<FileCategory> {
        FileCategory::of_extension(&self.extension()?)
    }
}
