//! Chats (groups and channels) a user can download from.

use serde::Serialize;

use super::handle::RemoteHandle;
use crate::error::{Result, TgdlError};

/// Kind of chat entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    Group,
    Channel,
}

impl DialogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Channel => "channel",
        }
    }
}

/// A group or channel as returned by the platform, in platform order.
#[derive(Debug, Clone, Serialize)]
pub struct Dialog {
    /// Platform id of the chat.
    pub id: i64,
    /// Display name (chat title).
    pub name: String,
    pub kind: DialogKind,
    /// Backend entity used to list messages in this chat.
    #[serde(skip)]
    pub handle: RemoteHandle,
}

/// Find the dialog a user means by `query`.
///
/// Tries, in order: numeric id, exact name, case-insensitive name, then a
/// unique case-insensitive substring of the name.
pub fn find_dialog<'a>(dialogs: &'a [Dialog], query: &str) -> Result<&'a Dialog> {
    let query = query.trim();

    if let Ok(id) = query.parse::<i64>() {
        if let Some(d) = dialogs.iter().find(|d| d.id == id) {
            return Ok(d);
        }
    }

    if let Some(d) = dialogs.iter().find(|d| d.name == query) {
        return Ok(d);
    }

    let needle = query.to_lowercase();
    if let Some(d) = dialogs.iter().find(|d| d.name.to_lowercase() == needle) {
        return Ok(d);
    }

    let partial: Vec<&Dialog> = dialogs
        .iter()
        .filter(|d| d.name.to_lowercase().contains(&needle))
        .collect();
    match partial.as_slice() {
        [] => Err(TgdlError::DialogNotFound(query.to_string())),
        [only] => Ok(only),
        many => Err(TgdlError::AmbiguousDialog {
            query: query.to_string(),
            candidates: many
                .iter()
                .map(|d| d.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
