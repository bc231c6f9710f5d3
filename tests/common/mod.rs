//! Shared fixtures: an in-memory chat client and message builders.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use tgdl::client::ChatClient;
use tgdl::error::{Result, TgdlError};
use tgdl::model::attachment::AttachmentMessage;
use tgdl::model::dialog::{Dialog, DialogKind};
use tgdl::model::handle::RemoteHandle;

/// Chat client that "downloads" by writing the message id into the file.
#[derive(Default)]
pub struct FakeClient {
    pub dialogs: Vec<Dialog>,
    pub messages: Vec<AttachmentMessage>,
    /// Message ids whose transfer fails after writing a partial file.
    pub failing: HashSet<i32>,
    pub delay: Duration,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(10),
            ..Self::default()
        }
    }

    pub fn failing(mut self, ids: impl IntoIterator<Item = i32>) -> Self {
        self.failing = ids.into_iter().collect();
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for FakeClient {
    async fn list_dialogs(&self) -> Result<Vec<Dialog>> {
        Ok(self.dialogs.clone())
    }

    async fn list_attachment_messages(
        &self,
        dialog: &Dialog,
        limit: usize,
    ) -> Result<Vec<AttachmentMessage>> {
        Ok(self
            .messages
            .iter()
            .filter(|m| m.dialog_id == dialog.id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn download(&self, message: &AttachmentMessage, destination: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        let outcome = if self.failing.contains(&message.id) {
            std::fs::write(destination, b"partial").map_err(|e| TgdlError::io(destination, e))?;
            Err(TgdlError::Transfer {
                file_name: message.display_name().to_string(),
                reason: "connection reset".to_string(),
            })
        } else {
            std::fs::write(destination, message.id.to_string())
                .map_err(|e| TgdlError::io(destination, e))
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

pub fn dialog(id: i64, name: &str) -> Dialog {
    Dialog {
        id,
        name: name.to_string(),
        kind: DialogKind::Channel,
        handle: RemoteHandle::new(()),
    }
}

/// Attachment posted at noon UTC on the given day.
pub fn attachment(id: i32, name: &str, (y, m, d): (i32, u32, u32)) -> AttachmentMessage {
    AttachmentMessage {
        id,
        dialog_id: 1,
        file_name: Some(name.to_string()),
        size: Some(1024),
        mime_type: None,
        date: Utc
            .with_ymd_and_hms(y, m, d, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
        handle: RemoteHandle::new(()),
    }
}
