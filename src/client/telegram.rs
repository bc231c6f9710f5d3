//! Telegram backend built on grammers.

use std::path::Path;

use async_trait::async_trait;
use grammers_client::types::{Chat, Media, Message};
use grammers_client::{Client, Config, InitParams, SignInError};
use grammers_session::Session;

use super::{ChatClient, LoginPrompt};
use crate::config::Credentials;
use crate::error::{Result, TgdlError};
use crate::model::attachment::AttachmentMessage;
use crate::model::dialog::{Dialog, DialogKind};
use crate::model::handle::RemoteHandle;

pub struct TelegramClient {
    client: Client,
}

async fn open(credentials: &Credentials, session_path: &Path) -> Result<Client> {
    let session = Session::load_file_or_create(session_path)
        .map_err(|e| TgdlError::io(session_path, e))?;

    Client::connect(Config {
        session,
        api_id: credentials.api_id,
        api_hash: credentials.api_hash.clone(),
        params: InitParams::default(),
    })
    .await
    .map_err(|e| TgdlError::Connection(e.to_string()))
}

impl TelegramClient {
    /// Connect with an existing session. An unauthorized session is an error.
    pub async fn connect(credentials: &Credentials, session_path: &Path) -> Result<Self> {
        let client = open(credentials, session_path).await?;

        let authorized = client
            .is_authorized()
            .await
            .map_err(|e| TgdlError::Connection(e.to_string()))?;
        if !authorized {
            return Err(TgdlError::Unauthorized);
        }

        tracing::info!("Telegram session authorized");
        Ok(Self { client })
    }
}

fn to_dialog(chat: &Chat) -> Option<Dialog> {
    let kind = match chat {
        Chat::Group(_) => DialogKind::Group,
        Chat::Channel(_) => DialogKind::Channel,
        Chat::User(_) => return None,
    };
    Some(Dialog {
        id: chat.id(),
        name: chat.name().to_string(),
        kind,
        handle: RemoteHandle::new(chat.clone()),
    })
}

fn to_attachment(dialog_id: i64, message: &Message) -> Option<AttachmentMessage> {
    let Some(Media::Document(doc)) = message.media() else {
        return None;
    };
    let name = doc.name();
    if name.is_empty() {
        return None;
    }
    Some(AttachmentMessage {
        id: message.id(),
        dialog_id,
        file_name: Some(name.to_string()),
        size: u64::try_from(doc.size()).ok(),
        mime_type: doc.mime_type().map(str::to_string),
        date: message.date(),
        handle: RemoteHandle::new(message.clone()),
    })
}

#[async_trait]
impl ChatClient for TelegramClient {
    async fn list_dialogs(&self) -> Result<Vec<Dialog>> {
        let mut dialogs = Vec::new();
        let mut iter = self.client.iter_dialogs();
        while let Some(dialog) = iter
            .next()
            .await
            .map_err(|e| TgdlError::listing("dialogs", e))?
        {
            if let Some(d) = to_dialog(dialog.chat()) {
                dialogs.push(d);
            }
        }
        tracing::debug!(count = dialogs.len(), "Listed dialogs");
        Ok(dialogs)
    }

    async fn list_attachment_messages(
        &self,
        dialog: &Dialog,
        limit: usize,
    ) -> Result<Vec<AttachmentMessage>> {
        let chat = dialog
            .handle
            .downcast_ref::<Chat>()
            .ok_or_else(|| TgdlError::listing("messages", "dialog has no remote handle"))?;

        let mut found = Vec::new();
        let mut iter = self.client.iter_messages(chat).limit(limit);
        while let Some(message) = iter
            .next()
            .await
            .map_err(|e| TgdlError::listing("messages", e))?
        {
            if let Some(att) = to_attachment(dialog.id, &message) {
                found.push(att);
            }
        }
        tracing::debug!(dialog = dialog.id, scanned = limit, kept = found.len(), "Listed attachments");
        Ok(found)
    }

    async fn download(&self, message: &AttachmentMessage, destination: &Path) -> Result<()> {
        let transfer_err = |reason: String| TgdlError::Transfer {
            file_name: message.display_name().to_string(),
            reason,
        };

        let remote = message
            .handle
            .downcast_ref::<Message>()
            .ok_or_else(|| transfer_err("message has no remote handle".to_string()))?;

        let written = remote
            .download_media(destination)
            .await
            .map_err(|e| transfer_err(e.to_string()))?;
        if !written {
            return Err(transfer_err("message carries no downloadable media".to_string()));
        }
        Ok(())
    }
}

/// Interactive sign-in: phone, code, and the two-step password when asked.
pub async fn login(
    credentials: &Credentials,
    session_path: &Path,
    prompt: &dyn LoginPrompt,
) -> Result<String> {
    let client = open(credentials, session_path).await?;

    let authorized = client
        .is_authorized()
        .await
        .map_err(|e| TgdlError::Connection(e.to_string()))?;

    if !authorized {
        let phone = prompt.phone()?;
        let token = client
            .request_login_code(phone.trim())
            .await
            .map_err(|e| TgdlError::Connection(e.to_string()))?;
        let code = prompt.code()?;

        match client.sign_in(&token, code.trim()).await {
            Ok(_) => {}
            Err(SignInError::PasswordRequired(password_token)) => {
                let password = prompt.password(password_token.hint())?;
                client
                    .check_password(password_token, password.trim())
                    .await
                    .map_err(|e| TgdlError::Connection(e.to_string()))?;
            }
            Err(e) => return Err(TgdlError::Connection(e.to_string())),
        }
    }

    client
        .session()
        .save_to_file(session_path)
        .map_err(|e| TgdlError::io(session_path, e))?;

    let me = client
        .get_me()
        .await
        .map_err(|e| TgdlError::Connection(e.to_string()))?;
    tracing::info!(user_id = me.id(), "Signed in");
    Ok(me.first_name().to_string())
}
