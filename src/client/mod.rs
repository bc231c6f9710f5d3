//! The chat platform boundary.
//!
//! Everything that talks to the network goes through [`ChatClient`]. The
//! Telegram implementation lives in [`telegram`] behind the `telegram`
//! feature; tests and other front ends plug in their own implementations.

pub mod session;
#[cfg(feature = "telegram")]
pub mod telegram;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, Credentials};
use crate::error::{Result, TgdlError};
use crate::model::attachment::AttachmentMessage;
use crate::model::dialog::Dialog;

use self::session::SessionFile;

/// An authenticated connection to the chat platform.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Groups and channels visible to the user, in platform order.
    async fn list_dialogs(&self) -> Result<Vec<Dialog>>;

    /// The most recent `limit` messages of `dialog` that carry a file.
    async fn list_attachment_messages(
        &self,
        dialog: &Dialog,
        limit: usize,
    ) -> Result<Vec<AttachmentMessage>>;

    /// Fetch the attachment of `message` into `destination`.
    async fn download(&self, message: &AttachmentMessage, destination: &Path) -> Result<()>;
}

/// Terminal prompts needed by the interactive login flow.
pub trait LoginPrompt {
    fn phone(&self) -> Result<String>;
    fn code(&self) -> Result<String>;
    /// Two-step verification password. `hint` is the user's password hint.
    fn password(&self, hint: Option<&str>) -> Result<String>;
}

/// Check the preconditions for a connection, then hand off to `connector`.
///
/// A missing session file or unusable credentials fail here, before the
/// connector (and therefore the network) is touched.
pub async fn connect_with<F, Fut>(
    config: &Config,
    session: &SessionFile,
    connector: F,
) -> Result<Arc<dyn ChatClient>>
where
    F: FnOnce(Credentials, PathBuf) -> Fut,
    Fut: Future<Output = Result<Arc<dyn ChatClient>>>,
{
    let session_path = session.require()?.to_path_buf();
    let credentials = config.credentials()?;
    tracing::info!(
        session = %session_path.display(),
        api_id = credentials.api_id,
        "Connecting"
    );
    connector(credentials, session_path).await
}

/// Connect with the compiled-in backend.
pub async fn connect(config: &Config, session: &SessionFile) -> Result<Arc<dyn ChatClient>> {
    #[cfg(feature = "telegram")]
    {
        connect_with(config, session, |creds, path| async move {
            let client = telegram::TelegramClient::connect(&creds, &path).await?;
            Ok(Arc::new(client) as Arc<dyn ChatClient>)
        })
        .await
    }

    #[cfg(not(feature = "telegram"))]
    {
        connect_with(config, session, |_, _| async {
            Err::<Arc<dyn ChatClient>, _>(TgdlError::BackendUnavailable)
        })
        .await
    }
}

/// Run the interactive sign-in and write the session file.
///
/// Returns the signed-in user's display name.
pub async fn login(
    credentials: &Credentials,
    session: &SessionFile,
    prompt: &dyn LoginPrompt,
) -> Result<String> {
    #[cfg(feature = "telegram")]
    {
        telegram::login(credentials, session.path(), prompt).await
    }

    #[cfg(not(feature = "telegram"))]
    {
        let _ = (credentials, session, prompt);
        Err(TgdlError::BackendUnavailable)
    }
}
