//! Global application state for the TUI (the "Model" in Elm architecture).
//!
//! Network work never runs on the UI thread. Each operation is spawned on the
//! tokio runtime and reports back through an [`AppEvent`] that the event loop
//! drains on every tick.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::client::session::SessionFile;
use crate::client::ChatClient;
use crate::config::{Config, ConfigStore};
use crate::download::{self, BatchOptions, BatchResult, CancelToken, ProgressEvent};
use crate::error::{Result, TgdlError};
use crate::filter::{parse_date, FilterCriteria};
use crate::i18n;
use crate::model::attachment::AttachmentMessage;
use crate::model::category::FileCategory;
use crate::model::dialog::Dialog;

/// Which panel currently has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    Dialogs,
    Files,
}

/// What the input bar is currently editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    MinDate,
    DownloadDir,
}

/// Results of background work, delivered to the UI thread.
pub enum AppEvent {
    Connected(Result<Arc<dyn ChatClient>>),
    DialogsLoaded(Result<Vec<Dialog>>),
    MessagesLoaded {
        dialog_id: i64,
        result: Result<Vec<AttachmentMessage>>,
    },
    Progress(ProgressEvent),
    BatchFinished(BatchResult),
}

/// Live state of the running batch.
#[derive(Debug, Clone)]
pub struct BatchState {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub current_file: Option<String>,
    pub cancel: CancelToken,
}

impl BatchState {
    /// Fraction of finished transfers (successful or not), for the gauge.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        ((self.completed + self.failed) as f64 / self.total as f64).min(1.0)
    }
}

/// Complete TUI state.
pub struct App {
    // ── Environment ───────────────────────────
    pub config: Config,
    /// Where `config` is persisted. `None` keeps changes in memory only.
    pub config_store: Option<ConfigStore>,
    pub session: SessionFile,
    runtime: Handle,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    pub client: Option<Arc<dyn ChatClient>>,
    pub connecting: bool,

    // ── Chats ─────────────────────────────────
    pub dialogs: Vec<Dialog>,
    pub dialog_selected: usize,
    pub dialog_scroll_offset: usize,
    pub loading_dialogs: bool,

    // ── Files ─────────────────────────────────
    /// Dialog whose attachments are shown.
    pub active_dialog: Option<Dialog>,
    /// Dialog whose listing is in flight. Becomes active once it arrives.
    pub pending_dialog: Option<Dialog>,
    pub loading_messages: bool,
    /// Everything listed for the active dialog.
    pub messages: Vec<AttachmentMessage>,
    /// `messages` after the filter, in listing order.
    pub visible: Vec<AttachmentMessage>,
    pub file_selected: usize,
    pub file_scroll_offset: usize,
    /// Message ids marked for download. Empty means "everything visible".
    pub marked: HashSet<i32>,
    pub criteria: FilterCriteria,

    // ── UI state ──────────────────────────────
    pub focus: PanelFocus,
    pub input_mode: Option<InputMode>,
    pub input_buffer: String,
    pub show_help: bool,
    pub show_categories: bool,
    pub category_selected: usize,

    // ── Batch ─────────────────────────────────
    pub batch: Option<BatchState>,
    pub last_batch: Option<BatchResult>,

    // ── Lifecycle ─────────────────────────────
    pub should_quit: bool,
    /// Quit as soon as the running batch has wound down.
    pub quit_after_batch: bool,
    /// Transient status message and the instant it was set.
    pub status_message: Option<(String, Instant)>,
    /// Cached viewport height for the file list (set during render).
    pub list_viewport_height: usize,
}

impl App {
    pub fn new(
        config: Config,
        config_store: Option<ConfigStore>,
        session: SessionFile,
        runtime: Handle,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            config,
            config_store,
            session,
            runtime,
            events_tx,
            events_rx,
            client: None,
            connecting: false,
            dialogs: Vec::new(),
            dialog_selected: 0,
            dialog_scroll_offset: 0,
            loading_dialogs: false,
            active_dialog: None,
            pending_dialog: None,
            loading_messages: false,
            messages: Vec::new(),
            visible: Vec::new(),
            file_selected: 0,
            file_scroll_offset: 0,
            marked: HashSet::new(),
            criteria: FilterCriteria::default(),
            focus: PanelFocus::Dialogs,
            input_mode: None,
            input_buffer: String::new(),
            show_help: false,
            show_categories: false,
            category_selected: 0,
            batch: None,
            last_batch: None,
            should_quit: false,
            quit_after_batch: false,
            status_message: None,
            list_viewport_height: 20,
        }
    }

    /// Open the connection in the background.
    pub fn connect(&mut self) {
        if self.connecting || self.client.is_some() {
            return;
        }
        self.connecting = true;
        self.set_status(i18n::tui_status_connecting());

        let config = self.config.clone();
        let session = self.session.clone();
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = crate::client::connect(&config, &session).await;
            let _ = tx.send(AppEvent::Connected(result));
        });
    }

    /// Re-list groups and channels.
    pub fn refresh_dialogs(&mut self) {
        let Some(client) = self.client.clone() else {
            self.set_status(i18n::tui_status_not_connected());
            return;
        };
        self.loading_dialogs = true;
        self.set_status(i18n::tui_status_loading_dialogs());

        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = client.list_dialogs().await;
            let _ = tx.send(AppEvent::DialogsLoaded(result));
        });
    }

    /// Open the dialog at `index` in the chat list and list its attachments.
    pub fn select_dialog(&mut self, index: usize) {
        let Some(dialog) = self.dialogs.get(index).cloned() else {
            return;
        };
        let Some(client) = self.client.clone() else {
            self.set_status(i18n::tui_status_not_connected());
            return;
        };

        self.dialog_selected = index;
        self.pending_dialog = Some(dialog.clone());
        self.loading_messages = true;
        self.set_status(i18n::tui_status_loading_files());

        let limit = self.config.message_limit;
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = client.list_attachment_messages(&dialog, limit).await;
            let _ = tx.send(AppEvent::MessagesLoaded {
                dialog_id: dialog.id,
                result,
            });
        });
    }

    /// Recompute the visible list from `messages` and the current criteria.
    ///
    /// Marks on rows that are no longer visible are dropped.
    pub fn apply_filter(&mut self) {
        self.visible = self.criteria.apply(&self.messages);
        let visible_ids: HashSet<i32> = self.visible.iter().map(|m| m.id).collect();
        self.marked.retain(|id| visible_ids.contains(id));
        self.file_selected = self.file_selected.min(self.visible.len().saturating_sub(1));
        self.file_scroll_offset = self.file_scroll_offset.min(self.file_selected);
    }

    pub fn toggle_category(&mut self, category: FileCategory) {
        if !self.criteria.categories.remove(&category) {
            self.criteria.categories.insert(category);
        }
        self.apply_filter();
    }

    /// Enable every category, or clear them all when all are enabled already.
    pub fn toggle_all_categories(&mut self) {
        if self.criteria.categories.len() == FileCategory::ALL.len() {
            self.criteria.categories.clear();
        } else {
            self.criteria.categories = FileCategory::ALL.into_iter().collect();
        }
        self.apply_filter();
    }

    /// Set the minimum date from user input. Blank input removes the bound.
    pub fn set_min_date(&mut self, input: &str) -> Result<()> {
        self.criteria.min_date = if input.trim().is_empty() {
            None
        } else {
            Some(parse_date(input)?)
        };
        self.apply_filter();
        Ok(())
    }

    /// Change the download folder and persist it.
    pub fn set_download_dir(&mut self, input: &str) -> Result<()> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(TgdlError::Config("download folder must not be empty".to_string()));
        }
        let dir = PathBuf::from(raw);
        self.config.download_dir = Some(dir.clone());
        if let Some(store) = &self.config_store {
            store.save(&self.config)?;
        }
        tracing::info!(dir = %dir.display(), "Download folder changed");
        self.set_status(&format!("{} {}", i18n::tui_folder_set(), dir.display()));
        Ok(())
    }

    pub fn current_file(&self) -> Option<&AttachmentMessage> {
        self.visible.get(self.file_selected)
    }

    /// Toggle mark on the currently selected file.
    pub fn toggle_mark(&mut self) {
        if let Some(id) = self.current_file().map(|m| m.id) {
            if !self.marked.remove(&id) {
                self.marked.insert(id);
            }
        }
    }

    /// Mark every visible file, or clear the marks when all are marked.
    pub fn toggle_mark_all(&mut self) {
        if !self.visible.is_empty() && self.marked.len() == self.visible.len() {
            self.marked.clear();
        } else {
            self.marked = self.visible.iter().map(|m| m.id).collect();
        }
    }

    /// Download the marked files, or every visible file when none is marked.
    pub fn start_download(&mut self) {
        if self.batch.is_some() {
            self.set_status(i18n::tui_status_batch_running());
            return;
        }
        if self.loading_messages {
            self.set_status(i18n::tui_status_loading_files());
            return;
        }
        let Some(client) = self.client.clone() else {
            self.set_status(i18n::tui_status_not_connected());
            return;
        };

        let dir = self.config.download_dir();
        let tasks = match download::plan_batch(&self.visible, &self.marked, &dir) {
            Ok(tasks) => tasks,
            Err(e) => {
                self.report_error(&e);
                return;
            }
        };

        let cancel = CancelToken::new();
        self.batch = Some(BatchState {
            total: tasks.len(),
            completed: 0,
            failed: 0,
            current_file: None,
            cancel: cancel.clone(),
        });
        self.set_status(i18n::tui_status_batch_start());

        let options = BatchOptions {
            concurrency: self.config.concurrency(),
            cancel: Some(cancel),
        };
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let progress_tx = tx.clone();
            let on_progress = move |event: ProgressEvent| {
                let _ = progress_tx.send(AppEvent::Progress(event));
            };
            let result = download::run_batch(client.as_ref(), tasks, &dir, &options, &on_progress).await;
            let _ = tx.send(AppEvent::BatchFinished(result));
        });
    }

    /// Stop the running batch from starting further transfers.
    pub fn cancel_download(&mut self) {
        if let Some(batch) = &self.batch {
            batch.cancel.cancel();
            self.set_status(i18n::tui_status_cancelling());
        }
    }

    /// Quit now, or after the running batch has wound down.
    pub fn request_quit(&mut self) {
        if self.batch.is_some() {
            self.cancel_download();
            self.quit_after_batch = true;
            self.set_status(i18n::tui_status_waiting_quit());
        } else {
            self.should_quit = true;
        }
    }

    /// Apply the result of background work.
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Connected(Ok(client)) => {
                self.connecting = false;
                self.client = Some(client);
                self.set_status(i18n::tui_status_connected());
                self.refresh_dialogs();
            }
            AppEvent::Connected(Err(e)) => {
                self.connecting = false;
                self.report_error(&e);
            }
            AppEvent::DialogsLoaded(Ok(dialogs)) => {
                self.loading_dialogs = false;
                self.set_status(&i18n::dialogs_loaded(dialogs.len()));
                self.dialogs = dialogs;
                self.dialog_selected = self.dialog_selected.min(self.dialogs.len().saturating_sub(1));
                self.dialog_scroll_offset = 0;
            }
            AppEvent::DialogsLoaded(Err(e)) => {
                // The previous list stays on screen.
                self.loading_dialogs = false;
                self.report_error(&e);
            }
            AppEvent::MessagesLoaded { dialog_id, result } => {
                if self.pending_dialog.as_ref().map(|d| d.id) != Some(dialog_id) {
                    tracing::debug!(dialog_id, "Ignoring stale listing");
                    return;
                }
                self.loading_messages = false;
                let dialog = self.pending_dialog.take();
                match result {
                    Ok(messages) => {
                        // The shown chat and its files change together.
                        self.active_dialog = dialog;
                        self.messages = messages;
                        self.marked.clear();
                        self.file_selected = 0;
                        self.file_scroll_offset = 0;
                        self.apply_filter();
                        self.focus = PanelFocus::Files;
                        self.set_status(&i18n::files_shown(self.visible.len(), self.messages.len()));
                    }
                    Err(e) => self.report_error(&e),
                }
            }
            AppEvent::Progress(progress) => self.apply_progress(progress),
            AppEvent::BatchFinished(result) => {
                self.batch = None;
                self.set_status(&result.summary());
                for failure in &result.failures {
                    tracing::warn!(file = %failure.file_name, error = %failure.error, "Download failed");
                }
                self.last_batch = Some(result);
                if self.quit_after_batch {
                    self.should_quit = true;
                }
            }
        }
    }

    fn apply_progress(&mut self, progress: ProgressEvent) {
        let Some(batch) = self.batch.as_mut() else {
            return;
        };
        match progress {
            ProgressEvent::Started { file_name, .. } => batch.current_file = Some(file_name),
            ProgressEvent::Completed { completed, .. } => {
                batch.completed = batch.completed.max(completed);
            }
            ProgressEvent::Failed { .. } => batch.failed += 1,
        }
    }

    /// Deliver every pending background result.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Status line for the running batch, if any.
    pub fn batch_status(&self) -> Option<String> {
        let batch = self.batch.as_ref()?;
        Some(match &batch.current_file {
            Some(name) => format!(
                "{}  |  {}",
                i18n::status_downloading(name),
                i18n::status_downloaded(batch.completed, batch.total)
            ),
            None => i18n::status_downloaded(batch.completed, batch.total),
        })
    }

    fn report_error(&mut self, error: &TgdlError) {
        tracing::warn!(error = %error, "Operation failed");
        self.set_status(&format!("{}: {error}", i18n::tui_error()));
    }

    /// Set a transient status message that auto-clears after a few seconds.
    pub fn set_status(&mut self, msg: &str) {
        self.status_message = Some((msg.to_string(), Instant::now()));
    }

    /// Called every tick: applies background results and clears expired
    /// status messages.
    pub fn tick(&mut self) {
        self.drain_events();
        if let Some((_, when)) = &self.status_message {
            if when.elapsed().as_secs() >= 5 {
                self.status_message = None;
            }
        }
    }

    pub fn select_file(&mut self, index: usize) {
        if index < self.visible.len() {
            self.file_selected = index;
        }
    }

    /// Ensure the selected row is visible given the current scroll offset.
    pub fn ensure_selected_visible(&mut self) {
        let vp = self.list_viewport_height.max(1);
        if self.file_selected < self.file_scroll_offset {
            self.file_scroll_offset = self.file_selected;
        } else if self.file_selected >= self.file_scroll_offset + vp {
            self.file_scroll_offset = self.file_selected.saturating_sub(vp - 1);
        }
    }
}
