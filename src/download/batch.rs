//! Batch planning and the bounded-concurrency transfer loop.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use super::paths::{claim_key, sanitize_file_name, unique_path_excluding};
use super::progress::{BatchResult, ProgressEvent, TransferFailure};
use crate::client::ChatClient;
use crate::error::{Result, TgdlError};
use crate::model::attachment::AttachmentMessage;

pub use crate::config::DEFAULT_CONCURRENCY;

/// One attachment and where it will be written.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub message: AttachmentMessage,
    pub destination: PathBuf,
}

impl DownloadTask {
    pub fn file_name(&self) -> &str {
        self.message.display_name()
    }
}

/// Shared flag that stops a running batch from starting new transfers.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum transfers in flight. Values below 1 are treated as 1.
    pub concurrency: usize,
    pub cancel: Option<CancelToken>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            cancel: None,
        }
    }
}

impl BatchOptions {
    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency,
            ..Self::default()
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

/// The marked messages, or every message when nothing is marked.
///
/// Marks that refer to messages outside `filtered` are ignored.
pub fn select<'a>(filtered: &'a [AttachmentMessage], marked: &HashSet<i32>) -> Vec<&'a AttachmentMessage> {
    if marked.is_empty() {
        return filtered.iter().collect();
    }
    filtered.iter().filter(|m| marked.contains(&m.id)).collect()
}

/// Resolve the selection into tasks with distinct, collision-free destinations.
///
/// Creates `dir` when missing. Destinations are claimed in list order, so the
/// first of two same-named files keeps the plain name.
pub fn plan_batch(
    filtered: &[AttachmentMessage],
    marked: &HashSet<i32>,
    dir: &Path,
) -> Result<Vec<DownloadTask>> {
    let selected = select(filtered, marked);
    if selected.is_empty() {
        return Err(TgdlError::NothingToDownload);
    }

    std::fs::create_dir_all(dir).map_err(|e| TgdlError::io(dir, e))?;

    let mut claimed: HashSet<String> = HashSet::with_capacity(selected.len());
    let mut tasks = Vec::with_capacity(selected.len());

    for message in selected {
        let Some(name) = message.file_name.as_deref() else {
            tracing::warn!(message_id = message.id, "Skipping attachment without a file name");
            continue;
        };
        let destination = unique_path_excluding(&dir.join(sanitize_file_name(name)), &claimed);
        claimed.insert(claim_key(&destination));
        tasks.push(DownloadTask {
            message: message.clone(),
            destination,
        });
    }

    if tasks.is_empty() {
        return Err(TgdlError::NothingToDownload);
    }
    tracing::debug!(tasks = tasks.len(), dir = %dir.display(), "Planned batch");
    Ok(tasks)
}

enum Outcome {
    Done,
    Failed(TransferFailure),
    Skipped,
}

/// Download every task with at most `options.concurrency` transfers in flight.
///
/// Progress is reported through `on_progress`. The `completed` counter in
/// [`ProgressEvent::Completed`] only ever grows. A failed transfer is recorded
/// and its partial file removed; the other transfers carry on. After
/// cancellation no new transfer starts and the remaining tasks are counted
/// as skipped.
pub async fn run_batch(
    client: &dyn ChatClient,
    tasks: Vec<DownloadTask>,
    destination_dir: &Path,
    options: &BatchOptions,
    on_progress: &(dyn Fn(ProgressEvent) + Send + Sync),
) -> BatchResult {
    let total = tasks.len();
    let gate = Semaphore::new(options.concurrency.max(1));
    let completed = AtomicUsize::new(0);

    tracing::info!(
        total,
        concurrency = options.concurrency.max(1),
        dir = %destination_dir.display(),
        "Starting batch"
    );

    let outcomes = join_all(tasks.iter().map(|task| {
        let gate = &gate;
        let completed = &completed;
        async move {
            let Ok(_permit) = gate.acquire().await else {
                return Outcome::Skipped;
            };
            if options.is_cancelled() {
                return Outcome::Skipped;
            }

            on_progress(ProgressEvent::Started {
                file_name: task.file_name().to_string(),
                destination: task.destination.clone(),
            });

            match client.download(&task.message, &task.destination).await {
                Ok(()) => {
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    tracing::debug!(file = task.file_name(), done, total, "Transfer finished");
                    on_progress(ProgressEvent::Completed {
                        file_name: task.file_name().to_string(),
                        completed: done,
                        total,
                    });
                    Outcome::Done
                }
                Err(e) => {
                    tracing::warn!(file = task.file_name(), error = %e, "Transfer failed");
                    discard_partial(&task.destination).await;
                    on_progress(ProgressEvent::Failed {
                        file_name: task.file_name().to_string(),
                        error: e.to_string(),
                    });
                    Outcome::Failed(TransferFailure {
                        file_name: task.file_name().to_string(),
                        destination: task.destination.clone(),
                        error: e.to_string(),
                    })
                }
            }
        }
    }))
    .await;

    let mut result = BatchResult {
        attempted: total,
        destination_dir: destination_dir.to_path_buf(),
        ..BatchResult::default()
    };
    for outcome in outcomes {
        match outcome {
            Outcome::Done => result.succeeded += 1,
            Outcome::Failed(f) => result.failures.push(f),
            Outcome::Skipped => result.skipped += 1,
        }
    }

    tracing::info!(
        succeeded = result.succeeded,
        failed = result.failed(),
        skipped = result.skipped,
        "Batch finished"
    );
    result
}

/// Plan and run in one step.
pub async fn download_selection(
    client: &dyn ChatClient,
    filtered: &[AttachmentMessage],
    marked: &HashSet<i32>,
    dir: &Path,
    options: &BatchOptions,
    on_progress: &(dyn Fn(ProgressEvent) + Send + Sync),
) -> Result<BatchResult> {
    let tasks = plan_batch(filtered, marked, dir)?;
    Ok(run_batch(client, tasks, dir, options, on_progress).await)
}

async fn discard_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed partial file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Could not remove partial file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::handle::RemoteHandle;
    use chrono::Utc;

    fn msg(id: i32, name: Option<&str>) -> AttachmentMessage {
        AttachmentMessage {
            id,
            dialog_id: 7,
            file_name: name.map(str::to_string),
            size: None,
            mime_type: None,
            date: Utc::now(),
            handle: RemoteHandle::default(),
        }
    }

    #[test]
    fn test_empty_marks_select_everything() {
        let list = vec![msg(1, Some("a.pdf")), msg(2, Some("b.pdf"))];
        assert_eq!(select(&list, &HashSet::new()).len(), 2);
    }

    #[test]
    fn test_marks_select_subset_in_list_order() {
        let list = vec![msg(1, Some("a.pdf")), msg(2, Some("b.pdf")), msg(3, Some("c.pdf"))];
        let marked: HashSet<i32> = [3, 1, 99].into_iter().collect();
        let ids: Vec<i32> = select(&list, &marked).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_plan_rejects_empty_listing() {
        let dir = tempfile::tempdir().unwrap();
        let err = plan_batch(&[], &HashSet::new(), dir.path()).unwrap_err();
        assert!(matches!(err, TgdlError::NothingToDownload));
    }

    #[test]
    fn test_plan_gives_duplicates_distinct_destinations() {
        let dir = tempfile::tempdir().unwrap();
        let list = vec![msg(1, Some("x.zip")), msg(2, Some("x.zip")), msg(3, Some("x.zip"))];
        let tasks = plan_batch(&list, &HashSet::new(), dir.path()).unwrap();
        let names: Vec<PathBuf> = tasks.iter().map(|t| t.destination.clone()).collect();
        assert_eq!(
            names,
            vec![
                dir.path().join("x.zip"),
                dir.path().join("x(1).zip"),
                dir.path().join("x(2).zip"),
            ]
        );
    }

    #[test]
    fn test_plan_creates_directory_and_skips_nameless() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out");
        let list = vec![msg(1, None), msg(2, Some("keep.mp3"))];
        let tasks = plan_batch(&list, &HashSet::new(), &target).unwrap();
        assert!(target.is_dir());
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].message.id, 2);
    }

    #[test]
    fn test_plan_keeps_names_inside_directory() {
        let dir = tempfile::tempdir().unwrap();
        let list = vec![msg(1, Some("../escape.txt"))];
        let tasks = plan_batch(&list, &HashSet::new(), dir.path()).unwrap();
        assert_eq!(tasks[0].destination.parent(), Some(dir.path()));
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
