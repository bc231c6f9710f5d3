//! Integration tests for batch planning and the bounded-concurrency downloader.

mod common;

use std::collections::HashSet;
use std::sync::Mutex;

use common::{attachment, FakeClient};
use tgdl::download::{
    download_selection, plan_batch, run_batch, BatchOptions, CancelToken, ProgressEvent,
};
use tgdl::error::TgdlError;
use tgdl::model::attachment::AttachmentMessage;

fn numbered(count: i32) -> Vec<AttachmentMessage> {
    (1..=count)
        .map(|i| attachment(i, &format!("file{i}.jpg"), (2024, 3, 1)))
        .collect()
}

fn ignore(_: ProgressEvent) {}

// ─── Test 1: Ten transfers through a gate of five ───────────────────

#[tokio::test]
async fn test_batch_respects_concurrency_limit() {
    let dir = tempfile::tempdir().unwrap();
    let client = FakeClient::new();
    let messages = numbered(10);

    let result = download_selection(
        &client,
        &messages,
        &HashSet::new(),
        dir.path(),
        &BatchOptions::with_concurrency(5),
        &ignore,
    )
    .await
    .unwrap();

    assert_eq!(result.attempted, 10);
    assert_eq!(result.succeeded, 10);
    assert!(result.is_complete_success());
    assert_eq!(client.calls(), 10);
    assert_eq!(client.max_in_flight(), 5, "gate should be saturated but never exceeded");
    for i in 1..=10 {
        assert!(dir.path().join(format!("file{i}.jpg")).is_file());
    }
}

#[tokio::test]
async fn test_concurrency_of_one_is_sequential() {
    let dir = tempfile::tempdir().unwrap();
    let client = FakeClient::new();
    let messages = numbered(4);

    let result = download_selection(
        &client,
        &messages,
        &HashSet::new(),
        dir.path(),
        &BatchOptions::with_concurrency(1),
        &ignore,
    )
    .await
    .unwrap();

    assert_eq!(result.succeeded, 4);
    assert_eq!(client.max_in_flight(), 1);
}

// ─── Test 2: Name collisions get numbered copies ────────────────────

#[tokio::test]
async fn test_same_name_in_one_batch_is_numbered() {
    let dir = tempfile::tempdir().unwrap();
    let client = FakeClient::new();
    let messages = vec![
        attachment(1, "report.pdf", (2024, 3, 1)),
        attachment(2, "report.pdf", (2024, 3, 2)),
    ];

    let result = download_selection(
        &client,
        &messages,
        &HashSet::new(),
        dir.path(),
        &BatchOptions::default(),
        &ignore,
    )
    .await
    .unwrap();

    assert_eq!(result.succeeded, 2);
    assert_eq!(std::fs::read_to_string(dir.path().join("report.pdf")).unwrap(), "1");
    assert_eq!(std::fs::read_to_string(dir.path().join("report(1).pdf")).unwrap(), "2");
}

#[test]
fn test_names_differing_only_in_case_get_distinct_destinations() {
    let dir = tempfile::tempdir().unwrap();
    let messages = vec![
        attachment(1, "Report.pdf", (2024, 3, 1)),
        attachment(2, "report.pdf", (2024, 3, 2)),
    ];
    let tasks = plan_batch(&messages, &HashSet::new(), dir.path()).unwrap();

    assert_eq!(tasks[0].destination, dir.path().join("Report.pdf"));
    assert_eq!(tasks[1].destination, dir.path().join("report(1).pdf"));
}

#[test]
fn test_existing_file_is_never_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("report.pdf"), "old").unwrap();
    std::fs::write(dir.path().join("report(1).pdf"), "older").unwrap();

    let messages = vec![attachment(1, "report.pdf", (2024, 3, 1))];
    let tasks = plan_batch(&messages, &HashSet::new(), dir.path()).unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].destination, dir.path().join("report(2).pdf"));
    assert_eq!(std::fs::read_to_string(dir.path().join("report.pdf")).unwrap(), "old");
}

#[test]
fn test_plan_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let tasks = plan_batch(&numbered(1), &HashSet::new(), &nested).unwrap();
    assert!(nested.is_dir());
    assert_eq!(tasks[0].destination, nested.join("file1.jpg"));
}

// ─── Test 3: Selection semantics ────────────────────────────────────

#[tokio::test]
async fn test_marked_subset_only() {
    let dir = tempfile::tempdir().unwrap();
    let client = FakeClient::new();
    let messages = numbered(5);
    let marked: HashSet<i32> = [2, 4].into_iter().collect();

    let result = download_selection(
        &client,
        &messages,
        &marked,
        dir.path(),
        &BatchOptions::default(),
        &ignore,
    )
    .await
    .unwrap();

    assert_eq!(result.attempted, 2);
    assert!(dir.path().join("file2.jpg").is_file());
    assert!(dir.path().join("file4.jpg").is_file());
    assert!(!dir.path().join("file1.jpg").exists());
}

#[test]
fn test_empty_listing_is_nothing_to_download() {
    let dir = tempfile::tempdir().unwrap();
    let err = plan_batch(&[], &HashSet::new(), dir.path()).unwrap_err();
    assert!(matches!(err, TgdlError::NothingToDownload));
}

// ─── Test 4: Progress is monotonic ──────────────────────────────────

#[tokio::test]
async fn test_progress_counts_only_grow() {
    let dir = tempfile::tempdir().unwrap();
    let client = FakeClient::new();
    let messages = numbered(8);
    let seen = Mutex::new(Vec::new());

    let on_progress = |event: ProgressEvent| {
        if let ProgressEvent::Completed { completed, total, .. } = event {
            assert_eq!(total, 8);
            seen.lock().unwrap().push(completed);
        }
    };

    let tasks = plan_batch(&messages, &HashSet::new(), dir.path()).unwrap();
    let result = run_batch(
        &client,
        tasks,
        dir.path(),
        &BatchOptions::with_concurrency(3),
        &on_progress,
    )
    .await;

    let seen = seen.into_inner().unwrap();
    assert_eq!(result.succeeded, 8);
    assert_eq!(seen, (1..=8).collect::<Vec<_>>());
}

// ─── Test 5: One failure does not sink the batch ────────────────────

#[tokio::test]
async fn test_failure_is_isolated_and_partial_file_removed() {
    let dir = tempfile::tempdir().unwrap();
    let client = FakeClient::new().failing([2]);
    let messages = numbered(3);
    let failed_names = Mutex::new(Vec::new());
    let completed_counts = Mutex::new(Vec::new());

    let on_progress = |event: ProgressEvent| match event {
        ProgressEvent::Failed { file_name, .. } => failed_names.lock().unwrap().push(file_name),
        ProgressEvent::Completed { completed, total, .. } => {
            completed_counts.lock().unwrap().push((completed, total))
        }
        ProgressEvent::Started { .. } => {}
    };

    let result = download_selection(
        &client,
        &messages,
        &HashSet::new(),
        dir.path(),
        &BatchOptions::default(),
        &on_progress,
    )
    .await
    .unwrap();

    assert_eq!(result.attempted, 3);
    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failed(), 1);
    assert!(!result.is_complete_success());
    assert_eq!(result.failures[0].file_name, "file2.jpg");
    assert!(result.failures[0].error.contains("connection reset"));
    assert_eq!(failed_names.into_inner().unwrap(), vec!["file2.jpg".to_string()]);

    // With a failure the success count stops short of the total.
    let counts = completed_counts.into_inner().unwrap();
    let (last, total) = *counts.last().unwrap();
    assert_eq!(last, 2);
    assert!(last < total);
    assert_eq!(total, 3);

    assert!(dir.path().join("file1.jpg").is_file());
    assert!(!dir.path().join("file2.jpg").exists(), "partial file should be removed");
    assert!(dir.path().join("file3.jpg").is_file());
}

// ─── Test 6: Cancellation stops new transfers ───────────────────────

#[tokio::test]
async fn test_cancel_skips_remaining_items() {
    let dir = tempfile::tempdir().unwrap();
    let client = FakeClient::new();
    let messages = numbered(4);
    let cancel = CancelToken::new();

    let options = BatchOptions {
        concurrency: 1,
        cancel: Some(cancel.clone()),
    };
    let on_progress = move |event: ProgressEvent| {
        if matches!(event, ProgressEvent::Completed { .. }) {
            cancel.cancel();
        }
    };

    let tasks = plan_batch(&messages, &HashSet::new(), dir.path()).unwrap();
    let result = run_batch(&client, tasks, dir.path(), &options, &on_progress).await;

    assert_eq!(result.succeeded, 1);
    assert_eq!(result.skipped, 3);
    assert_eq!(client.calls(), 1);
    assert!(!result.is_complete_success());
}

#[tokio::test]
async fn test_cancel_before_start_runs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let client = FakeClient::new();
    let cancel = CancelToken::new();
    cancel.cancel();

    let options = BatchOptions {
        concurrency: 2,
        cancel: Some(cancel),
    };
    let tasks = plan_batch(&numbered(3), &HashSet::new(), dir.path()).unwrap();
    let result = run_batch(&client, tasks, dir.path(), &options, &ignore).await;

    assert_eq!(result.skipped, 3);
    assert_eq!(client.calls(), 0);
}
