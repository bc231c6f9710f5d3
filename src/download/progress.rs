//! Progress notifications and the final report of a batch.

use std::path::PathBuf;

use serde::Serialize;

use crate::i18n;

/// Emitted by the orchestrator while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A transfer acquired a slot and is about to start.
    Started {
        file_name: String,
        destination: PathBuf,
    },
    /// A transfer finished. `completed` counts successes so far and never
    /// decreases within one batch.
    Completed {
        file_name: String,
        completed: usize,
        total: usize,
    },
    /// A transfer failed. The rest of the batch keeps going.
    Failed { file_name: String, error: String },
}

/// One failed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferFailure {
    pub file_name: String,
    pub destination: PathBuf,
    pub error: String,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<TransferFailure>,
    /// Items never started because the batch was cancelled.
    pub skipped: usize,
    pub destination_dir: PathBuf,
}

impl BatchResult {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0 && self.succeeded == self.attempted
    }

    /// Localized one-line summary for status bars and terminal output.
    pub fn summary(&self) -> String {
        i18n::batch_summary(self.succeeded, self.attempted, self.failed(), self.skipped)
    }
}
