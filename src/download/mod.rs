//! Batch downloading: destination planning, the bounded transfer loop and
//! progress reporting.

pub mod batch;
pub mod paths;
pub mod progress;

pub use batch::{
    download_selection, plan_batch, run_batch, select, BatchOptions, CancelToken, DownloadTask,
    DEFAULT_CONCURRENCY,
};
pub use paths::{claim_key, sanitize_file_name, unique_path, unique_path_excluding};
pub use progress::{BatchResult, ProgressEvent, TransferFailure};
