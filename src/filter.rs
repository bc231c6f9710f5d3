//! Attachment filtering by minimum date and file category.
//!
//! Everything here is pure: the presentation layer re-runs the filter
//! whenever the date or the enabled categories change and replaces the
//! displayed list with the result.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::error::{Result, TgdlError};
use crate::model::attachment::AttachmentMessage;
use crate::model::category::{allowed_extensions, FileCategory};

/// The user's current filter inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Oldest calendar day (UTC) to keep. `None` keeps everything.
    pub min_date: Option<NaiveDate>,
    /// Enabled file categories.
    pub categories: BTreeSet<FileCategory>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            min_date: None,
            categories: FileCategory::ALL.into_iter().collect(),
        }
    }
}

impl FilterCriteria {
    pub fn new(min_date: Option<NaiveDate>, categories: impl IntoIterator<Item = FileCategory>) -> Self {
        Self {
            min_date,
            categories: categories.into_iter().collect(),
        }
    }

    /// Union of the extensions of every enabled category.
    pub fn allowed_extensions(&self) -> HashSet<String> {
        allowed_extensions(self.categories.iter().copied())
    }

    /// Apply these criteria to a listing.
    pub fn apply(&self, messages: &[AttachmentMessage]) -> Vec<AttachmentMessage> {
        filter_attachments(
            messages,
            self.min_date.unwrap_or(NaiveDate::MIN),
            &self.allowed_extensions(),
        )
    }
}

/// Keep the messages posted on or after `min_date` whose extension is in
/// `allowed`, preserving their relative order.
///
/// Messages without a file name or without an extension never match.
pub fn filter_attachments(
    messages: &[AttachmentMessage],
    min_date: NaiveDate,
    allowed: &HashSet<String>,
) -> Vec<AttachmentMessage> {
    messages
        .iter()
        .filter(|m| matches(m, min_date, allowed))
        .cloned()
        .collect()
}

/// Single-message predicate behind [`filter_attachments`].
pub fn matches(message: &AttachmentMessage, min_date: NaiveDate, allowed: &HashSet<String>) -> bool {
    if message.date.date_naive() < min_date {
        return false;
    }
    message
        .extension()
        .is_some_and(|ext| allowed.contains(&ext))
}

/// Parse a `YYYY-MM-DD` date as typed by the user.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let raw = input.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| TgdlError::InvalidDate(raw.to_string()))
}
