//! Destination path handling: file name sanitizing and collision avoidance.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Longest sanitized file name in UTF-8 bytes. Filesystems cap names at 255
/// bytes; the remainder is room for a `(n)` counter.
const MAX_NAME_BYTES: usize = 240;

/// Extensions longer than this are not treated as extensions when truncating.
const MAX_EXT_BYTES: usize = 16;

/// If `candidate` already exists, insert `(n)` before the extension with the
/// smallest `n >= 1` that is free.
///
/// `report.pdf` becomes `report(1).pdf`, then `report(2).pdf`, and so on.
pub fn unique_path(candidate: &Path) -> PathBuf {
    unique_path_excluding(candidate, &HashSet::new())
}

/// Like [`unique_path`], but also treats every name in `claimed` as taken.
///
/// A batch resolves all of its destinations up front, before any file is
/// written, so two items with the same name must not both see "free".
/// `claimed` holds [`claim_key`]s of names in the candidate's directory.
pub fn unique_path_excluding(candidate: &Path, claimed: &HashSet<String>) -> PathBuf {
    let taken = |p: &Path| p.exists() || claimed.contains(&claim_key(p));

    if !taken(candidate) {
        return candidate.to_path_buf();
    }

    let mut n: u64 = 1;
    loop {
        let next = with_counter(candidate, n);
        if !taken(&next) {
            return next;
        }
        n += 1;
    }
}

/// Key under which a destination is claimed within one batch.
///
/// The lowercased file name, so `Report.pdf` and `report.pdf` collide as they
/// do on case-insensitive filesystems.
pub fn claim_key(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// `dir/stem.ext` -> `dir/stem(n).ext`
fn with_counter(path: &Path, n: u64) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("file"));

    let mut name = stem;
    name.push(format!("({n})"));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// Make a remote file name safe to join onto the download directory.
///
/// Path separators, reserved characters and control characters become `_`,
/// leading dots are dropped so the name can neither be `..` nor hidden, and
/// overlong names are cut while keeping the extension.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').trim_end_matches([' ', '.']);
    if cleaned.is_empty() {
        return "file".to_string();
    }

    if cleaned.len() <= MAX_NAME_BYTES {
        return cleaned.to_string();
    }

    // Keep the extension when truncating.
    let path = Path::new(cleaned);
    match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(ext)) if ext.len() < MAX_EXT_BYTES => {
            let stem = truncate_bytes(stem, MAX_NAME_BYTES - ext.len() - 1);
            format!("{stem}.{ext}")
        }
        _ => truncate_bytes(cleaned, MAX_NAME_BYTES).to_string(),
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
