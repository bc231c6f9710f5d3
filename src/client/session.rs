//! The persisted login session.

use std::path::{Path, PathBuf};

use crate::error::{Result, TgdlError};

/// Path of the session file written by `tgdl login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve from an explicit override or the standard data directory.
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self> {
        explicit
            .or_else(crate::config::session_file_path)
            .map(Self::new)
            .ok_or_else(|| TgdlError::Config("could not determine session file path".to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// The session path, or an authentication error when no login happened yet.
    pub fn require(&self) -> Result<&Path> {
        if self.exists() {
            Ok(&self.path)
        } else {
            tracing::warn!(path = %self.path.display(), "Session file missing");
            Err(TgdlError::SessionMissing(self.path.clone()))
        }
    }

    /// Make sure the parent directory exists before a login writes the file.
    pub fn prepare_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TgdlError::io(parent, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_missing_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionFile::new(dir.path().join("tg.session"));
        let err = session.require().unwrap_err();
        assert!(err.is_auth_error());
    }

    #[test]
    fn test_require_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tg.session");
        std::fs::write(&path, b"x").unwrap();
        let session = SessionFile::new(&path);
        assert_eq!(session.require().unwrap(), path.as_path());
    }

    #[test]
    fn test_directory_is_not_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionFile::new(dir.path());
        assert!(session.require().is_err());
    }

    #[test]
    fn test_prepare_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionFile::new(dir.path().join("a").join("b").join("tg.session"));
        session.prepare_dir().unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }
}
