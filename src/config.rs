//! Application configuration.
//!
//! A single flat TOML record holding the API credentials, the download
//! directory and a few tuning knobs. The file is looked up at:
//! 1. `--config <PATH>` on the command line
//! 2. `$TGDL_CONFIG` (environment variable)
//! 3. `~/.config/tgdl/config.toml` (Linux), the platform config dir elsewhere
//!
//! A missing file means "unconfigured" and is not an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TgdlError};

/// Number of simultaneous transfers when the config does not say otherwise.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Number of recent messages scanned per chat.
pub const DEFAULT_MESSAGE_LIMIT: usize = 200;

/// The persisted configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Numeric API id from my.telegram.org.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_id: Option<i32>,
    /// API hash paired with `api_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_hash: Option<String>,
    /// Where downloaded files are written. Defaults to the working directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
    /// Maximum simultaneous transfers in one batch.
    pub concurrency: usize,
    /// Messages scanned per chat when listing attachments.
    pub message_limit: usize,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// UI language ("en" or "zh"). Falls back to the system locale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_id: None,
            api_hash: None,
            download_dir: None,
            concurrency: DEFAULT_CONCURRENCY,
            message_limit: DEFAULT_MESSAGE_LIMIT,
            log_level: "warn".to_string(),
            lang: None,
        }
    }
}

/// Validated credentials needed to open a platform session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_id: i32,
    pub api_hash: String,
    pub download_dir: PathBuf,
}

impl Config {
    /// Build a fresh record right after a successful login.
    pub fn with_credentials(api_id: i32, api_hash: impl Into<String>, download_dir: PathBuf) -> Self {
        Self {
            api_id: Some(api_id),
            api_hash: Some(api_hash.into()),
            download_dir: Some(download_dir),
            ..Self::default()
        }
    }

    /// Extract and validate the credential fields.
    pub fn credentials(&self) -> Result<Credentials> {
        let api_id = self.api_id.ok_or_else(|| {
            TgdlError::Config("api_id is not set; run `tgdl login` first".to_string())
        })?;
        if api_id <= 0 {
            return Err(TgdlError::Config(format!("api_id must be positive, got {api_id}")));
        }
        let api_hash = self
            .api_hash
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                TgdlError::Config("api_hash is not set; run `tgdl login` first".to_string())
            })?;

        Ok(Credentials {
            api_id,
            api_hash: api_hash.to_string(),
            download_dir: self.download_dir(),
        })
    }

    /// The configured download directory, or the working directory.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Transfer concurrency, never below one.
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Reads and writes the config record at one fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the store location from an explicit override or the standard places.
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self> {
        explicit
            .or_else(config_file_path)
            .map(Self::new)
            .ok_or_else(|| TgdlError::Config("could not determine config file path".to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record. A missing file yields `Ok(None)`.
    pub fn load(&self) -> Result<Option<Config>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No config file");
                return Ok(None);
            }
            Err(e) => return Err(TgdlError::io(&self.path, e)),
        };

        let cfg = toml::from_str::<Config>(&contents).map_err(|e| {
            TgdlError::Config(format!("{} is not valid: {e}", self.path.display()))
        })?;
        tracing::info!(path = %self.path.display(), "Loaded config");
        Ok(Some(cfg))
    }

    /// Load the record, falling back to defaults when the file is absent.
    pub fn load_or_default(&self) -> Result<Config> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Persist the record with write-then-rename so a crash never leaves a
    /// truncated file behind.
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TgdlError::io(parent, e))?;
        }

        let contents = toml::to_string_pretty(config)
            .map_err(|e| TgdlError::Config(format!("cannot serialize config: {e}")))?;

        let tmp = temp_path(&self.path);
        write_owner_only(&tmp, &contents).map_err(|e| TgdlError::io(&tmp, e))?;

        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(TgdlError::io(&self.path, e));
        }
        tracing::info!(path = %self.path.display(), "Saved config");
        Ok(())
    }
}

/// Sibling path used while a save is in progress.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "config.toml".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` so that other users can never read them, not even while
/// the file is being written. The record holds the API secret.
#[cfg(unix)]
fn write_owner_only(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; a leftover temp file keeps its own.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_owner_only(path: &Path, contents: &str) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

// ── Standard locations ──────────────────────────────────────────

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("TGDL_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("tgdl").join("config.toml"))
}

/// Determine the session file path (checking env var first, then the data dir).
pub fn session_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("TGDL_SESSION") {
        return Some(PathBuf::from(env_path));
    }
    dirs::data_dir().map(|d| d.join("tgdl").join("tgdl.session"))
}

/// Return the cache directory used for logs.
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tgdl")
}

/// Return the log file path.
pub fn log_file_path() -> PathBuf {
    cache_dir().join("tgdl.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.concurrency, 5);
        assert_eq!(cfg.message_limit, 200);
        assert_eq!(cfg.log_level, "warn");
        assert!(cfg.api_id.is_none());
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.toml"));
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.load_or_default().unwrap(), Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nested").join("config.toml"));
        let cfg = Config::with_credentials(12345, "abcdef", PathBuf::from("/data/tg"));
        store.save(&cfg).unwrap();

        let loaded = store.load().unwrap().expect("config present");
        assert_eq!(loaded, cfg);
        assert!(!dir.path().join("nested").join("config.toml.tmp").exists());
    }

    #[test]
    fn test_save_replaces_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.toml"));
        let mut cfg = Config::with_credentials(1, "hash", PathBuf::from("/a"));
        store.save(&cfg).unwrap();
        cfg.download_dir = Some(PathBuf::from("/b"));
        store.save(&cfg).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.download_dir, Some(PathBuf::from("/b")));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.toml"));
        store.save(&Config::default()).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_leftover_world_readable_temp_file_is_locked_down() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.toml"));
        let tmp = temp_path(store.path());
        std::fs::write(&tmp, "stale").unwrap();
        std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o644)).unwrap();

        write_owner_only(&tmp, "api_hash = \"secret\"\n").unwrap();
        let mode = std::fs::metadata(&tmp).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&tmp).unwrap(), "api_hash = \"secret\"\n");

        let config = Config::with_credentials(7, "secret", dir.path().to_path_buf());
        store.save(&config).unwrap();
        assert!(!tmp.exists());
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
api_id = 42
api_hash = "deadbeef"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.api_id, Some(42));
        assert_eq!(cfg.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(cfg.message_limit, DEFAULT_MESSAGE_LIMIT);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_id = \"not a number\"").unwrap();
        let err = ConfigStore::new(&path).load().unwrap_err();
        assert!(matches!(err, TgdlError::Config(_)));
    }

    #[test]
    fn test_credentials_validation() {
        assert!(matches!(
            Config::default().credentials(),
            Err(TgdlError::Config(_))
        ));

        let mut cfg = Config::with_credentials(7, "  ", PathBuf::from("/x"));
        assert!(cfg.credentials().is_err());

        cfg.api_hash = Some("hash".to_string());
        cfg.api_id = Some(0);
        assert!(cfg.credentials().is_err());

        cfg.api_id = Some(7);
        let creds = cfg.credentials().unwrap();
        assert_eq!(creds.api_id, 7);
        assert_eq!(creds.api_hash, "hash");
        assert_eq!(creds.download_dir, PathBuf::from("/x"));
    }

    #[test]
    fn test_concurrency_never_zero() {
        let cfg = Config {
            concurrency: 0,
            ..Config::default()
        };
        assert_eq!(cfg.concurrency(), 1);
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path(Path::new("/etc/tgdl/config.toml"));
        assert_eq!(tmp, PathBuf::from("/etc/tgdl/config.toml.tmp"));
    }
}
