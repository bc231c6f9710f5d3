//! Static file-type categories used by the attachment filter.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::TgdlError;
use crate::i18n;

/// A user-facing file type grouping a fixed set of extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Images,
    Videos,
    Audio,
    Documents,
    Archives,
}

impl FileCategory {
    /// Every category, in display order.
    pub const ALL: [FileCategory; 5] = [
        Self::Images,
        Self::Videos,
        Self::Audio,
        Self::Documents,
        Self::Archives,
    ];

    /// Lowercase extensions (with leading dot) belonging to this category.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Images => &[
                ".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".heic", ".tiff",
            ],
            Self::Videos => &[
                ".mp4", ".mkv", ".avi", ".mov", ".webm", ".flv", ".wmv", ".m4v",
            ],
            Self::Audio => &[".mp3", ".flac", ".wav", ".ogg", ".m4a", ".aac", ".opus"],
            Self::Documents => &[
                ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".txt", ".epub",
                ".md", ".csv",
            ],
            Self::Archives => &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz"],
        }
    }

    /// Stable machine name, as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Videos => "videos",
            Self::Audio => "audio",
            Self::Documents => "documents",
            Self::Archives => "archives",
        }
    }

    /// Localized label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Self::Images => i18n::cat_images(),
            Self::Videos => i18n::cat_videos(),
            Self::Audio => i18n::cat_audio(),
            Self::Documents => i18n::cat_documents(),
            Self::Archives => i18n::cat_archives(),
        }
    }

    /// The category an extension (with leading dot) belongs to.
    pub fn of_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.extensions().contains(&ext.as_str()))
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FileCategory {
    type Err = TgdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "images" | "image" | "img" | "photos" | "图片" => Ok(Self::Images),
            "videos" | "video" | "视频" => Ok(Self::Videos),
            "audio" | "music" | "音频" => Ok(Self::Audio),
            "documents" | "document" | "docs" | "文档" => Ok(Self::Documents),
            "archives" | "archive" | "压缩包" => Ok(Self::Archives),
            _ => Err(TgdlError::UnknownCategory(s.to_string())),
        }
    }
}

/// Union of the extension sets of every enabled category.
pub fn allowed_extensions<I>(enabled: I) -> HashSet<String>
where
    I: IntoIterator<Item = FileCategory>,
{
    enabled
        .into_iter()
        .flat_map(|c| c.extensions().iter().map(|e| e.to_string()))
        .collect()
}
