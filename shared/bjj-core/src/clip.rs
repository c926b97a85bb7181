//! Clip records as stored in the catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Catalog-assigned clip identifier
pub type ClipId = i64;

/// Where the media backing a clip lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// A video file on local disk; `location_key` is its absolute path
    Local,

    /// A reference to a hosted video (e.g. a video-hosting id or URL)
    Remote,
}

/// A clip as persisted in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRecord {
    /// Stable identifier assigned by the catalog
    pub id: ClipId,

    pub storage: StorageKind,

    /// Absolute file path for local clips, remote reference otherwise
    pub location_key: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Duration in seconds (0 until probed)
    #[serde(default)]
    pub duration_seconds: f64,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Thumbnail image reference, if one was generated
    #[serde(default)]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub favorite: bool,

    pub created_at: DateTime<Utc>,
}

impl ClipRecord {
    /// Whether this record is backed by a file on disk
    pub fn is_local(&self) -> bool {
        self.storage == StorageKind::Local
    }

    /// Build the stored record from an insert request and its assigned id
    pub fn from_new(id: ClipId, clip: NewClip) -> Self {
        Self {
            id,
            storage: clip.storage,
            location_key: clip.location_key,
            title: clip.title,
            description: clip.description,
            duration_seconds: clip.duration_seconds,
            tags: clip.tags,
            thumbnail: None,
            favorite: false,
            created_at: Utc::now(),
        }
    }
}

/// Insert request for a clip that has no identifier yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClip {
    pub storage: StorageKind,
    pub location_key: String,
    pub title: String,
    pub description: String,
    pub duration_seconds: f64,
    pub tags: Vec<String>,
}

impl NewClip {
    /// Local clip discovered on disk: titled after the file stem, empty
    /// description, duration left at 0 (not probed during sync).
    pub fn local(path: &Path) -> Self {
        Self {
            storage: StorageKind::Local,
            location_key: path.to_string_lossy().to_string(),
            title: title_from_path(path),
            description: String::new(),
            duration_seconds: 0.0,
            tags: Vec::new(),
        }
    }

    /// Remote clip referencing a hosted video
    pub fn remote(reference: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            storage: StorageKind::Remote,
            location_key: reference.into(),
            title: title.into(),
            description: String::new(),
            duration_seconds: 0.0,
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Filename without extension, used as the default clip title
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
