//! Filesystem view of a scanned video file

use crate::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A video file as seen on disk during one scan. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSystemEntry {
    /// Absolute path to the video file
    pub path: PathBuf,

    /// Size in bytes
    pub size_bytes: u64,

    /// Last modification time, when the platform reports one
    pub modified: Option<DateTime<Utc>>,
}

impl FileSystemEntry {
    /// Stat a file and capture its size and modification time
    pub fn stat(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(CoreError::Path(format!("Not a regular file: {}", path.display())));
        }

        Ok(Self {
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    /// Parent directory of the file
    pub fn directory(&self) -> Option<&Path> {
        self.path.parent()
    }
}
