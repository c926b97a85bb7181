//! Recursive discovery of video files under a root directory

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Video extensions picked up by the scanner (compared case-insensitively)
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "webm", "mov", "avi", "ogg"];

/// Check if a path carries one of the supported video extensions
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.iter().any(|candidate| ext.eq_ignore_ascii_case(candidate)))
        .unwrap_or(false)
}

/// What a scan found
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    /// Video files, sorted
    pub files: Vec<PathBuf>,

    /// Directories or entries that could not be read and were skipped
    pub skipped: Vec<PathBuf>,

    /// Whether the scan was stopped before the tree was exhausted
    pub interrupted: bool,
}

/// Walks a directory tree collecting video files.
///
/// Unreadable directories are logged and skipped; the scan carries on with
/// the rest of the tree. The caller is responsible for validating the root.
#[derive(Debug, Clone, Default)]
pub struct DirectoryScanner {
    follow_links: bool,
}

impl DirectoryScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow symbolic links while walking. Link cycles are reported by the
    /// walker as errors and skipped like any unreadable directory.
    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Scan the whole tree under `root`
    pub fn scan(&self, root: &Path) -> ScanOutcome {
        self.scan_until(root, || false)
    }

    /// Scan under `root`, checking `should_stop` before each entry
    pub fn scan_until<F>(&self, root: &Path, mut should_stop: F) -> ScanOutcome
    where
        F: FnMut() -> bool,
    {
        let mut outcome = ScanOutcome::default();

        let walker = WalkDir::new(root)
            .follow_links(self.follow_links)
            .sort_by_file_name();

        for entry in walker {
            if should_stop() {
                warn!("⏹️ Scan of {} stopped early", root.display());
                outcome.interrupted = true;
                break;
            }

            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && is_video_file(path) {
                        outcome.files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let skipped = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    warn!("Skipping unreadable path {}: {}", skipped.display(), e);
                    outcome.skipped.push(skipped);
                }
            }
        }

        outcome.files.sort();
        debug!(
            "🔍 Scanned {}: {} videos, {} skipped",
            root.display(),
            outcome.files.len(),
            outcome.skipped.len()
        );

        outcome
    }
}
