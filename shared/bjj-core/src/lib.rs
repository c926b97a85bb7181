//! BJJ Core - Shared clip catalog data structures and filesystem scanning

pub mod clip;
pub mod entry;
pub mod identity;
pub mod scanner;

pub use clip::{ClipId, ClipRecord, NewClip, StorageKind};
pub use entry::FileSystemEntry;
pub use identity::{identity_for, normalize_path, CaseInsensitive, CaseSensitive, PathIdentity};
pub use scanner::{is_video_file, DirectoryScanner, ScanOutcome, VIDEO_EXTENSIONS};

/// Result type for BJJ Core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Error types for BJJ Core operations
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path error: {0}")]
    Path(String),
}
