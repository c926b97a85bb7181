use bjj_core::normalize_path;
use std::path::{Path, PathBuf};

/// Reasons a root folder is rejected before any scanning
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RootPathError {
    #[error("root folder path is required")]
    Empty,

    #[error("root folder path must be an absolute path")]
    NotAbsolute,

    #[error("root folder does not exist")]
    NotFound,
}

/// Check a root folder path: non-empty, then absolute, then an existing
/// directory. Returns the lexically normalized root.
pub fn validate_root(root: &str) -> Result<PathBuf, RootPathError> {
    if root.trim().is_empty() {
        return Err(RootPathError::Empty);
    }

    let path = Path::new(root);
    if !path.is_absolute() {
        return Err(RootPathError::NotAbsolute);
    }

    if !path.is_dir() {
        return Err(RootPathError::NotFound);
    }

    Ok(normalize_path(path))
}
