//! Path identity policies
//!
//! The catalog matches files to records by path. Whether `A.MP4` and `a.mp4`
//! name the same clip depends on the filesystem, so the comparison is a
//! strategy. [`CaseInsensitive`] is the default and matches how existing
//! catalogs were built.

use std::fmt::Debug;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Lexically normalize a path: drop `.` components, collapse repeated and
/// trailing separators, and fold `..` into its parent. The filesystem is not
/// consulted, so symlinks are left as written.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            other => normalized.push(other),
        }
    }

    normalized
}

/// Maps a path to the key used for identity comparisons
pub trait PathIdentity: Send + Sync + Debug {
    /// Normalized comparison key for `path`
    fn key(&self, path: &str) -> String;

    /// Whether two paths name the same clip
    fn same(&self, a: &str, b: &str) -> bool {
        self.key(a) == self.key(b)
    }
}

/// Paths are equal when they differ only by letter case or spelling
/// (`/v/./a.mp4`, `/v//a.mp4`)
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitive;

impl PathIdentity for CaseInsensitive {
    fn key(&self, path: &str) -> String {
        normalize_path(Path::new(path)).to_string_lossy().to_lowercase()
    }
}

/// Normalized paths are compared byte-for-byte
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseSensitive;

impl PathIdentity for CaseSensitive {
    fn key(&self, path: &str) -> String {
        normalize_path(Path::new(path)).to_string_lossy().to_string()
    }
}

/// Pick the identity policy for a configuration flag
pub fn identity_for(case_sensitive: bool) -> Arc<dyn PathIdentity> {
    if case_sensitive {
        Arc::new(CaseSensitive)
    } else {
        Arc::new(CaseInsensitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_windows_style() {
        assert!(CaseInsensitive.same(r"C:\V\a.mp4", r"c:\v\A.MP4"));
        assert!(!CaseInsensitive.same("/v/a.mp4", "/v/b.mp4"));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!CaseSensitive.same("/v/a.mp4", "/v/A.mp4"));
        assert!(CaseSensitive.same("/v/a.mp4", "/v/a.mp4"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/videos/./bjj/")), PathBuf::from("/videos/bjj"));
        assert_eq!(normalize_path(Path::new("/videos//bjj")), PathBuf::from("/videos/bjj"));
        assert_eq!(normalize_path(Path::new("/videos/gi/../bjj")), PathBuf::from("/videos/bjj"));
        assert_eq!(normalize_path(Path::new("/../videos")), PathBuf::from("/videos"));
        assert_eq!(normalize_path(Path::new("../videos")), PathBuf::from("../videos"));
    }

    #[test]
    fn test_equivalent_spellings_share_a_key() {
        for identity in [identity_for(false), identity_for(true)] {
            assert!(identity.same("/videos/bjj/armbar.mp4", "/videos/./bjj//armbar.mp4"));
            assert_eq!(identity.key("/videos/bjj/"), identity.key("/videos/bjj"));
        }
    }

    #[test]
    fn test_identity_for_flag() {
        assert_eq!(identity_for(false).key("/V/X.mp4"), "/v/x.mp4");
        assert_eq!(identity_for(true).key("/V/X.mp4"), "/V/X.mp4");
    }
}
