//! JWalk-based accelerator backend.
//!
//! Uses jwalk's rayon-backed traversal restricted to a single directory
//! level. Metadata stats are parallelized across the pool, which is what
//! makes this faster than the portable backend on large directories.

use std::fs;
use std::path::Path;
use std::time::Duration;

use jwalk::{Parallelism, WalkDir};
use tracing::debug;

use skiff_core::{Entry, ScanError};

use crate::backend::{Backend, ScanControl, entry_from_metadata};

/// Accelerator backend using jwalk for parallel metadata collection.
///
/// Reports an unknown progress total: entries stream out of the pool as
/// they are stat'ed.
#[derive(Debug, Default)]
pub struct JwalkBackend;

impl JwalkBackend {
    /// Create the jwalk backend.
    pub fn new() -> Self {
        Self
    }

    fn scan_inner(
        &self,
        path: &Path,
        limit: Option<usize>,
        control: &ScanControl,
    ) -> Result<Vec<Entry>, ScanError> {
        // jwalk reports root errors as stream items; check the root up
        // front so missing/unreadable directories fail crisply.
        let root_metadata = fs::metadata(path).map_err(|e| ScanError::io(path, e))?;
        if !root_metadata.is_dir() {
            return Err(ScanError::Io {
                path: path.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }

        let walker = WalkDir::new(path)
            .parallelism(Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            })
            .skip_hidden(false)
            .follow_links(false)
            .min_depth(1)
            .max_depth(1);

        let mut entries = Vec::new();

        for item in walker {
            if control.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            if let Some(max) = limit {
                if entries.len() >= max {
                    break;
                }
            }

            let item = match item {
                Ok(item) => item,
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            let metadata = match item.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    debug!(path = %item.path().display(), error = %err, "skipping entry without metadata");
                    continue;
                }
            };

            let name = item.file_name().to_string_lossy().to_string();
            entries.push(entry_from_metadata(&name, &metadata));
            control.record_entry();
        }

        Ok(entries)
    }
}

impl Backend for JwalkBackend {
    fn id(&self) -> &'static str {
        "jwalk"
    }

    fn scan(&self, path: &Path, control: &ScanControl) -> Result<Vec<Entry>, ScanError> {
        self.scan_inner(path, None, control)
    }

    fn scan_limited(
        &self,
        path: &Path,
        max: usize,
        control: &ScanControl,
    ) -> Result<Vec<Entry>, ScanError> {
        self.scan_inner(path, Some(max), control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ReadDirBackend;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub/inner.txt"), "deep").unwrap();
        fs::write(root.join("a.txt"), "aaa").unwrap();
        fs::write(root.join(".env"), "secret").unwrap();

        temp
    }

    #[test]
    fn test_matches_portable_backend() {
        let temp = create_test_dir();

        let jwalk_entries = JwalkBackend::new()
            .scan(temp.path(), &ScanControl::new())
            .unwrap();
        let portable_entries = ReadDirBackend::new()
            .scan(temp.path(), &ScanControl::new())
            .unwrap();

        let mut a: Vec<_> = jwalk_entries.iter().map(|e| e.name.clone()).collect();
        let mut b: Vec<_> = portable_entries.iter().map(|e| e.name.clone()).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_level_only() {
        let temp = create_test_dir();
        let entries = JwalkBackend::new()
            .scan(temp.path(), &ScanControl::new())
            .unwrap();
        assert!(!entries.iter().any(|e| e.name.as_str() == "inner.txt"));
    }

    #[test]
    fn test_total_stays_unknown() {
        let temp = create_test_dir();
        let control = ScanControl::new();
        JwalkBackend::new().scan(temp.path(), &control).unwrap();
        assert_eq!(control.progress().total, 0);
        assert_eq!(control.progress().current, 3);
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let err = JwalkBackend::new()
            .scan(Path::new("/nonexistent/skiff-test"), &ScanControl::new())
            .unwrap_err();
        assert!(matches!(err, ScanError::NotFound { .. }));
    }

    #[test]
    fn test_limited() {
        let temp = create_test_dir();
        let entries = JwalkBackend::new()
            .scan_limited(temp.path(), 2, &ScanControl::new())
            .unwrap();
        assert!(entries.len() <= 2);
    }
}
