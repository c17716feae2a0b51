//! Backend strategy: interchangeable directory traversal implementations.
//!
//! A backend lists the immediate children of one directory. The portable
//! [`ReadDirBackend`] is always available; accelerator backends live in
//! sibling modules and declare availability through a runtime probe.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::UNIX_EPOCH;

use tracing::debug;

use skiff_core::{Entry, EntryKind, ScanError};

use crate::progress::ScanProgress;

/// Entries a backend may process between cancellation checks.
pub(crate) const CANCEL_CHECK_INTERVAL: usize = 64;

/// Control block shared between a scanner and the backend running on its
/// worker. Carries the advisory cancellation flag and the progress
/// counters; callers only ever read snapshots of it.
#[derive(Debug, Default)]
pub struct ScanControl {
    cancelled: AtomicBool,
    current: AtomicU64,
    total: AtomicU64,
}

impl ScanControl {
    /// Create a fresh control block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Advisory: the backend observes it at bounded
    /// traversal intervals, never instantly.
    pub fn request_cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Publish the expected entry count, for backends that know it.
    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
    }

    /// Count one processed entry.
    pub fn record_entry(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the progress counters.
    pub fn progress(&self) -> ScanProgress {
        ScanProgress {
            current: self.current.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
        }
    }
}

/// One directory traversal strategy.
///
/// `scan` lists every immediate child of `path`; `scan_limited` stops
/// after the first `max` entries encountered, in whatever order the
/// backend happens to visit them.
pub trait Backend: Send + Sync {
    /// Stable identifier, as shown in the capability map.
    fn id(&self) -> &'static str;

    /// Runtime capability probe. Backends that compile everywhere and
    /// need nothing from the host report `true`.
    fn available(&self) -> bool {
        true
    }

    /// List every immediate child of `path`.
    fn scan(&self, path: &Path, control: &ScanControl) -> Result<Vec<Entry>, ScanError>;

    /// List at most `max` immediate children of `path`.
    fn scan_limited(
        &self,
        path: &Path,
        max: usize,
        control: &ScanControl,
    ) -> Result<Vec<Entry>, ScanError>;
}

/// Build an [`Entry`] from a name and the no-follow metadata of a child.
pub(crate) fn entry_from_metadata(name: &str, metadata: &fs::Metadata) -> Entry {
    Entry::new(
        name,
        kind_from_metadata(metadata),
        metadata.len(),
        metadata.modified().unwrap_or(UNIX_EPOCH),
    )
}

/// Classify no-follow metadata into an [`EntryKind`].
pub(crate) fn kind_from_metadata(metadata: &fs::Metadata) -> EntryKind {
    let file_type = metadata.file_type();
    if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_symlink() {
        EntryKind::Symlink
    } else if is_executable(metadata) {
        EntryKind::Executable
    } else {
        EntryKind::File
    }
}

/// Check if a file is executable (Unix).
#[cfg(unix)]
pub(crate) fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
pub(crate) fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}

/// Portable backend built on `std::fs::read_dir`.
///
/// Runs two passes so it can report a real progress total: a cheap name
/// pass to count children, then a metadata pass to build entries.
#[derive(Debug, Default)]
pub struct ReadDirBackend;

impl ReadDirBackend {
    /// Create the portable backend.
    pub fn new() -> Self {
        Self
    }

    fn scan_inner(
        &self,
        path: &Path,
        limit: Option<usize>,
        control: &ScanControl,
    ) -> Result<Vec<Entry>, ScanError> {
        // Counting pass. Skipped for limited scans, which leave the total
        // unknown rather than paying for a full directory read.
        if limit.is_none() {
            let count = fs::read_dir(path)
                .map_err(|e| ScanError::io(path, e))?
                .filter(|r| r.is_ok())
                .count();
            control.set_total(count as u64);
        }

        let read = fs::read_dir(path).map_err(|e| ScanError::io(path, e))?;
        let mut entries = Vec::new();

        for (index, item) in read.enumerate() {
            if index % CANCEL_CHECK_INTERVAL == 0 && control.is_cancelled() {
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
            // DirEntry::metadata does not follow symlinks.
            let metadata = match item.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    debug!(path = %item.path().display(), error = %err, "skipping entry without metadata");
                    continue;
                }
            };

            let name = item.file_name();
            entries.push(entry_from_metadata(&name.to_string_lossy(), &metadata));
            control.record_entry();
        }

        Ok(entries)
    }
}

impl Backend for ReadDirBackend {
    fn id(&self) -> &'static str {
        "portable"
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
    use std::fs;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();
        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("file2.txt"), "world world").unwrap();
        fs::write(root.join("file3.txt"), "!").unwrap();
        fs::write(root.join(".hidden"), "dot").unwrap();

        temp
    }

    #[test]
    fn test_scan_lists_immediate_children_only() {
        let temp = create_test_dir();
        fs::write(temp.path().join("dir1/nested.txt"), "deep").unwrap();

        let control = ScanControl::new();
        let entries = ReadDirBackend::new().scan(temp.path(), &control).unwrap();

        assert_eq!(entries.len(), 6);
        assert!(!entries.iter().any(|e| e.name.as_str() == "nested.txt"));
    }

    #[test]
    fn test_hidden_flag_matches_dot_prefix() {
        let temp = create_test_dir();
        let control = ScanControl::new();
        let entries = ReadDirBackend::new().scan(temp.path(), &control).unwrap();

        for entry in &entries {
            assert_eq!(entry.hidden, entry.name.starts_with('.'));
        }
        assert_eq!(entries.iter().filter(|e| e.hidden).count(), 1);
    }

    #[test]
    fn test_kinds_and_sizes() {
        let temp = create_test_dir();
        let control = ScanControl::new();
        let entries = ReadDirBackend::new().scan(temp.path(), &control).unwrap();

        let dir = entries.iter().find(|e| e.name.as_str() == "dir1").unwrap();
        assert_eq!(dir.kind, EntryKind::Directory);
        assert_eq!(dir.size, 0);

        let file = entries
            .iter()
            .find(|e| e.name.as_str() == "file1.txt")
            .unwrap();
        assert_eq!(file.kind, EntryKind::File);
        assert_eq!(file.size, 5);
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_kind() {
        use std::os::unix::fs::PermissionsExt;

        let temp = create_test_dir();
        let script = temp.path().join("run.sh");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let control = ScanControl::new();
        let entries = ReadDirBackend::new().scan(temp.path(), &control).unwrap();
        let entry = entries.iter().find(|e| e.name.as_str() == "run.sh").unwrap();
        assert_eq!(entry.kind, EntryKind::Executable);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_kind() {
        let temp = create_test_dir();
        std::os::unix::fs::symlink(temp.path().join("file1.txt"), temp.path().join("link"))
            .unwrap();

        let control = ScanControl::new();
        let entries = ReadDirBackend::new().scan(temp.path(), &control).unwrap();
        let entry = entries.iter().find(|e| e.name.as_str() == "link").unwrap();
        assert_eq!(entry.kind, EntryKind::Symlink);
    }

    #[test]
    fn test_scan_limited_stops_early() {
        let temp = create_test_dir();
        let control = ScanControl::new();
        let entries = ReadDirBackend::new()
            .scan_limited(temp.path(), 3, &control)
            .unwrap();
        assert!(entries.len() <= 3);
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let control = ScanControl::new();
        let err = ReadDirBackend::new()
            .scan(Path::new("/nonexistent/skiff-test"), &control)
            .unwrap_err();
        assert!(matches!(err, ScanError::NotFound { .. }));
    }

    #[test]
    fn test_portable_backend_reports_total() {
        let temp = create_test_dir();
        let control = ScanControl::new();
        ReadDirBackend::new().scan(temp.path(), &control).unwrap();

        let progress = control.progress();
        assert_eq!(progress.total, 6);
        assert_eq!(progress.current, 6);
    }

    #[test]
    fn test_pre_cancelled_control_aborts() {
        let temp = create_test_dir();
        let control = ScanControl::new();
        control.request_cancel();

        let err = ReadDirBackend::new().scan(temp.path(), &control).unwrap_err();
        assert_eq!(err, ScanError::Cancelled);
    }
}
