//! Directory entry types.

use std::time::SystemTime;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Kind of directory entry.
///
/// `Executable` is its own kind rather than a flag on `File`: native
/// backends hand entries across their call boundary as a small integer
/// type tag, and the tag space is exactly these four values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular, non-executable file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link (never followed during a scan).
    Symlink,
    /// Regular file with an execute bit set.
    Executable,
}

impl EntryKind {
    /// Check if this is a directory.
    pub fn is_dir(self) -> bool {
        matches!(self, EntryKind::Directory)
    }

    /// Check if this is a regular file (executable or not).
    pub fn is_file(self) -> bool {
        matches!(self, EntryKind::File | EntryKind::Executable)
    }

    /// Check if this is a symlink.
    pub fn is_symlink(self) -> bool {
        matches!(self, EntryKind::Symlink)
    }

    /// Stable text label, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
            EntryKind::Symlink => "symlink",
            EntryKind::Executable => "executable",
        }
    }

    /// Small integer tag used when marshalling entries across a native
    /// backend boundary.
    pub fn tag(self) -> u8 {
        match self {
            EntryKind::File => 0,
            EntryKind::Directory => 1,
            EntryKind::Symlink => 2,
            EntryKind::Executable => 3,
        }
    }

    /// Inverse of [`EntryKind::tag`]. Unknown tags are `None`.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(EntryKind::File),
            1 => Some(EntryKind::Directory),
            2 => Some(EntryKind::Symlink),
            3 => Some(EntryKind::Executable),
            _ => None,
        }
    }
}

/// One immediate child of a scanned directory.
///
/// An `Entry` is a snapshot taken at scan time; nothing re-validates it
/// against the filesystem afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// File name (not the full path).
    pub name: CompactString,

    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: EntryKind,

    /// Size in bytes. Always 0 for directories.
    pub size: u64,

    /// Last modification time.
    #[serde(rename = "mtime", with = "unix_seconds")]
    pub modified: SystemTime,

    /// Whether the name starts with a dot.
    pub hidden: bool,
}

impl Entry {
    /// Create an entry. `hidden` is derived from the name.
    pub fn new(
        name: impl Into<CompactString>,
        kind: EntryKind,
        size: u64,
        modified: SystemTime,
    ) -> Self {
        let name = name.into();
        let hidden = name.starts_with('.');
        Self {
            name,
            kind,
            size: if kind.is_dir() { 0 } else { size },
            modified,
            hidden,
        }
    }

    /// Check if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Serialize `SystemTime` as whole seconds since the Unix epoch.
mod unix_seconds {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
        let secs = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        secs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SystemTime, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_secs(secs))
    }
}
