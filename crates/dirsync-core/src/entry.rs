//! Filesystem entries as seen by the differ

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use dirsync_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

/// One of the two compared trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// What an entry is, after following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// A file or directory under one of the roots.
///
/// `path` is absolute. Ordering and matching use only the final name
/// segment, see [`Entry::name`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl Entry {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, EntryKind::File)
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::new(path, EntryKind::Directory)
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// The final path segment; the merge sort key.
    pub fn name(&self) -> &OsStr {
        self.path.file_name().unwrap_or_default()
    }

    /// Path relative to `root` with forward slashes, for display.
    ///
    /// Lossy for names that are not UTF-8; never join it back onto a root.
    /// Falls back to the full path when the entry is not under `root`.
    pub fn relative_to(&self, root: &Path) -> NormalizedPath {
        NormalizedPath::relative(&self.path, root).unwrap_or_else(|| NormalizedPath::new(&self.path))
    }
}

/// Entries present on one side only, in walk order.
pub type SideDiff = Vec<Entry>;
