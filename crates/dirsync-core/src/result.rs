//! The outcome of comparing two trees

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use dirsync_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};

use crate::entry::{Entry, Side, SideDiff};
use crate::{Error, Result};

/// Two same-named files whose contents differ.
///
/// Sizes are those observed while diffing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDiffPair {
    pub left: Entry,
    pub right: Entry,
    pub left_size: u64,
    pub right_size: u64,
}

impl ContentDiffPair {
    pub fn entry(&self, side: Side) -> &Entry {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// The side holding the bigger file, `None` when sizes match.
    pub fn larger_side(&self) -> Option<Side> {
        match self.left_size.cmp(&self.right_size) {
            Ordering::Greater => Some(Side::Left),
            Ordering::Less => Some(Side::Right),
            Ordering::Equal => None,
        }
    }
}

/// A failure the walk recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkIssue {
    pub path: PathBuf,
    pub message: String,
}

/// Point-in-time comparison of two directory trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub left_root: PathBuf,
    pub right_root: PathBuf,
    /// Present on the left, absent on the right
    pub left_only: SideDiff,
    /// Present on the right, absent on the left
    pub right_only: SideDiff,
    pub content_diffs: Vec<ContentDiffPair>,
    /// Unreadable directories and files skipped during the walk
    #[serde(default)]
    pub errors: Vec<WalkIssue>,
}

impl DiffResult {
    /// Create an empty result for two roots.
    ///
    /// Both roots are resolved to absolute form and must be existing
    /// directories.
    pub fn new(left: &Path, right: &Path) -> Result<Self> {
        Ok(Self::empty(
            resolve_root(left, Side::Left)?,
            resolve_root(right, Side::Right)?,
        ))
    }

    /// Create an empty result for roots that are already resolved.
    pub(crate) fn empty(left_root: PathBuf, right_root: PathBuf) -> Self {
        Self {
            left_root,
            right_root,
            left_only: Vec::new(),
            right_only: Vec::new(),
            content_diffs: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn root(&self, side: Side) -> &Path {
        match side {
            Side::Left => &self.left_root,
            Side::Right => &self.right_root,
        }
    }

    /// Entries present only on `side`.
    pub fn only(&self, side: Side) -> &[Entry] {
        match side {
            Side::Left => &self.left_only,
            Side::Right => &self.right_only,
        }
    }

    /// `entry` expressed relative to the root of `side`.
    pub fn relative(&self, side: Side, entry: &Entry) -> NormalizedPath {
        entry.relative_to(self.root(side))
    }

    /// True when the trees matched completely.
    pub fn is_empty(&self) -> bool {
        self.left_only.is_empty() && self.right_only.is_empty() && self.content_diffs.is_empty()
    }

    /// Number of differences of any kind.
    pub fn difference_count(&self) -> usize {
        self.left_only.len() + self.right_only.len() + self.content_diffs.len()
    }
}

/// Resolve a root and check that it is an existing directory.
pub fn resolve_root(path: &Path, side: Side) -> Result<PathBuf> {
    let resolved = io::resolve(path).map_err(|e| Error::InvalidRoot {
        side,
        path: path.to_path_buf(),
        reason: match e {
            dirsync_fs::Error::Io { source, .. } => source.to_string(),
            other => other.to_string(),
        },
    })?;

    if !resolved.is_dir() {
        return Err(Error::InvalidRoot {
            side,
            path: resolved,
            reason: "not a directory".to_string(),
        });
    }

    Ok(resolved)
}
