//! Tree differ
//!
//! Walks two directory trees in lock-step. At every level the children of
//! both sides are split into files and directories, sorted by name, and
//! merged with two cursors:
//!
//! - equal names: files go to the [`ContentClassifier`], directories are
//!   queued for descent
//! - the smaller name exists on one side only and is recorded there
//!
//! Files are merged before directories, and matched directories are
//! descended into in name order after the whole level is done. The
//! resulting order is fully determined by the tree contents.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::classifier::ContentClassifier;
use crate::entry::{Entry, EntryKind};
use crate::error::DirectoryReadError;
use crate::progress::{CancelToken, NoProgress, Phase, Progress};
use crate::result::{ContentDiffPair, DiffResult, WalkIssue};
use crate::settings::Settings;
use crate::{Error, Result};

/// Direct children of one directory, split and sorted by name.
#[derive(Debug, Default)]
pub struct DirEntries {
    pub files: Vec<Entry>,
    pub dirs: Vec<Entry>,
}

impl DirEntries {
    pub fn len(&self) -> usize {
        self.files.len() + self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// List the direct children of `dir`.
///
/// Symlinks are followed. Children that are neither files nor
/// directories, or whose metadata cannot be read, are left out.
pub fn read_dir_entries(dir: &Path) -> std::result::Result<DirEntries, DirectoryReadError> {
    let to_error = |source| DirectoryReadError {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = DirEntries::default();
    for child in fs::read_dir(dir).map_err(to_error)? {
        let path = child.map_err(to_error)?.path();
        match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => entries.dirs.push(Entry::new(path, EntryKind::Directory)),
            Ok(meta) if meta.is_file() => entries.files.push(Entry::new(path, EntryKind::File)),
            Ok(_) => tracing::debug!(path = %path.display(), "Ignoring special file"),
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "Ignoring unreadable entry"),
        }
    }

    entries.files.sort_by(|a, b| a.name().cmp(b.name()));
    entries.dirs.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(entries)
}

/// Count every entry below `root`, for progress totals.
///
/// Symlinks are followed like in the walk itself. Unreadable directories
/// count as empty.
pub fn count_items(root: &Path) -> u64 {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() || entry.file_type().is_dir())
        .count() as u64
}

/// Computes a [`DiffResult`] for two directory trees.
pub struct TreeDiffer {
    classifier: ContentClassifier,
    progress: Arc<dyn Progress>,
    cancel: CancelToken,
    count_total: bool,
}

impl Default for TreeDiffer {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl TreeDiffer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            classifier: ContentClassifier::new(settings),
            progress: Arc::new(NoProgress),
            cancel: CancelToken::new(),
            count_total: false,
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Precount both trees so progress has a total.
    pub fn count_total(mut self, enabled: bool) -> Self {
        self.count_total = enabled;
        self
    }

    /// Compare the trees rooted at `left` and `right`.
    ///
    /// # Errors
    ///
    /// `InvalidRoot` if either root is not an existing directory,
    /// `Cancelled` if the cancel token fires during the walk. Unreadable
    /// subdirectories and files are recorded in [`DiffResult::errors`]
    /// instead of failing the walk.
    pub fn compare(&self, left: &Path, right: &Path) -> Result<DiffResult> {
        let result = DiffResult::new(left, right)?;
        self.walk(result)
    }

    /// Walk from already-resolved roots into an empty result.
    pub(crate) fn walk(&self, mut result: DiffResult) -> Result<DiffResult> {
        let total = if self.count_total {
            self.progress.start(Phase::Counting, None);
            let total = count_items(&result.left_root) + count_items(&result.right_root);
            self.progress.finish();
            Some(total)
        } else {
            None
        };
        self.progress.start(Phase::Comparing, total);

        let mut pending = vec![(result.left_root.clone(), result.right_root.clone())];
        while let Some((left, right)) = pending.pop() {
            if self.cancel.is_cancelled() {
                self.progress.finish();
                tracing::info!("Comparison cancelled");
                return Err(Error::Cancelled);
            }
            let matched = self.compare_level(&left, &right, &mut result);
            // Reversed so the first matched pair is popped first
            pending.extend(matched.into_iter().rev());
        }

        self.progress.finish();
        tracing::info!(
            left_only = result.left_only.len(),
            right_only = result.right_only.len(),
            content_diffs = result.content_diffs.len(),
            errors = result.errors.len(),
            "Comparison finished"
        );
        Ok(result)
    }

    /// Diff one directory level; returns matched subdirectory pairs.
    fn compare_level(
        &self,
        left: &Path,
        right: &Path,
        result: &mut DiffResult,
    ) -> Vec<(PathBuf, PathBuf)> {
        let left_entries = read_level(left, result);
        let right_entries = read_level(right, result);
        let (Some(left_entries), Some(right_entries)) = (left_entries, right_entries) else {
            return Vec::new();
        };

        self.merge(&left_entries.files, &right_entries.files, result, |l, r, result| {
            self.compare_files(l, r, result);
        });

        let mut matched = Vec::new();
        self.merge(&left_entries.dirs, &right_entries.dirs, result, |l, r, _| {
            matched.push((l.path.clone(), r.path.clone()));
        });
        matched
    }

    /// Sorted merge of one partition into `result`.
    fn merge(
        &self,
        left: &[Entry],
        right: &[Entry],
        result: &mut DiffResult,
        mut on_match: impl FnMut(&Entry, &Entry, &mut DiffResult),
    ) {
        let (mut i, mut j) = (0, 0);
        while i < left.len() && j < right.len() {
            match left[i].name().cmp(right[j].name()) {
                Ordering::Equal => {
                    on_match(&left[i], &right[j], result);
                    i += 1;
                    j += 1;
                    self.progress.advance(2);
                }
                Ordering::Less => {
                    result.left_only.push(left[i].clone());
                    i += 1;
                    self.progress.advance(1);
                }
                Ordering::Greater => {
                    result.right_only.push(right[j].clone());
                    j += 1;
                    self.progress.advance(1);
                }
            }
        }

        let rest = (left.len() - i) + (right.len() - j);
        result.left_only.extend_from_slice(&left[i..]);
        result.right_only.extend_from_slice(&right[j..]);
        self.progress.advance(rest as u64);
    }

    fn compare_files(&self, left: &Entry, right: &Entry, result: &mut DiffResult) {
        match self.classifier.compare(&left.path, &right.path) {
            Ok(comparison) if comparison.verdict.is_equal() => {
                tracing::trace!(path = %left.path.display(), verdict = ?comparison.verdict, "Files match");
            }
            Ok(comparison) => {
                tracing::debug!(path = %left.path.display(), verdict = ?comparison.verdict, "Contents differ");
                result.content_diffs.push(ContentDiffPair {
                    left: left.clone(),
                    right: right.clone(),
                    left_size: comparison.left_size,
                    right_size: comparison.right_size,
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping file pair that could not be compared");
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| left.path.clone());
                result.errors.push(WalkIssue {
                    path,
                    message: e.to_string(),
                });
            }
        }
    }
}

/// Read a directory, recording a failure in `result`.
fn read_level(dir: &Path, result: &mut DiffResult) -> Option<DirEntries> {
    match read_dir_entries(dir) {
        Ok(entries) => Some(entries),
        Err(e) => {
            tracing::warn!(error = %e, "Error while comparing directories");
            result.errors.push(WalkIssue {
                path: e.path.clone(),
                message: e.to_string(),
            });
            None
        }
    }
}
