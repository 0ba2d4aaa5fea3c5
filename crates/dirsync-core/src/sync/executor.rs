//! SyncExecutor implementation
//!
//! Turns a [`DiffResult`] into filesystem operations. Roles are resolved
//! inside the call, so the same result can be applied in either
//! direction and is never modified.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use dirsync_fs::{SystemTrash, Trash, io};

use crate::entry::{Entry, Side};
use crate::progress::{CancelToken, NoProgress, Phase, Progress};
use crate::result::{ContentDiffPair, DiffResult};

use super::policy::SyncPolicy;
use super::report::{ActionCategory, Outcome, SkipReason, SyncAction, SyncReport};

/// One unit of work, borrowed from the diff.
enum Work<'a> {
    Remove(&'a Entry),
    Add(&'a Entry),
    Overwrite(&'a ContentDiffPair),
}

/// Source and destination sides for one run.
#[derive(Debug, Clone, Copy)]
struct Roles {
    source: Side,
    dest: Side,
}

impl Roles {
    fn for_policy(policy: &SyncPolicy) -> Self {
        let source = if policy.reverse_direction {
            Side::Right
        } else {
            Side::Left
        };
        Self {
            source,
            dest: source.other(),
        }
    }
}

/// Applies (or simulates) a [`SyncPolicy`] against a [`DiffResult`].
///
/// A run is a best-effort batch: every item gets an [`Outcome`] and one
/// failure never stops the others.
pub struct SyncExecutor {
    trash: Arc<dyn Trash>,
    progress: Arc<dyn Progress>,
    cancel: CancelToken,
}

impl Default for SyncExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncExecutor {
    /// Executor that trashes through the platform trash.
    pub fn new() -> Self {
        Self {
            trash: Arc::new(SystemTrash),
            progress: Arc::new(NoProgress),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_trash(mut self, trash: Arc<dyn Trash>) -> Self {
        self.trash = trash;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run `policy` against `diff`.
    ///
    /// Removals are processed first, then additions, then overwrites.
    /// Cancellation is checked before each item.
    pub fn sync(&self, diff: &DiffResult, policy: &SyncPolicy) -> SyncReport {
        let roles = Roles::for_policy(policy);
        let work = plan(diff, policy, roles);
        let mut report = SyncReport::new(policy.dry_run);

        tracing::debug!(
            source = %diff.root(roles.source).display(),
            dest = %diff.root(roles.dest).display(),
            items = work.len(),
            dry_run = policy.dry_run,
            "Starting sync"
        );
        self.progress.start(
            Phase::Syncing {
                dry_run: policy.dry_run,
            },
            Some(work.len() as u64),
        );

        for item in &work {
            if self.cancel.is_cancelled() {
                tracing::info!(done = report.actions.len(), "Sync cancelled");
                report.cancelled = true;
                break;
            }

            let action = match item {
                Work::Remove(entry) => self.remove(entry, policy),
                Work::Add(entry) => self.add(diff, roles, entry, policy),
                Work::Overwrite(pair) => self.overwrite(pair, roles, policy),
            };
            if let Outcome::Failed { error } = &action.outcome {
                tracing::warn!(action = %action.describe(), error = %error, "Sync action failed");
            } else {
                tracing::debug!(action = %action, "Sync action");
            }
            report.push(action);
            self.progress.advance(1);
        }

        self.progress.finish();
        tracing::info!(
            removals = report.removals.total(),
            additions = report.additions.total(),
            overwrites = report.overwrites.total(),
            failed = report.failures().count(),
            dry_run = report.dry_run,
            "Sync finished"
        );
        report
    }

    fn remove(&self, entry: &Entry, policy: &SyncPolicy) -> SyncAction {
        let target = entry.path.clone();
        let outcome = if policy.dry_run {
            Outcome::Planned
        } else {
            match self.delete(&target, policy.use_trash) {
                Ok(true) => Outcome::Executed,
                Ok(false) => Outcome::Skipped {
                    reason: SkipReason::AlreadyAbsent,
                },
                Err(e) => failed(e),
            }
        };

        SyncAction {
            category: ActionCategory::Remove,
            source: None,
            target,
            via_trash: policy.use_trash,
            outcome,
        }
    }

    fn add(&self, diff: &DiffResult, roles: Roles, entry: &Entry, policy: &SyncPolicy) -> SyncAction {
        // Join the raw OS path so names that are not UTF-8 survive the copy
        let target = match entry.path.strip_prefix(diff.root(roles.source)) {
            Ok(relative) => diff.root(roles.dest).join(relative),
            Err(_) => {
                return SyncAction {
                    category: ActionCategory::Add,
                    source: Some(entry.path.clone()),
                    target: entry.path.clone(),
                    via_trash: false,
                    outcome: Outcome::Failed {
                        error: format!(
                            "{} is not under {}",
                            entry.path.display(),
                            diff.root(roles.source).display()
                        ),
                    },
                };
            }
        };
        let replacing = io::exists_no_follow(&target);

        let mut action = SyncAction {
            category: ActionCategory::Add,
            source: Some(entry.path.clone()),
            target,
            via_trash: replacing && policy.overwrite && policy.use_trash,
            outcome: Outcome::Planned,
        };

        if replacing && !policy.overwrite {
            action.outcome = Outcome::Skipped {
                reason: SkipReason::TargetExists,
            };
            return action;
        }
        if policy.dry_run {
            return action;
        }

        action.outcome = match self.replace(&entry.path, &action.target, replacing, policy.use_trash) {
            Ok(()) => Outcome::Executed,
            Err(e) => failed(e),
        };
        action
    }

    fn overwrite(&self, pair: &ContentDiffPair, roles: Roles, policy: &SyncPolicy) -> SyncAction {
        let mut source = &pair.entry(roles.source).path;
        let mut target = &pair.entry(roles.dest).path;
        if policy.preserve_latest && target_is_newer(source, target) {
            tracing::debug!(newer = %target.display(), "Keeping the newer file");
            std::mem::swap(&mut source, &mut target);
        }

        let mut action = SyncAction {
            category: ActionCategory::Overwrite,
            source: Some(source.clone()),
            target: target.clone(),
            via_trash: policy.use_trash,
            outcome: Outcome::Planned,
        };
        if policy.dry_run {
            return action;
        }

        action.outcome = match self.overwrite_file(source, target, policy.use_trash) {
            Ok(()) => Outcome::Executed,
            Err(e) => failed(e),
        };
        action
    }

    fn overwrite_file(&self, source: &Path, target: &Path, use_trash: bool) -> dirsync_fs::Result<()> {
        let source_meta = fs::metadata(source).map_err(|e| dirsync_fs::Error::io(source, e))?;
        // Either side may have turned into a directory since the diff
        let wholesale = source_meta.is_dir() || target.is_dir();
        if wholesale || use_trash {
            self.replace(source, target, true, use_trash)
        } else {
            io::copy_file(source, target).map(|_| ())
        }
    }

    /// Copy `source` to `target`, clearing `target` first when `replacing`.
    fn replace(&self, source: &Path, target: &Path, replacing: bool, use_trash: bool) -> dirsync_fs::Result<()> {
        // A vanished source must not cost us the target
        fs::metadata(source).map_err(|e| dirsync_fs::Error::io(source, e))?;
        if replacing {
            self.delete(target, use_trash)?;
        }
        io::copy_any(source, target)
    }

    /// Delete a file or tree; `Ok(false)` when it was already gone.
    fn delete(&self, path: &Path, use_trash: bool) -> dirsync_fs::Result<bool> {
        if !use_trash {
            return io::remove_all(path);
        }
        match self.trash.trash(path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), trash = %self.trash.label(), "Moved to trash");
                Ok(true)
            }
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn plan<'a>(diff: &'a DiffResult, policy: &SyncPolicy, roles: Roles) -> Vec<Work<'a>> {
    let mut work = Vec::new();
    if policy.remove_extra {
        work.extend(diff.only(roles.dest).iter().map(Work::Remove));
    }
    if policy.add_missing {
        work.extend(diff.only(roles.source).iter().map(Work::Add));
    }
    if policy.overwrite {
        work.extend(diff.content_diffs.iter().map(Work::Overwrite));
    }
    work
}

/// Whether `target` was modified after `source`.
///
/// Unreadable times keep the nominal direction.
fn target_is_newer(source: &Path, target: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|m| m.modified());
    match (modified(source), modified(target)) {
        (Ok(source_time), Ok(target_time)) => target_time > source_time,
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Cannot read modification time, keeping sync direction");
            false
        }
    }
}

fn failed(error: dirsync_fs::Error) -> Outcome {
    Outcome::Failed {
        error: error.to_string(),
    }
}
