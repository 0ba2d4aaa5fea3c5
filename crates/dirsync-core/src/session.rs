//! Compare-then-sync session over one pair of roots
//!
//! The session owns the resolved roots and wires together the differ,
//! the optional [`DiffCache`] and the [`SyncExecutor`]. Nothing is shared
//! between sessions except what the caller injects.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dirsync_fs::{DirectoryTrash, SystemTrash, Trash};

use crate::Result;
use crate::cache::DiffCache;
use crate::differ::TreeDiffer;
use crate::entry::Side;
use crate::progress::{CancelToken, NoProgress, Progress};
use crate::result::{DiffResult, resolve_root};
use crate::settings::Settings;
use crate::sync::{SyncExecutor, SyncPolicy, SyncReport};

/// Where a comparison came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffSource {
    Cache,
    Walk,
}

pub struct SyncSession {
    left: PathBuf,
    right: PathBuf,
    settings: Settings,
    cache: Option<Arc<dyn DiffCache>>,
    trash: Option<Arc<dyn Trash>>,
    progress: Arc<dyn Progress>,
    cancel: CancelToken,
    count_total: bool,
}

impl SyncSession {
    /// Open a session on two roots.
    ///
    /// # Errors
    ///
    /// `InvalidRoot` if either root is missing or not a directory.
    pub fn new(left: impl AsRef<Path>, right: impl AsRef<Path>) -> Result<Self> {
        let left = resolve_root(left.as_ref(), Side::Left)?;
        let right = resolve_root(right.as_ref(), Side::Right)?;
        tracing::debug!(left = %left.display(), right = %right.display(), "Opened session");

        Ok(Self {
            left,
            right,
            settings: Settings::default(),
            cache: None,
            trash: None,
            progress: Arc::new(NoProgress),
            cancel: CancelToken::new(),
            count_total: false,
        })
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn DiffCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Override the trash used for soft deletes.
    ///
    /// Without one, `settings.trash_dir` selects a [`DirectoryTrash`] and
    /// the platform trash is used otherwise.
    pub fn with_trash(mut self, trash: Arc<dyn Trash>) -> Self {
        self.trash = Some(trash);
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

    /// Precount both trees so the comparison reports a total.
    pub fn count_total(mut self, enabled: bool) -> Self {
        self.count_total = enabled;
        self
    }

    pub fn left(&self) -> &Path {
        &self.left
    }

    pub fn right(&self) -> &Path {
        &self.right
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Walk both trees, storing the result when a cache is configured.
    ///
    /// A failing cache write is logged and does not fail the comparison.
    pub fn compare(&self) -> Result<DiffResult> {
        let differ = TreeDiffer::new(&self.settings)
            .with_progress(self.progress.clone())
            .with_cancel(self.cancel.clone())
            .count_total(self.count_total);
        let result = differ.walk(DiffResult::empty(self.left.clone(), self.right.clone()))?;

        if let Some(cache) = &self.cache
            && let Err(e) = cache.store(&self.left, &self.right, &result)
        {
            tracing::warn!(error = %e, "Could not store comparison in cache");
        }
        Ok(result)
    }

    /// Use a cached comparison when allowed and present, else walk.
    pub fn load_or_compare(&self, use_cache: bool) -> Result<(DiffResult, DiffSource)> {
        if use_cache && let Some(cache) = &self.cache {
            match cache.load(&self.left, &self.right) {
                Ok(Some(result)) => {
                    tracing::info!("Using cached comparison");
                    return Ok((result, DiffSource::Cache));
                }
                Ok(None) => tracing::debug!("No cached comparison"),
                Err(e) => tracing::warn!(error = %e, "Could not read cached comparison"),
            }
        }
        Ok((self.compare()?, DiffSource::Walk))
    }

    /// Apply `policy`, then drop the cache entry if anything may have changed.
    pub fn sync(&self, diff: &DiffResult, policy: &SyncPolicy) -> SyncReport {
        let executor = SyncExecutor::new()
            .with_trash(self.trash())
            .with_progress(self.progress.clone())
            .with_cancel(self.cancel.clone());
        let report = executor.sync(diff, policy);

        if !policy.dry_run
            && policy.has_work()
            && let Some(cache) = &self.cache
            && let Err(e) = cache.invalidate(&self.left, &self.right)
        {
            tracing::warn!(error = %e, "Could not invalidate cached comparison");
        }
        report
    }

    fn trash(&self) -> Arc<dyn Trash> {
        if let Some(trash) = &self.trash {
            return trash.clone();
        }
        match &self.settings.trash_dir {
            Some(dir) => Arc::new(DirectoryTrash::new(dir)),
            None => Arc::new(SystemTrash),
        }
    }
}
