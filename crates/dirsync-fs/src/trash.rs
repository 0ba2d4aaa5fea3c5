//! Recoverable deletion
//!
//! [`Trash`] is the seam the sync executor deletes through when soft
//! deletion is requested. [`SystemTrash`] hands items to the desktop
//! trash / recycle bin; [`DirectoryTrash`] keeps them in a plain
//! directory together with a JSON record of where they came from, which
//! works on headless machines and in tests.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, io};

/// A recoverable delete target.
pub trait Trash: Send + Sync {
    /// Move `path` (file or directory) out of the way recoverably.
    ///
    /// A missing `path` yields an [`Error::Io`] of kind `NotFound` so
    /// callers can treat it as "already gone".
    fn trash(&self, path: &Path) -> Result<()>;

    /// Short label used in logs and reports.
    fn label(&self) -> String;
}

fn ensure_exists(path: &Path) -> Result<()> {
    fs::symlink_metadata(path)
        .map(|_| ())
        .map_err(|e| Error::io(path, e))
}

/// The platform trash (freedesktop trash, macOS Trash, Windows Recycle Bin).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTrash;

impl Trash for SystemTrash {
    fn trash(&self, path: &Path) -> Result<()> {
        ensure_exists(path)?;
        trash::delete(path).map_err(|e| Error::Trash {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn label(&self) -> String {
        "system trash".to_string()
    }
}

/// Record kept next to every item in a [`DirectoryTrash`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashedItem {
    pub id: String,
    /// Absolute path the item was removed from
    pub original_path: PathBuf,
    pub deleted_at: DateTime<Utc>,
}

/// Trash implemented as a plain directory.
///
/// Layout: `<root>/<id>/<file name>` holds the item and `<root>/<id>.json`
/// its [`TrashedItem`] record.
#[derive(Debug, Clone)]
pub struct DirectoryTrash {
    root: PathBuf,
}

impl DirectoryTrash {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    /// Where the trashed content of `item` currently lives.
    pub fn stored_path(&self, item: &TrashedItem) -> PathBuf {
        let name = item
            .original_path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("item"));
        self.root.join(&item.id).join(name)
    }

    /// All items currently held, oldest first.
    pub fn list(&self) -> Result<Vec<TrashedItem>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(&self.root, e)),
        };

        let mut items = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&self.root, e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = io::read_text(&path)?;
            match serde_json::from_str::<TrashedItem>(&content) {
                Ok(item) => items.push(item),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable trash record");
                }
            }
        }

        items.sort_by(|a, b| a.deleted_at.cmp(&b.deleted_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    /// Move a trashed item back to its original location.
    ///
    /// Fails if something already occupies the original path.
    pub fn restore(&self, item: &TrashedItem) -> Result<()> {
        if io::exists_no_follow(&item.original_path) {
            return Err(Error::io(
                &item.original_path,
                std::io::Error::new(ErrorKind::AlreadyExists, "restore target is occupied"),
            ));
        }
        move_path(&self.stored_path(item), &item.original_path)?;
        io::remove_all(&self.root.join(&item.id))?;
        io::remove_all(&self.record_path(&item.id))?;
        Ok(())
    }
}

impl Trash for DirectoryTrash {
    fn trash(&self, path: &Path) -> Result<()> {
        ensure_exists(path)?;

        let item = TrashedItem {
            id: Uuid::new_v4().simple().to_string(),
            original_path: path.to_path_buf(),
            deleted_at: Utc::now(),
        };
        let target = self.stored_path(&item);

        // Record first: a failed write must leave the item where it was
        let record = serde_json::to_vec_pretty(&item).map_err(|e| Error::Trash {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let record_path = self.record_path(&item.id);
        io::write_atomic(&record_path, &record)?;

        if let Err(e) = move_path(path, &target) {
            let _ = io::remove_all(&record_path);
            let _ = io::remove_all(&self.root.join(&item.id));
            return Err(e);
        }

        tracing::debug!(from = %path.display(), to = %target.display(), "Moved to trash directory");
        Ok(())
    }

    fn label(&self) -> String {
        format!("trash directory {}", self.root.display())
    }
}

/// Rename, falling back to copy + remove across filesystems.
fn move_path(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            io::copy_any(from, to)?;
            io::remove_all(from)?;
            Ok(())
        }
        Err(e) => Err(Error::io(from, e)),
    }
}
