//! Diff cache
//!
//! A comparison can take long on big trees, so its result is persisted
//! keyed by both resolved roots. Any sync that mutates the filesystem
//! makes the entry stale; the session invalidates it afterwards.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dirsync_fs::{checksum, io};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::result::DiffResult;
use crate::settings::Settings;

/// Bumped whenever the serialized [`DiffResult`] layout changes.
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// Keyed persistence for comparison results.
pub trait DiffCache: Send + Sync {
    /// The stored result for these roots, if any.
    fn load(&self, left: &Path, right: &Path) -> Result<Option<DiffResult>>;

    fn store(&self, left: &Path, right: &Path, result: &DiffResult) -> Result<()>;

    /// Drop the entry for these roots; a missing entry is not an error.
    fn invalidate(&self, left: &Path, right: &Path) -> Result<()>;
}

/// Deterministic key for a pair of resolved roots.
///
/// The root names are kept in clear text so cache files can be told apart
/// by eye; the digest makes the key unique.
pub fn cache_key(left: &Path, right: &Path) -> String {
    let left_str = left.to_string_lossy();
    let right_str = right.to_string_lossy();
    let digest = checksum::sha256_joined(&[left_str.as_ref(), right_str.as_ref()]);
    format!("{}_{}_{}", stem(left), stem(right), digest)
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string())
}

#[derive(Serialize)]
struct CacheEnvelopeRef<'a> {
    version: u32,
    left_root: &'a Path,
    right_root: &'a Path,
    result: &'a DiffResult,
}

#[derive(Deserialize)]
struct CacheEnvelope {
    version: u32,
    left_root: PathBuf,
    right_root: PathBuf,
    result: DiffResult,
}

/// One JSON file per key inside a cache directory.
#[derive(Debug, Clone)]
pub struct FileDiffCache {
    dir: PathBuf,
}

impl FileDiffCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `settings.cache_dir`, else the platform default.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings
                .cache_dir
                .clone()
                .unwrap_or_else(Self::default_dir),
        )
    }

    /// `<user cache dir>/dirsync`, falling back to the temp dir.
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("dirsync")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, left: &Path, right: &Path) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(left, right)))
    }
}

impl DiffCache for FileDiffCache {
    fn load(&self, left: &Path, right: &Path) -> Result<Option<DiffResult>> {
        let path = self.path_for(left, right);
        if !path.is_file() {
            return Ok(None);
        }

        let content = io::read_text(&path)?;
        let envelope: CacheEnvelope = match serde_json::from_str(&content) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable cache file");
                return Ok(None);
            }
        };

        if envelope.version != CACHE_FORMAT_VERSION {
            tracing::debug!(found = envelope.version, "Ignoring cache file from another format version");
            return Ok(None);
        }
        if envelope.left_root != left || envelope.right_root != right {
            tracing::debug!(path = %path.display(), "Ignoring cache file recorded for other roots");
            return Ok(None);
        }

        tracing::debug!(path = %path.display(), "Loaded comparison from cache");
        Ok(Some(envelope.result))
    }

    fn store(&self, left: &Path, right: &Path, result: &DiffResult) -> Result<()> {
        let path = self.path_for(left, right);
        let envelope = CacheEnvelopeRef {
            version: CACHE_FORMAT_VERSION,
            left_root: left,
            right_root: right,
            result,
        };
        let content = serde_json::to_vec(&envelope)?;
        io::write_atomic(&path, &content)?;
        tracing::debug!(path = %path.display(), "Stored comparison in cache");
        Ok(())
    }

    fn invalidate(&self, left: &Path, right: &Path) -> Result<()> {
        let path = self.path_for(left, right);
        if io::remove_all(&path)? {
            tracing::debug!(path = %path.display(), "Invalidated cached comparison");
        }
        Ok(())
    }
}

/// In-process cache, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryDiffCache {
    entries: Mutex<HashMap<String, DiffResult>>,
}

impl MemoryDiffCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiffCache for MemoryDiffCache {
    fn load(&self, left: &Path, right: &Path) -> Result<Option<DiffResult>> {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        Ok(entries.get(&cache_key(left, right)).cloned())
    }

    fn store(&self, left: &Path, right: &Path, result: &DiffResult) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.insert(cache_key(left, right), result.clone());
        Ok(())
    }

    fn invalidate(&self, left: &Path, right: &Path) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.remove(&cache_key(left, right));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic_and_direction_sensitive() {
        let a = cache_key(Path::new("/data/photos"), Path::new("/backup/photos"));
        let b = cache_key(Path::new("/data/photos"), Path::new("/backup/photos"));
        let swapped = cache_key(Path::new("/backup/photos"), Path::new("/data/photos"));
        assert_eq!(a, b);
        assert_ne!(a, swapped);
        assert!(a.starts_with("photos_photos_"));
    }
}
