//! Tunables loaded from an optional settings file

use std::path::{Path, PathBuf};

use dirsync_fs::ConfigStore;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Same-size binary files above this many bytes are assumed equal.
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 1_000_000;
/// Chunk size for byte-for-byte comparison.
pub const DEFAULT_COMPARE_BUFFER_SIZE: usize = 100_000;
/// Leading bytes inspected by the text/binary probe.
pub const DEFAULT_TEXT_PROBE_BYTES: usize = 1024;
/// Leading lines inspected by the text/binary probe.
pub const DEFAULT_TEXT_PROBE_LINES: usize = 5;

/// Engine settings.
///
/// Every field is optional in the file; missing ones keep their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Both-binary, same-size files bigger than this skip the byte
    /// compare and are reported equal. A known approximation: huge
    /// same-size binaries that differ are not detected.
    pub large_file_threshold: u64,
    pub compare_buffer_size: usize,
    pub text_probe_bytes: usize,
    pub text_probe_lines: usize,
    /// Where comparison results are cached
    pub cache_dir: Option<PathBuf>,
    /// Use this directory instead of the system trash
    pub trash_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            large_file_threshold: DEFAULT_LARGE_FILE_THRESHOLD,
            compare_buffer_size: DEFAULT_COMPARE_BUFFER_SIZE,
            text_probe_bytes: DEFAULT_TEXT_PROBE_BYTES,
            text_probe_lines: DEFAULT_TEXT_PROBE_LINES,
            cache_dir: None,
            trash_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML, JSON or YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let settings: Settings = ConfigStore::new().load(path)?;
        Ok(settings.sanitized())
    }

    /// `<config dir>/dirsync/config.toml` for the current user.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dirsync").join("config.toml"))
    }

    /// Load `explicit` if given, else the per-user file if it exists,
    /// else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "Loading settings");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    // Zero-sized buffers would never make progress
    fn sanitized(mut self) -> Self {
        self.compare_buffer_size = self.compare_buffer_size.max(1);
        self.text_probe_bytes = self.text_probe_bytes.max(1);
        self
    }
}
