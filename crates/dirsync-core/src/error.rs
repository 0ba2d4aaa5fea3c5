//! Error types for dirsync-core

use std::path::PathBuf;

use crate::entry::Side;

/// Result type for dirsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dirsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A root is missing or not a directory; raised before any traversal
    #[error("{side} path \"{}\" is not a valid directory: {reason}", path.display())]
    InvalidRoot {
        side: Side,
        path: PathBuf,
        reason: String,
    },

    /// Per-item read/stat/copy/delete failure
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory could not be listed during the walk
    #[error(transparent)]
    DirectoryRead(#[from] DirectoryReadError),

    /// The cancel token fired before the operation finished
    #[error("Operation cancelled")]
    Cancelled,

    /// Filesystem error from dirsync-fs
    #[error(transparent)]
    Fs(#[from] dirsync_fs::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The path this error is about, when there is one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::InvalidRoot { path, .. } | Self::Io { path, .. } => Some(path),
            Self::DirectoryRead(e) => Some(&e.path),
            Self::Fs(dirsync_fs::Error::Io { path, .. }) => Some(path),
            _ => None,
        }
    }
}

/// A directory became unreadable mid-walk.
#[derive(Debug, thiserror::Error)]
#[error("Cannot read directory {}: {source}", path.display())]
pub struct DirectoryReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}
