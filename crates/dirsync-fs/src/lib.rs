//! Filesystem layer for dirsync
//!
//! Provides typed I/O errors, atomic locked writes, recursive copy and
//! removal helpers, the trash abstraction, and format-agnostic config loading.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod trash;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::NormalizedPath;
pub use trash::{DirectoryTrash, SystemTrash, Trash, TrashedItem};
