//! Core comparison and synchronization engine for dirsync
//!
//! This crate provides:
//! - **differ**: lock-step walk of two trees into a [`DiffResult`]
//! - **classifier**: decides whether two same-named files differ
//! - **sync**: applies a [`SyncPolicy`] to a diff and reports the outcome
//! - **cache**: keyed persistence of comparison results
//! - **session**: ties the above together for one pair of roots

pub mod cache;
pub mod classifier;
pub mod differ;
pub mod entry;
pub mod error;
pub mod progress;
pub mod result;
pub mod session;
pub mod settings;
pub mod sync;

pub use cache::{DiffCache, FileDiffCache, MemoryDiffCache, cache_key};
pub use classifier::{ContentClassifier, ContentKind, FileComparison, Verdict};
pub use differ::{DirEntries, TreeDiffer, count_items, read_dir_entries};
pub use entry::{Entry, EntryKind, Side, SideDiff};
pub use error::{DirectoryReadError, Error, Result};
pub use progress::{CancelToken, NoProgress, Phase, Progress};
pub use result::{ContentDiffPair, DiffResult, WalkIssue};
pub use session::{DiffSource, SyncSession};
pub use settings::Settings;
pub use sync::{
    ActionCategory, CategoryCounts, Outcome, SkipReason, SyncAction, SyncExecutor, SyncPolicy,
    SyncReport,
};
