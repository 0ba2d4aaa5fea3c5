//! Progress reporting and cooperative cancellation

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Long-running stage a [`Progress`] observer is told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Counting items so the comparison has a total
    Counting,
    Comparing,
    Syncing { dry_run: bool },
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Counting => write!(f, "Counting items"),
            Self::Comparing => write!(f, "Checking differences"),
            Self::Syncing { dry_run: false } => write!(f, "Syncing contents"),
            Self::Syncing { dry_run: true } => write!(f, "Syncing contents (dry-run)"),
        }
    }
}

/// Observer for visible progress.
///
/// Purely informational: nothing an observer does can change a result.
pub trait Progress: Send + Sync {
    /// A phase begins; `total` is known for comparisons that were precounted.
    fn start(&self, _phase: Phase, _total: Option<u64>) {}

    fn advance(&self, _delta: u64) {}

    fn finish(&self) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {}

/// Cooperative cancellation with an optional deadline.
///
/// Clones share the same flag. Long operations poll
/// [`CancelToken::is_cancelled`] between items, never in the middle of a
/// copy, so a cancelled run stops at a clean item boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that also reports cancelled once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
