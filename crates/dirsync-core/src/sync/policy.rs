//! What a sync run is allowed to do

use serde::{Deserialize, Serialize};

/// Options for one sync run.
///
/// All flags default to off, so the default policy does nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncPolicy {
    /// Replace destination files whose content differs
    pub overwrite: bool,
    /// Copy source-only entries to the destination
    pub add_missing: bool,
    /// Delete destination-only entries
    pub remove_extra: bool,
    /// Treat the right root as the source
    pub reverse_direction: bool,
    pub dry_run: bool,
    /// Route deletions and overwritten files through the trash
    pub use_trash: bool,
    /// The newer file wins content diffs, whatever the direction
    pub preserve_latest: bool,
}

impl SyncPolicy {
    /// Add, remove and overwrite.
    pub fn mirror() -> Self {
        Self {
            overwrite: true,
            add_missing: true,
            remove_extra: true,
            ..Self::default()
        }
    }

    /// True when at least one category is enabled.
    pub fn has_work(&self) -> bool {
        self.overwrite || self.add_missing || self.remove_extra
    }
}
