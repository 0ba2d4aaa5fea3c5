//! Applying a comparison to the filesystem
//!
//! - **policy**: which categories run, in which direction
//! - **executor**: performs or simulates the operations
//! - **report**: per-action outcomes and per-category counts

mod executor;
mod policy;
mod report;

pub use executor::SyncExecutor;
pub use policy::SyncPolicy;
pub use report::{ActionCategory, CategoryCounts, Outcome, SkipReason, SyncAction, SyncReport};
