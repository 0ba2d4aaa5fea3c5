//! Shared test utilities for the dirsync workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TestTree`] builder for directory fixtures and
//!   whole-tree snapshots

pub mod tree;

pub use tree::{NodeState, TestTree, tree_pair};
