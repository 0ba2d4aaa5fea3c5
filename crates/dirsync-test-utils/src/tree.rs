//! [`TestTree`] builder for directory comparison scenarios.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use walkdir::WalkDir;

/// A temporary directory tree with helpers for setup and assertion.
///
/// Paths passed to the helpers are relative to the root and use `/`.
///
/// # Example
///
/// ```rust,no_run
/// use dirsync_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// tree.file("docs/readme.txt", "hello").dir("empty");
/// tree.assert_contents("docs/readme.txt", "hello");
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

/// What [`TestTree::snapshot`] records for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    Directory,
    File {
        contents: Vec<u8>,
        modified: SystemTime,
    },
}

impl TestTree {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write a text file, creating parents.
    pub fn file(&self, rel: &str, contents: &str) -> &Self {
        self.bytes(rel, contents.as_bytes())
    }

    /// Write a file with arbitrary bytes, creating parents.
    pub fn bytes(&self, rel: &str, contents: &[u8]) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        self
    }

    pub fn dir(&self, rel: &str) -> &Self {
        fs::create_dir_all(self.path(rel)).unwrap();
        self
    }

    /// Set the modification time of a file to `age` before now.
    pub fn age(&self, rel: &str, age: Duration) -> &Self {
        let file = fs::File::options().write(true).open(self.path(rel)).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
        self
    }

    pub fn read(&self, rel: &str) -> String {
        let path = self.path(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, rel: &str) {
        let path = self.path(rel);
        assert!(path.exists(), "Expected path to exist: {}", path.display());
    }

    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, rel: &str) {
        let path = self.path(rel);
        assert!(!path.exists(), "Expected path NOT to exist: {}", path.display());
    }

    pub fn assert_contents(&self, rel: &str, expected: &str) {
        assert_eq!(self.read(rel), expected, "Unexpected contents of {rel}");
    }

    /// Every path below the root with its contents and mtime.
    ///
    /// Two equal snapshots mean nothing was created, deleted, written or
    /// touched in between.
    pub fn snapshot(&self) -> BTreeMap<String, NodeState> {
        let mut nodes = BTreeMap::new();
        collect(self.root(), &mut nodes);
        nodes
    }
}

fn collect(root: &Path, nodes: &mut BTreeMap<String, NodeState>) {
    for entry in WalkDir::new(root).min_depth(1).follow_links(true) {
        let entry = entry.unwrap();
        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap()
            .to_string_lossy()
            .replace('\\', "/");
        let state = if entry.file_type().is_dir() {
            NodeState::Directory
        } else {
            NodeState::File {
                contents: fs::read(entry.path()).unwrap(),
                modified: entry.metadata().unwrap().modified().unwrap(),
            }
        };
        nodes.insert(rel, state);
    }
}

/// Two empty trees, conventionally the left and right roots.
pub fn tree_pair() -> (TestTree, TestTree) {
    (TestTree::new(), TestTree::new())
}
