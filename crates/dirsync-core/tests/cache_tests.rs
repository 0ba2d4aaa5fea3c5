//! Tests for diff caches and their use by the session

use std::fs;
use std::sync::Arc;

use dirsync_core::cache::CACHE_FORMAT_VERSION;
use dirsync_core::{
    DiffCache, DiffResult, DiffSource, FileDiffCache, MemoryDiffCache, SyncPolicy, SyncSession,
    TreeDiffer,
};
use dirsync_test_utils::{TestTree, tree_pair};
use serde_json::json;
use tempfile::TempDir;

fn sample_diff(left: &TestTree, right: &TestTree) -> DiffResult {
    left.file("a.txt", "hi").file("b.txt", "x").file("changed.txt", "one");
    right.file("a.txt", "hi").file("c.txt", "y").file("changed.txt", "three");
    TreeDiffer::default()
        .compare(left.root(), right.root())
        .unwrap()
}

mod file_cache {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_store_then_load_round_trips() {
        let (left, right) = tree_pair();
        let diff = sample_diff(&left, &right);
        let dir = TempDir::new().unwrap();
        let cache = FileDiffCache::new(dir.path().join("nested/cache"));

        cache.store(&diff.left_root, &diff.right_root, &diff).unwrap();
        let loaded = cache.load(&diff.left_root, &diff.right_root).unwrap();

        assert_eq!(loaded, Some(diff));
    }

    #[test]
    fn test_absent_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = FileDiffCache::new(dir.path());

        assert_eq!(cache.load(dir.path(), dir.path()).unwrap(), None);
    }

    #[test]
    fn test_key_is_direction_sensitive() {
        let (left, right) = tree_pair();
        let diff = sample_diff(&left, &right);
        let dir = TempDir::new().unwrap();
        let cache = FileDiffCache::new(dir.path());

        cache.store(&diff.left_root, &diff.right_root, &diff).unwrap();

        assert_eq!(cache.load(&diff.right_root, &diff.left_root).unwrap(), None);
    }

    #[test]
    fn test_stale_format_version_is_a_miss() {
        let (left, right) = tree_pair();
        let diff = sample_diff(&left, &right);
        let dir = TempDir::new().unwrap();
        let cache = FileDiffCache::new(dir.path());
        let stale = json!({
            "version": CACHE_FORMAT_VERSION + 1,
            "left_root": diff.left_root,
            "right_root": diff.right_root,
            "result": diff,
        });
        fs::write(
            cache.path_for(&diff.left_root, &diff.right_root),
            serde_json::to_vec(&stale).unwrap(),
        )
        .unwrap();

        assert_eq!(cache.load(&diff.left_root, &diff.right_root).unwrap(), None);
    }

    #[test]
    fn test_entry_for_other_roots_is_a_miss() {
        let (left, right) = tree_pair();
        let diff = sample_diff(&left, &right);
        let dir = TempDir::new().unwrap();
        let cache = FileDiffCache::new(dir.path());
        let foreign = json!({
            "version": CACHE_FORMAT_VERSION,
            "left_root": "/somewhere/else",
            "right_root": diff.right_root,
            "result": diff,
        });
        fs::write(
            cache.path_for(&diff.left_root, &diff.right_root),
            serde_json::to_vec(&foreign).unwrap(),
        )
        .unwrap();

        assert_eq!(cache.load(&diff.left_root, &diff.right_root).unwrap(), None);
    }

    #[test]
    fn test_unparsable_file_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = FileDiffCache::new(dir.path());
        let (left, right) = (dir.path().join("l"), dir.path().join("r"));
        fs::write(cache.path_for(&left, &right), "{ not json").unwrap();

        assert_eq!(cache.load(&left, &right).unwrap(), None);
    }

    #[test]
    fn test_invalidate_removes_entry_and_tolerates_absence() {
        let (left, right) = tree_pair();
        let diff = sample_diff(&left, &right);
        let dir = TempDir::new().unwrap();
        let cache = FileDiffCache::new(dir.path());
        cache.store(&diff.left_root, &diff.right_root, &diff).unwrap();

        cache.invalidate(&diff.left_root, &diff.right_root).unwrap();
        cache.invalidate(&diff.left_root, &diff.right_root).unwrap();

        assert!(!cache.path_for(&diff.left_root, &diff.right_root).exists());
    }

    #[test]
    fn test_file_name_starts_with_root_names() {
        let cache = FileDiffCache::new("/cache");
        let path = cache.path_for("/data/photos".as_ref(), "/backup/archive".as_ref());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();

        assert!(name.starts_with("photos_archive_"));
        assert!(name.ends_with(".json"));
    }
}

mod memory_cache {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_and_invalidate() {
        let (left, right) = tree_pair();
        let diff = sample_diff(&left, &right);
        let cache = MemoryDiffCache::new();

        cache.store(&diff.left_root, &diff.right_root, &diff).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.load(&diff.left_root, &diff.right_root).unwrap(), Some(diff.clone()));

        cache.invalidate(&diff.left_root, &diff.right_root).unwrap();
        assert!(cache.is_empty());
    }
}

mod session_cache {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session(left: &TestTree, right: &TestTree, cache: Arc<MemoryDiffCache>) -> SyncSession {
        SyncSession::new(left.root(), right.root())
            .unwrap()
            .with_cache(cache)
    }

    #[test]
    fn test_second_load_comes_from_cache() {
        let (left, right) = tree_pair();
        let expected = sample_diff(&left, &right);
        let cache = Arc::new(MemoryDiffCache::new());
        let session = session(&left, &right, cache.clone());

        let (first, first_source) = session.load_or_compare(true).unwrap();
        let (second, second_source) = session.load_or_compare(true).unwrap();

        assert_eq!(first_source, DiffSource::Walk);
        assert_eq!(second_source, DiffSource::Cache);
        assert_eq!(first, expected);
        assert_eq!(second, expected);
    }

    #[test]
    fn test_cache_is_ignored_unless_requested() {
        let (left, right) = tree_pair();
        sample_diff(&left, &right);
        let cache = Arc::new(MemoryDiffCache::new());
        let session = session(&left, &right, cache.clone());

        session.compare().unwrap();
        let (_, source) = session.load_or_compare(false).unwrap();

        assert_eq!(source, DiffSource::Walk);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cached_result_can_be_stale() {
        let (left, right) = tree_pair();
        let expected = sample_diff(&left, &right);
        let session = session(&left, &right, Arc::new(MemoryDiffCache::new()));
        session.compare().unwrap();
        left.file("late.txt", "added after caching");

        let (cached, _) = session.load_or_compare(true).unwrap();

        assert_eq!(cached, expected);
    }

    #[test]
    fn test_applied_sync_invalidates_entry() {
        let (left, right) = tree_pair();
        sample_diff(&left, &right);
        let cache = Arc::new(MemoryDiffCache::new());
        let session = session(&left, &right, cache.clone());
        let diff = session.compare().unwrap();

        let report = session.sync(&diff, &SyncPolicy::mirror());

        assert!(report.success());
        assert!(cache.is_empty());
        let (fresh, source) = session.load_or_compare(true).unwrap();
        assert_eq!(source, DiffSource::Walk);
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_dry_run_keeps_entry() {
        let (left, right) = tree_pair();
        sample_diff(&left, &right);
        let cache = Arc::new(MemoryDiffCache::new());
        let session = session(&left, &right, cache.clone());
        let diff = session.compare().unwrap();

        let policy = SyncPolicy {
            dry_run: true,
            ..SyncPolicy::mirror()
        };
        session.sync(&diff, &policy);

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sync_without_categories_keeps_entry() {
        let (left, right) = tree_pair();
        sample_diff(&left, &right);
        let cache = Arc::new(MemoryDiffCache::new());
        let session = session(&left, &right, cache.clone());
        let diff = session.compare().unwrap();

        session.sync(&diff, &SyncPolicy::default());

        assert_eq!(cache.len(), 1);
    }
}

#[cfg(target_os = "linux")]
mod raw_names {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::ffi::OsStr;
    use std::io::Write;
    use std::os::unix::ffi::OsStrExt;
    use std::sync::Mutex;
    use tracing_subscriber::fmt::MakeWriter;

    /// Collects formatted log lines so a test can assert on them.
    #[derive(Clone, Default)]
    struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl LogCapture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogCapture {
        type Writer = LogCapture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn tree_with_raw_name() -> (TestTree, TestTree) {
        let (left, right) = tree_pair();
        fs::write(left.root().join(OsStr::from_bytes(b"caf\xe9.txt")), "x").unwrap();
        (left, right)
    }

    #[test]
    fn test_store_rejects_non_utf8_paths_without_writing() {
        let (left, right) = tree_with_raw_name();
        let diff = TreeDiffer::default()
            .compare(left.root(), right.root())
            .unwrap();
        let dir = TempDir::new().unwrap();
        let cache = FileDiffCache::new(dir.path());

        let err = cache
            .store(&diff.left_root, &diff.right_root, &diff)
            .unwrap_err();

        assert!(matches!(err, dirsync_core::Error::Json(_)), "got {err:?}");
        assert!(!cache.path_for(&diff.left_root, &diff.right_root).exists());
        assert_eq!(cache.load(&diff.left_root, &diff.right_root).unwrap(), None);
    }

    #[test]
    fn test_failed_store_is_logged_and_next_load_walks() {
        let (left, right) = tree_with_raw_name();
        let dir = TempDir::new().unwrap();
        let session = SyncSession::new(left.root(), right.root())
            .unwrap()
            .with_cache(Arc::new(FileDiffCache::new(dir.path())));
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let (first, second) = tracing::subscriber::with_default(subscriber, || {
            let first = session.load_or_compare(true).unwrap();
            let second = session.load_or_compare(true).unwrap();
            (first, second)
        });

        assert_eq!(first.1, DiffSource::Walk);
        assert_eq!(second.1, DiffSource::Walk);
        assert_eq!(first.0.left_only.len(), 1);
        let logs = capture.text();
        assert_eq!(logs.matches("Could not store comparison in cache").count(), 2, "{logs}");
        assert!(logs.contains("UTF-8"), "{logs}");
    }
}
