//! Tree copy and removal checked against the resulting filesystem

use assert_fs::prelude::*;
use dirsync_fs::io;
use predicates::prelude::*;

#[test]
fn test_copy_dir_all_reproduces_tree() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("src/a.txt").write_str("alpha").unwrap();
    temp.child("src/nested/b.txt").write_str("beta").unwrap();
    temp.child("src/empty").create_dir_all().unwrap();

    let copied = io::copy_dir_all(temp.child("src").path(), temp.child("dst").path()).unwrap();

    assert_eq!(copied, 2);
    temp.child("dst/a.txt").assert("alpha");
    temp.child("dst/nested/b.txt").assert("beta");
    temp.child("dst/empty").assert(predicate::path::is_dir());
}

#[test]
fn test_copy_any_handles_files_and_directories() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("file.txt").write_str("one").unwrap();
    temp.child("dir/inner.txt").write_str("two").unwrap();

    io::copy_any(temp.child("file.txt").path(), temp.child("out/file.txt").path()).unwrap();
    io::copy_any(temp.child("dir").path(), temp.child("out/dir").path()).unwrap();

    temp.child("out/file.txt").assert("one");
    temp.child("out/dir/inner.txt").assert("two");
}

#[test]
fn test_remove_all_reports_whether_something_was_removed() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("tree/x/y.txt").write_str("y").unwrap();

    assert!(io::remove_all(temp.child("tree").path()).unwrap());
    assert!(!io::remove_all(temp.child("tree").path()).unwrap());
    temp.child("tree").assert(predicate::path::missing());
}

#[cfg(unix)]
#[test]
fn test_remove_all_deletes_symlink_not_target() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("target/keep.txt").write_str("keep").unwrap();
    std::os::unix::fs::symlink(temp.child("target").path(), temp.child("link").path()).unwrap();

    assert!(io::exists_no_follow(temp.child("link").path()));
    io::remove_all(temp.child("link").path()).unwrap();

    temp.child("link").assert(predicate::path::missing());
    temp.child("target/keep.txt").assert("keep");
}

#[cfg(unix)]
#[test]
fn test_copy_dir_all_follows_symlinked_directories() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("shared/photo.jpg").write_str("jpeg").unwrap();
    temp.child("src").create_dir_all().unwrap();
    std::os::unix::fs::symlink(temp.child("shared").path(), temp.child("src/linked").path()).unwrap();

    let copied = io::copy_dir_all(temp.child("src").path(), temp.child("dst").path()).unwrap();

    assert_eq!(copied, 1);
    temp.child("dst/linked").assert(predicate::path::is_dir());
    temp.child("dst/linked/photo.jpg").assert("jpeg");
    assert!(!temp.child("dst/linked").path().is_symlink());
}
