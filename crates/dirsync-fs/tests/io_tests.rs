use dirsync_fs::io;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("cache.json");

    io::write_atomic(&path, b"{}").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cache.json");
    fs::write(&path, "original").unwrap();

    io::write_atomic(&path, b"updated").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "updated");
}

#[test]
fn test_copy_file_creates_parents() {
    let temp = TempDir::new().unwrap();
    let from = temp.path().join("a.txt");
    fs::write(&from, "hi").unwrap();
    let to = temp.path().join("x").join("y").join("a.txt");

    let bytes = io::copy_file(&from, &to).unwrap();

    assert_eq!(bytes, 2);
    assert_eq!(fs::read_to_string(&to).unwrap(), "hi");
}

#[test]
fn test_copy_dir_all_preserves_structure() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    fs::create_dir_all(src.join("sub").join("deeper")).unwrap();
    fs::create_dir_all(src.join("empty")).unwrap();
    fs::write(src.join("top.txt"), "top").unwrap();
    fs::write(src.join("sub").join("mid.txt"), "mid").unwrap();
    fs::write(src.join("sub").join("deeper").join("low.bin"), [0u8, 1, 2]).unwrap();

    let dst = temp.path().join("dst");
    let copied = io::copy_dir_all(&src, &dst).unwrap();

    assert_eq!(copied, 3);
    assert_eq!(fs::read_to_string(dst.join("top.txt")).unwrap(), "top");
    assert_eq!(fs::read_to_string(dst.join("sub").join("mid.txt")).unwrap(), "mid");
    assert_eq!(fs::read(dst.join("sub").join("deeper").join("low.bin")).unwrap(), vec![0u8, 1, 2]);
    assert!(dst.join("empty").is_dir());
}

#[test]
fn test_remove_all_file_and_dir() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("f.txt");
    fs::write(&file, "x").unwrap();
    let dir = temp.path().join("d");
    fs::create_dir_all(dir.join("inner")).unwrap();
    fs::write(dir.join("inner").join("g.txt"), "y").unwrap();

    assert!(io::remove_all(&file).unwrap());
    assert!(io::remove_all(&dir).unwrap());
    assert!(!file.exists());
    assert!(!dir.exists());
}

#[test]
fn test_remove_all_missing_is_not_an_error() {
    let temp = TempDir::new().unwrap();
    let removed = io::remove_all(&temp.path().join("nothing-here")).unwrap();
    assert!(!removed);
}

#[test]
fn test_resolve_returns_absolute_path() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("dir")).unwrap();

    let resolved = io::resolve(&temp.path().join("dir").join("..").join("dir")).unwrap();

    assert!(resolved.is_absolute());
    assert_eq!(resolved.file_name().unwrap(), "dir");
}

#[test]
fn test_resolve_missing_path_fails() {
    let temp = TempDir::new().unwrap();
    assert!(io::resolve(&temp.path().join("missing")).is_err());
}
