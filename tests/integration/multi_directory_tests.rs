use dupscan::duplicates::{DuplicateFinder, FinderError};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_duplicates_across_roots() {
    let dir = tempdir().unwrap();
    let photos = dir.path().join("photos");
    let backup = dir.path().join("backup");
    fs::create_dir_all(photos.join("2023")).unwrap();
    fs::create_dir_all(&backup).unwrap();
    fs::write(photos.join("2023/img.jpg"), b"jpeg data").unwrap();
    fs::write(backup.join("img.jpg"), b"jpeg data").unwrap();
    fs::write(backup.join("other.jpg"), b"other data").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[&photos, &backup])
        .unwrap();

    assert_eq!(report.roots, vec![photos.clone(), backup.clone()]);
    assert_eq!(report.summary.total_files, 3);
    assert_eq!(report.groups.len(), 1);
    let paths = report.groups[0].paths();
    assert!(paths.contains(&photos.join("2023/img.jpg")));
    assert!(paths.contains(&backup.join("img.jpg")));
}

#[test]
fn test_nested_root_is_not_scanned_twice() {
    let dir = tempdir().unwrap();
    let inner = dir.path().join("inner");
    fs::create_dir(&inner).unwrap();
    fs::write(inner.join("only.txt"), b"one copy").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[inner.clone(), dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.roots, vec![dir.path().to_path_buf()]);
    assert_eq!(report.summary.total_files, 1);
    assert!(report.groups.is_empty());
}

#[test]
fn test_repeated_root_is_not_scanned_twice() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), b"one copy").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path(), dir.path()])
        .unwrap();

    assert_eq!(report.roots.len(), 1);
    assert!(report.groups.is_empty());
}

#[test]
fn test_no_roots_is_an_error() {
    let roots: Vec<std::path::PathBuf> = Vec::new();
    let result = DuplicateFinder::with_defaults().find_duplicates(&roots);
    assert!(matches!(result, Err(FinderError::NoRoots)));
}

#[test]
fn test_finder_is_reusable() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::create_dir(first.path().join("a")).unwrap();
    fs::write(first.path().join("x.txt"), b"x").unwrap();
    fs::write(first.path().join("a/x.txt"), b"x").unwrap();
    fs::write(second.path().join("y.txt"), b"y").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let one = finder.find_duplicates(&[first.path()]).unwrap();
    let two = finder.find_duplicates(&[second.path()]).unwrap();

    assert_eq!(one.summary.duplicate_groups, 1);
    assert_eq!(two.summary.duplicate_groups, 0);
    assert_eq!(two.summary.total_files, 1);
}
