use dupscan::duplicates::{DuplicateFinder, FinderConfig, KeyFields};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::tempdir;

fn write(path: impl Into<PathBuf>, content: &[u8]) {
    let path = path.into();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path()])
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.total_files, 0);
    assert_eq!(report.summary.total_bytes, 0);
    assert_eq!(report.summary.duplicate_files, 0);
    assert_eq!(report.summary.duplicate_bytes, 0);
    assert!(report.errors.is_empty());
}

#[test]
fn test_same_content_different_names_with_content_key() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a.txt"), b"0123456789");
    write(dir.path().join("b.txt"), b"0123456789");

    let finder =
        DuplicateFinder::new(FinderConfig::default().with_key_fields(KeyFields::content()));
    let report = finder.find_duplicates(&[dir.path()]).unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
    assert_eq!(report.summary.duplicate_files, 1);
    assert_eq!(report.summary.duplicate_bytes, 10);
}

#[test]
fn test_same_content_different_names_with_default_key() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a.txt"), b"0123456789");
    write(dir.path().join("b.txt"), b"0123456789");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path()])
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.total_files, 2);
}

#[test]
fn test_same_name_in_different_directories() {
    let dir = tempdir().unwrap();
    write(dir.path().join("one/a.txt"), b"0123456789");
    write(dir.path().join("two/deeper/a.txt"), b"0123456789");
    write(dir.path().join("three/a.txt"), b"different!");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path()])
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    let paths: BTreeSet<_> = report.groups[0].paths().into_iter().collect();
    assert!(paths.contains(&dir.path().join("one/a.txt")));
    assert!(paths.contains(&dir.path().join("two/deeper/a.txt")));
    assert_eq!(report.summary.total_files, 3);
    assert_eq!(report.summary.duplicate_bytes, 10);
}

#[test]
fn test_vcs_directories_are_skipped() {
    let dir = tempdir().unwrap();
    write(dir.path().join(".git/objects/a.txt"), b"same");
    write(dir.path().join(".git/HEAD"), b"ref");
    write(dir.path().join(".svn/a.txt"), b"same");
    write(dir.path().join("src/a.txt"), b"same");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path()])
        .unwrap();

    assert_eq!(report.summary.total_files, 1);
    assert!(report.groups.is_empty());
}

#[test]
fn test_extension_filter() {
    let dir = tempdir().unwrap();
    write(dir.path().join("x/pic.JPG"), b"image");
    write(dir.path().join("y/pic.JPG"), b"image");
    write(dir.path().join("x/notes.txt"), b"text");
    write(dir.path().join("y/notes.txt"), b"text");

    let finder = DuplicateFinder::new(FinderConfig::default().with_extensions([".jpg"]));
    let report = finder.find_duplicates(&[dir.path()]).unwrap();

    assert_eq!(report.summary.total_files, 2);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].key.name.as_deref(), Some("pic.JPG"));
}

#[test]
fn test_empty_files_are_grouped() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a/.keep"), b"");
    write(dir.path().join("b/.keep"), b"");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path()])
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.summary.duplicate_files, 1);
    assert_eq!(report.summary.duplicate_bytes, 0);
}

#[test]
fn test_difference_beyond_prefix_cap_is_ignored() {
    let dir = tempdir().unwrap();
    let mut first = vec![7u8; 4096];
    let mut second = first.clone();
    first[4000] = 1;
    second[4000] = 2;
    write(dir.path().join("a/big.bin"), &first);
    write(dir.path().join("b/big.bin"), &second);

    let capped = DuplicateFinder::new(FinderConfig::default().with_prefix_cap(1024));
    let report = capped.find_duplicates(&[dir.path()]).unwrap();
    assert_eq!(report.groups.len(), 1);

    let full = DuplicateFinder::new(FinderConfig::default().with_prefix_cap(8192));
    let report = full.find_duplicates(&[dir.path()]).unwrap();
    assert!(report.groups.is_empty());
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        write(
            dir.path().join(format!("d{}/f{}.dat", i % 4, i % 7)),
            format!("content {}", i % 5).as_bytes(),
        );
    }

    let finder = DuplicateFinder::new(FinderConfig::default().with_threads(4));
    let snapshot = || {
        let scan = finder.collect(&[dir.path()]).unwrap();
        scan.index
            .iter()
            .map(|(key, files)| {
                let members: BTreeSet<PathBuf> =
                    files.iter().map(|f| f.path().to_path_buf()).collect();
                (key.to_string(), members)
            })
            .collect::<BTreeSet<_>>()
    };

    assert_eq!(snapshot(), snapshot());
}

#[test]
fn test_open_files_never_exceed_limit() {
    let dir = tempdir().unwrap();
    for d in 0..8 {
        for f in 0..10u8 {
            write(
                dir.path().join(format!("dir{d}/sub{}/file{f}.bin", f % 3)),
                &vec![f; 2048],
            );
        }
    }

    for limit in [1, 2, 3] {
        let config = FinderConfig::default()
            .with_max_open_files(limit)
            .with_threads(8)
            .with_channel_capacity(4);
        let scan = DuplicateFinder::new(config)
            .collect(&[dir.path()])
            .unwrap();

        assert_eq!(scan.index.file_count(), 80);
        assert!(scan.peak_open_files >= 1);
        assert!(
            scan.peak_open_files <= limit,
            "peak {} above limit {}",
            scan.peak_open_files,
            limit
        );
    }
}

#[test]
fn test_duplicate_bytes_matches_groups() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        let size = (i % 4) * 100;
        write(
            dir.path().join(format!("d{i}/f{}.bin", i % 4)),
            &vec![b'x'; size],
        );
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path()])
        .unwrap();

    let expected: u64 = report
        .groups
        .iter()
        .map(|g| g.size * (g.len() as u64 - 1))
        .sum();
    assert_eq!(report.summary.duplicate_bytes, expected);
    assert_eq!(report.summary.duplicate_groups, 4);
    assert_eq!(report.summary.duplicate_files, 16);
    assert_eq!(report.summary.total_files, 20);
}
