use dupscan::duplicates::{collect, DuplicateFinder, KeyFields};
use dupscan::error::ExitCode;
use dupscan::scanner::{
    FileDescriptor, FingerprintError, Fingerprinter, ScanError, ScanEvent, PREFIX_CAP,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_missing_root_does_not_stop_other_roots() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good");
    let missing = dir.path().join("missing");
    fs::create_dir(&good).unwrap();
    fs::write(good.join("a.txt"), b"hello").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[missing.clone(), good])
        .unwrap();

    assert_eq!(report.summary.total_files, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(&report.errors[0], ScanError::RootNotFound(p) if *p == missing));
    assert!(!report.no_readable_root());
    assert_eq!(ExitCode::for_report(&report), ExitCode::PartialSuccess);
}

#[test]
fn test_root_that_is_a_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, b"x").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[&file])
        .unwrap();

    assert!(matches!(report.errors.as_slice(), [ScanError::NotADirectory(_)]));
    assert!(report.no_readable_root());
    assert_eq!(ExitCode::for_report(&report), ExitCode::GeneralError);
}

#[test]
fn test_file_deleted_after_listing() {
    let dir = tempdir().unwrap();
    let kept_a = dir.path().join("a/kept.txt");
    let kept_b = dir.path().join("b/kept.txt");
    let gone = dir.path().join("gone.txt");
    fs::create_dir_all(kept_a.parent().unwrap()).unwrap();
    fs::create_dir_all(kept_b.parent().unwrap()).unwrap();
    fs::write(&kept_a, b"same bytes").unwrap();
    fs::write(&kept_b, b"same bytes").unwrap();
    fs::write(&gone, b"short lived").unwrap();

    // The walker saw "gone.txt" with its size, then it was removed
    let listed_size = fs::metadata(&gone).unwrap().len();
    fs::remove_file(&gone).unwrap();

    let fingerprinter = Fingerprinter::new(PREFIX_CAP);
    let describe = |path: &std::path::Path, size: u64| match fingerprinter.fingerprint(path, size)
    {
        Ok(fp) => ScanEvent::File(FileDescriptor::new(path.to_path_buf(), size, fp)),
        Err(err) => ScanEvent::Error(err.into()),
    };

    let events = vec![
        describe(&kept_a, 10),
        describe(&gone, listed_size),
        describe(&kept_b, 10),
    ];
    let collected = collect(events, KeyFields::default(), None);

    assert_eq!(collected.index.file_count(), 2);
    assert_eq!(collected.index.duplicate_entries().count(), 1);
    assert_eq!(collected.errors.len(), 1);
    assert!(matches!(
        &collected.errors[0],
        ScanError::Fingerprint(FingerprintError::NotFound(p)) if *p == gone
    ));
}

#[test]
fn test_file_truncated_after_listing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shrinking.log");
    fs::write(&path, b"tiny").unwrap();

    let err = Fingerprinter::new(PREFIX_CAP)
        .fingerprint(&path, 4096)
        .unwrap_err();

    match err {
        FingerprintError::Truncated {
            expected, actual, ..
        } => {
            assert_eq!(expected, 4096);
            assert_eq!(actual, 4);
        }
        other => panic!("expected Truncated, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_recorded() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("secret.txt"), b"secret").unwrap();
    fs::write(dir.path().join("open.txt"), b"open").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read it anyway
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path()])
        .unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(report.summary.total_files, 1);
    assert!(report
        .errors
        .iter()
        .any(|e| matches!(e, ScanError::ReadDir { path, .. } if *path == locked)));
    assert!(report.is_partial());
    assert!(!report.no_readable_root());
}

#[test]
fn test_no_readable_root() {
    let dir = tempdir().unwrap();
    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().join("x"), dir.path().join("y")])
        .unwrap();

    assert_eq!(report.unreadable_roots, 2);
    assert!(report.no_readable_root());
    assert_eq!(report.summary.total_files, 0);
}
