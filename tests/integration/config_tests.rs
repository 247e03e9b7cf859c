use clap::Parser;
use dupscan::cli::Cli;
use dupscan::config::Config;
use dupscan::duplicates::{DuplicateFinder, KeyFields};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_file_drives_scan() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir_all(data.join("sub")).unwrap();
    fs::write(data.join("a.png"), b"pixels").unwrap();
    fs::write(data.join("sub/b.png"), b"pixels").unwrap();
    fs::write(data.join("c.txt"), b"pixels").unwrap();

    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "roots = [{:?}]\nextensions = [\"png\"]\nkey_fields = [\"size\", \"hash\"]\n",
            data.to_string_lossy()
        ),
    )
    .unwrap();

    let config = Config::load_from_path(Some(&config_path));
    let finder_config = config.to_finder_config().unwrap();
    assert_eq!(finder_config.key_fields, KeyFields::content());

    let report = DuplicateFinder::new(finder_config)
        .find_duplicates(&config.scan_roots())
        .unwrap();

    assert_eq!(report.summary.total_files, 2);
    assert_eq!(report.groups.len(), 1);
}

#[test]
fn test_cli_overrides_config_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "roots = [\"/from/file\"]\nmax_open_files = 50\nthreads = 3\n",
    )
    .unwrap();

    let cli = Cli::try_parse_from(["dupscan", "-d", "/from/cli", "--max-open", "5"]).unwrap();
    let mut config = Config::load_from_path(Some(&config_path));
    config.merge_cli(&cli);

    assert_eq!(config.scan_roots(), vec![std::path::PathBuf::from("/from/cli")]);
    assert_eq!(config.max_open_files, 5);
    assert_eq!(config.threads, 3);
}

#[test]
fn test_unknown_compare_field_is_rejected() {
    let cli = Cli::try_parse_from(["dupscan", "-o", "nmae,size"]).unwrap();
    let mut config = Config::default();
    config.merge_cli(&cli);

    let err = config.to_finder_config().unwrap_err();
    assert_eq!(err.field, "nmae");
    assert_eq!(err.to_string(), "unknown compare field 'nmae', did you mean 'name'?");
}
