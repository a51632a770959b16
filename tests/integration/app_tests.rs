use clap::Parser;
use dupsweep::cli::Cli;
use dupsweep::dedup::DedupError;
use dupsweep::error::ExitCode;
use std::fs;
use tempfile::tempdir;

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["dupsweep", "--quiet", "--no-color", "--output", "json"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_run_app_success() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();

    let path = dir.path().to_str().unwrap();
    let code = dupsweep::run_app(cli(&[path])).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(!dir.path().join("b.txt").exists());
}

#[test]
fn test_run_app_dry_run_keeps_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();

    let path = dir.path().to_str().unwrap();
    let code = dupsweep::run_app(cli(&["--dry-run", "--io-threads", "2", path])).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("b.txt").exists());
}

#[test]
fn test_run_app_missing_root_maps_to_invalid_root() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let err = dupsweep::run_app(cli(&[missing.to_str().unwrap()])).unwrap_err();
    let dedup_err = err.downcast_ref::<DedupError>().unwrap();

    assert!(dedup_err.is_invalid_root());
}
