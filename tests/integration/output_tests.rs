use dupsweep::dedup::{DedupConfig, Deduplicator};
use dupsweep::output::{ConsoleReporter, JsonReporter};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_console_report_hello_world() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();
    fs::write(dir.path().join("c.txt"), b"world").unwrap();

    let mut reporter = ConsoleReporter::new(Vec::new(), false);
    Deduplicator::with_defaults()
        .run(dir.path(), &mut reporter)
        .unwrap();
    let out = String::from_utf8(reporter.into_inner()).unwrap();

    let expected = format!(
        "The folder exists: {root}\n\
         Duplicate found: {b} (same as {a})\n\
         \n\
         Total storage freed: 0.00 MB\n",
        root = dir.path().display(),
        a = dir.path().join("a.txt").display(),
        b = dir.path().join("b.txt").display(),
    );
    assert_eq!(out, expected);
}

#[test]
fn test_console_report_missing_root() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("gone");

    let mut reporter = ConsoleReporter::new(Vec::new(), false);
    assert!(Deduplicator::with_defaults()
        .run(&missing, &mut reporter)
        .is_err());
    let out = String::from_utf8(reporter.into_inner()).unwrap();

    assert_eq!(out, format!("The folder does not exist: {}\n", missing.display()));
}

#[test]
fn test_console_report_dry_run() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();

    let mut reporter = ConsoleReporter::new(Vec::new(), false);
    Deduplicator::new(DedupConfig::default().with_dry_run(true))
        .run(dir.path(), &mut reporter)
        .unwrap();
    let out = String::from_utf8(reporter.into_inner()).unwrap();

    assert!(out.contains("Duplicate found:"));
    assert!(out.ends_with("Total storage that would be freed: 0.00 MB (dry run)\n"));
    assert!(dir.path().join("b.txt").exists());
}

#[test]
fn test_json_report_document() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();
    fs::write(dir.path().join("c.txt"), b"world").unwrap();

    let mut reporter = JsonReporter::new(Vec::new());
    Deduplicator::with_defaults()
        .run(dir.path(), &mut reporter)
        .unwrap();
    let out = String::from_utf8(reporter.into_inner()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(value["root_exists"], true);
    assert_eq!(value["duplicates"].as_array().unwrap().len(), 1);
    assert_eq!(
        value["duplicates"][0]["fingerprint"],
        blake3::hash(b"hello").to_hex().as_str()
    );
    assert_eq!(value["duplicates"][0]["removed"], true);
    assert_eq!(value["summary"]["files_scanned"], 3);
    assert_eq!(value["summary"]["bytes_freed"], 5);
    assert_eq!(value["summary"]["exit_code_name"], "DS000");
}

#[test]
fn test_json_report_missing_root() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("gone");

    let mut reporter = JsonReporter::new(Vec::new());
    assert!(Deduplicator::with_defaults()
        .run(&missing, &mut reporter)
        .is_err());
    let out = String::from_utf8(reporter.into_inner()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(value["root"], missing.to_str().unwrap());
    assert_eq!(value["root_exists"], false);
    assert!(value["error"].as_str().unwrap().starts_with("Path not found"));
    assert_eq!(value["summary"]["files_scanned"], 0);
    assert_eq!(value["summary"]["exit_code"], 2);
}
