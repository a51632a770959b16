use dupsweep::dedup::{DedupConfig, Deduplicator};
use dupsweep::output::NullReporter;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

fn remaining(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = collect_files(root, root);
    names.sort();
    names
}

fn collect_files(root: &Path, dir: &Path) -> Vec<String> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            out.extend(collect_files(root, &path));
        } else {
            let rel = path.strip_prefix(root).unwrap();
            out.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
    out
}

#[test]
fn test_empty_directory() {
    let dir = tempdir().unwrap();
    let result = Deduplicator::with_defaults()
        .run(dir.path(), &mut NullReporter)
        .unwrap();

    assert_eq!(result.files_scanned, 0);
    assert_eq!(result.duplicates_removed, 0);
    assert_eq!(result.freed_mb_display(), "0.00");
}

#[test]
fn test_distinct_content_removes_nothing() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"content a");
    write(dir.path(), "b.txt", b"content b");
    write(dir.path(), "sub/c.txt", b"content c");

    let result = Deduplicator::with_defaults()
        .run(dir.path(), &mut NullReporter)
        .unwrap();

    assert_eq!(result.files_scanned, 3);
    assert_eq!(result.unique_files, 3);
    assert_eq!(result.duplicates_removed, 0);
    assert_eq!(remaining(dir.path()), vec!["a.txt", "b.txt", "sub/c.txt"]);
}

#[test]
fn test_identical_content_keeps_first_in_order() {
    let dir = tempdir().unwrap();
    write(dir.path(), "b/1.bin", b"payload");
    write(dir.path(), "a/2.bin", b"payload");
    write(dir.path(), "c.bin", b"payload");
    write(dir.path(), "a/1.bin", b"payload");

    let result = Deduplicator::with_defaults()
        .run(dir.path(), &mut NullReporter)
        .unwrap();

    assert_eq!(result.duplicates_removed, 3);
    assert_eq!(result.bytes_freed, 21);
    assert_eq!(remaining(dir.path()), vec!["a/1.bin"]);
    for pair in &result.duplicates {
        assert_eq!(pair.survivor, dir.path().join("a").join("1.bin"));
    }
}

#[test]
fn test_freed_total_is_sum_of_removed_sizes() {
    let dir = tempdir().unwrap();
    let big = vec![7u8; 3 * 1024 * 1024];
    write(dir.path(), "a.bin", &big);
    write(dir.path(), "b.bin", &big);
    write(dir.path(), "c.txt", b"x");
    write(dir.path(), "d.txt", b"x");

    let result = Deduplicator::with_defaults()
        .run(dir.path(), &mut NullReporter)
        .unwrap();

    let expected = big.len() as u64 + 1;
    assert_eq!(result.bytes_freed, expected);
    let sum: u64 = result.duplicates.iter().filter(|p| p.removed).map(|p| p.size).sum();
    assert_eq!(sum, expected);
    assert_eq!(result.freed_mb_display(), "3.00");
}

#[test]
fn test_second_run_is_idempotent() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"hello");
    write(dir.path(), "b.txt", b"hello");
    write(dir.path(), "c.txt", b"world");

    let dedup = Deduplicator::with_defaults();
    let first = dedup.run(dir.path(), &mut NullReporter).unwrap();
    assert_eq!(first.duplicates_removed, 1);

    let second = dedup.run(dir.path(), &mut NullReporter).unwrap();
    assert_eq!(second.duplicates_removed, 0);
    assert_eq!(second.freed_mb_display(), "0.00");
    assert_eq!(remaining(dir.path()), vec!["a.txt", "c.txt"]);
}

#[test]
fn test_empty_files_are_duplicates_of_each_other() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.empty", b"");
    write(dir.path(), "b.empty", b"");

    let result = Deduplicator::with_defaults()
        .run(dir.path(), &mut NullReporter)
        .unwrap();

    assert_eq!(result.duplicates_removed, 1);
    assert_eq!(result.bytes_freed, 0);
    assert_eq!(remaining(dir.path()), vec!["a.empty"]);
}

#[test]
fn test_dry_run_keeps_everything_and_credits_bytes() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"hello");
    write(dir.path(), "b.txt", b"hello");
    write(dir.path(), "c.txt", b"hello");

    let dedup = Deduplicator::new(DedupConfig::default().with_dry_run(true));
    let result = dedup.run(dir.path(), &mut NullReporter).unwrap();

    assert!(result.dry_run);
    assert_eq!(result.duplicates_removed, 2);
    assert_eq!(result.bytes_freed, 10);
    assert_eq!(remaining(dir.path()), vec!["a.txt", "b.txt", "c.txt"]);
}

#[test]
fn test_verify_mode_deletes_true_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"same");
    write(dir.path(), "b.txt", b"same");

    let dedup = Deduplicator::new(DedupConfig::default().with_verify(true));
    let result = dedup.run(dir.path(), &mut NullReporter).unwrap();

    assert_eq!(result.duplicates_removed, 1);
    assert_eq!(result.verify_mismatches, 0);
    assert_eq!(remaining(dir.path()), vec!["a.txt"]);
}

#[test]
fn test_small_chunk_size_gives_same_result() {
    let dir = tempdir().unwrap();
    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    write(dir.path(), "a.bin", &content);
    write(dir.path(), "b.bin", &content);

    let dedup = Deduplicator::new(DedupConfig::default().with_chunk_size(7));
    let result = dedup.run(dir.path(), &mut NullReporter).unwrap();

    assert_eq!(result.duplicates_removed, 1);
    assert_eq!(result.bytes_freed, 10_000);
}

#[test]
fn test_parallel_fingerprinting_same_survivors() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        write(
            dir.path(),
            &format!("dir{}/file{:02}.dat", i % 4, i),
            format!("group {}", i % 5).as_bytes(),
        );
    }

    let dedup = Deduplicator::new(
        DedupConfig::default()
            .with_io_threads(3)
            .with_batch_size(4),
    );
    let result = dedup.run(dir.path(), &mut NullReporter).unwrap();

    assert_eq!(result.unique_files, 5);
    assert_eq!(result.duplicates_removed, 25);
    assert_eq!(
        remaining(dir.path()),
        vec![
            "dir0/file00.dat",
            "dir0/file04.dat",
            "dir0/file08.dat",
            "dir0/file12.dat",
            "dir0/file16.dat",
        ]
    );
}
