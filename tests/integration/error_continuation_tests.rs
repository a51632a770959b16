use dupsweep::dedup::{DedupConfig, DedupError, Deduplicator, FailureKind};
use dupsweep::output::NullReporter;
use dupsweep::progress::ProgressCallback;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

/// Removes one file from disk as soon as the driver reaches it, so its
/// deletion fails no matter which user runs the tests.
struct VanishOnVisit {
    target: PathBuf,
}

impl ProgressCallback for VanishOnVisit {
    fn on_phase_start(&self, _phase: &str, _total: usize) {}

    fn on_progress(&self, _current: usize, path: &str) {
        if path == self.target.to_string_lossy() {
            fs::remove_file(&self.target).unwrap();
        }
    }

    fn on_phase_end(&self, _phase: &str) {}
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let err = Deduplicator::with_defaults()
        .run(&missing, &mut NullReporter)
        .unwrap_err();

    match err {
        DedupError::PathNotFound(path) => assert_eq!(path, missing),
        other => panic!("Expected PathNotFound, got: {:?}", other),
    }
}

#[test]
fn test_file_root_is_fatal() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, b"data").unwrap();

    let err = Deduplicator::with_defaults()
        .run(&file, &mut NullReporter)
        .unwrap_err();

    assert!(matches!(err, DedupError::NotADirectory(_)));
    assert!(file.exists());
}

#[test]
fn test_interrupted_run_deletes_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"dup").unwrap();
    fs::write(dir.path().join("b.txt"), b"dup").unwrap();

    let flag = Arc::new(AtomicBool::new(true));
    let dedup = Deduplicator::new(DedupConfig::default().with_shutdown_flag(flag));
    let result = dedup.run(dir.path(), &mut NullReporter).unwrap();

    assert!(result.interrupted);
    assert_eq!(result.duplicates_removed, 0);
    assert!(dir.path().join("b.txt").exists());
}

#[test]
fn test_failed_deletion_is_reported_and_run_continues() {
    let dir = tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt", "d.txt"] {
        fs::write(dir.path().join(name), b"same").unwrap();
    }
    let vanishing = dir.path().join("c.txt");

    let config = DedupConfig::default().with_progress_callback(Arc::new(VanishOnVisit {
        target: vanishing.clone(),
    }));
    let result = Deduplicator::new(config)
        .run(dir.path(), &mut NullReporter)
        .unwrap();

    // b.txt and d.txt are removed; c.txt fails in between
    assert_eq!(result.files_scanned, 4);
    assert_eq!(result.duplicates_removed, 2);
    assert_eq!(result.bytes_freed, 8);
    assert_eq!(result.failed_deletions, 1);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].kind, FailureKind::Delete);
    assert_eq!(result.failures[0].path, vanishing);
    assert!(result.has_failures());

    let failed: Vec<_> = result.duplicates.iter().filter(|p| !p.removed).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].path, vanishing);
    assert_eq!(failed[0].size, 0);

    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
    assert!(!dir.path().join("d.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_undeletable_duplicate_is_reported_and_not_credited() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(locked.join("b.txt"), b"same").unwrap();
    fs::write(dir.path().join("c.txt"), b"same").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users can delete from read-only directories anyway
    let probe = locked.join(".probe");
    if fs::write(&probe, b"").is_ok() {
        let _ = fs::remove_file(&probe);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = Deduplicator::with_defaults()
        .run(dir.path(), &mut NullReporter)
        .unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    // a.txt survives, c.txt is removed, locked/b.txt fails
    assert_eq!(result.duplicates_removed, 1);
    assert_eq!(result.bytes_freed, 4);
    assert_eq!(result.failed_deletions, 1);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].kind, FailureKind::Delete);
    assert_eq!(result.failures[0].path, locked.join("b.txt"));
    assert!(locked.join("b.txt").exists());
    assert!(!dir.path().join("c.txt").exists());

    let failed: Vec<_> = result.duplicates.iter().filter(|p| !p.removed).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].size, 0);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped_and_run_continues() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let secret = dir.path().join("b.txt");
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(&secret, b"same").unwrap();
    fs::write(dir.path().join("c.txt"), b"same").unwrap();
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read(&secret).is_ok() {
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();
        return;
    }

    let result = Deduplicator::with_defaults()
        .run(dir.path(), &mut NullReporter)
        .unwrap();
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(result.skipped_files, 1);
    assert_eq!(result.failures[0].kind, FailureKind::Read);
    assert_eq!(result.duplicates_removed, 1);
    assert!(secret.exists());
    assert!(!dir.path().join("c.txt").exists());
}
