//! End-to-end tests driving the whole engine through its public API.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use skiff_scan::{
    BackendMode, BackendRegistry, DirScanner, Entry, ParallelScanner, ScanError, ScanState,
    ScanTask, scan_async,
};

/// Directory with 3 files, 2 subdirectories and 1 dotfile.
fn create_sample_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("alpha.txt"), "alpha").unwrap();
    fs::write(root.join("beta.log"), "beta beta").unwrap();
    fs::write(root.join("gamma.rs"), "fn main() {}").unwrap();
    fs::create_dir(root.join("src")).unwrap();
    fs::create_dir(root.join("docs")).unwrap();
    fs::write(root.join(".gitignore"), "target/").unwrap();

    temp
}

fn registry() -> BackendRegistry {
    BackendRegistry::new(BackendMode::Auto)
}

#[test]
fn test_scan_returns_all_immediate_children() {
    let temp = create_sample_dir();
    let mut scanner = DirScanner::new(registry());
    scanner.start_async(temp.path()).unwrap();

    let entries = scanner.wait(None).unwrap();
    assert_eq!(entries.len(), 6);
    for entry in &entries {
        assert_eq!(entry.hidden, entry.name.starts_with('.'));
    }
    assert_eq!(entries.iter().filter(|e| e.is_dir()).count(), 2);
    scanner.close();
}

#[test]
fn test_limited_scan_respects_bound() {
    let temp = create_sample_dir();
    let mut scanner = DirScanner::new(registry()).with_limit(3);
    scanner.start_async(temp.path()).unwrap();

    let entries = scanner.wait(None).unwrap();
    assert!(entries.len() <= 3);
    scanner.close();
}

#[test]
fn test_missing_directory_fails_with_not_found() {
    let mut scanner = DirScanner::new(registry());
    scanner.start_async("/nonexistent/x").unwrap();

    let err = scanner.wait(None).unwrap_err();
    assert!(matches!(err, ScanError::NotFound { .. }));
    assert_eq!(scanner.state(), ScanState::Failed);
    scanner.close();
}

#[test]
fn test_start_async_latency_independent_of_size() {
    let temp = TempDir::new().unwrap();
    for i in 0..3000 {
        fs::write(temp.path().join(format!("file-{i:04}")), "x").unwrap();
    }

    let mut scanner = DirScanner::new(registry());
    let started = Instant::now();
    scanner.start_async(temp.path()).unwrap();
    let launch = started.elapsed();
    assert!(launch < Duration::from_secs(1), "start took {launch:?}");

    let entries = scanner.wait(None).unwrap();
    assert_eq!(entries.len(), 3000);
    scanner.close();
}

#[test]
fn test_every_backend_mode_scans() {
    let temp = create_sample_dir();
    for mode in ["portable", "jwalk", "getdents", "auto", "bogus"] {
        let registry = BackendRegistry::from_mode_str(mode);
        let mut scanner = DirScanner::new(registry);
        scanner.start_async(temp.path()).unwrap();
        let entries = scanner.wait(None).unwrap();
        assert_eq!(entries.len(), 6, "mode {mode}");
        scanner.close();
    }
}

#[test]
fn test_batch_with_one_bad_path() {
    let temp = create_sample_dir();
    let paths = vec![
        temp.path().to_path_buf(),
        PathBuf::from("/nonexistent/x"),
        temp.path().join("src"),
    ];

    let results = ParallelScanner::new(registry())
        .with_max_workers(2)
        .scan_all(&paths);

    assert_eq!(results.len(), 3);
    assert!(results[0].success);
    assert_eq!(results[0].entries.len(), 6);
    assert!(!results[1].success);
    assert!(results[2].success);
    assert_eq!(results[2].entries.len(), 0);
}

#[test]
fn test_merged_batch_skips_failures() {
    let temp = create_sample_dir();
    let paths = vec![
        temp.path().to_path_buf(),
        PathBuf::from("/nonexistent/x"),
    ];

    let merged = ParallelScanner::new(registry()).scan_all_merged(&paths, None);
    assert_eq!(merged.len(), 6);

    let visible = |entry: &Entry| !entry.hidden;
    let filtered = ParallelScanner::new(registry()).scan_all_merged(&paths, Some(&visible));
    assert_eq!(filtered.len(), 5);
}

#[test]
fn test_promise_chain_end_to_end() {
    let temp = create_sample_dir();
    let mut future = scan_async(&registry(), temp.path())
        .then(|entries| Ok(entries.into_iter().filter(|e| !e.hidden).collect()))
        .then(|mut entries| {
            entries.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(entries)
        });

    let entries = future.wait().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].name.as_str(), "alpha.txt");
    assert!(future.scanner_closed());
}

#[tokio::test]
async fn test_cooperative_scans_share_a_scheduler() {
    let temp_a = create_sample_dir();
    let temp_b = create_sample_dir();
    let registry = registry();

    let mut a = ScanTask::spawn(&registry, temp_a.path()).unwrap();
    let mut b = ScanTask::spawn(&registry, temp_b.path()).unwrap();

    let (ra, rb) = tokio::join!(a.wait(), b.wait());
    assert_eq!(ra.unwrap().len(), 6);
    assert_eq!(rb.unwrap().len(), 6);
    a.close();
    b.close();
}
