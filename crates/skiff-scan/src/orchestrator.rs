//! Parallel scan orchestrator.
//!
//! Runs many [`DirScanner`]s under a bounded worker pool. Paths start in
//! submission order as workers free up; each path's failure is isolated
//! into its own result and never aborts the batch.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use tracing::debug;

use skiff_core::{Entry, ScanError};

use crate::registry::BackendRegistry;
use crate::scanner::DirScanner;

/// Predicate applied to entries when merging batch results.
pub type EntryFilter = dyn Fn(&Entry) -> bool + Sync;

/// Outcome of scanning one path within a batch.
#[derive(Debug, Clone)]
pub struct ParallelScanResult {
    /// The requested path.
    pub path: PathBuf,
    /// Entries, empty unless the scan succeeded.
    pub entries: Vec<Entry>,
    /// Whether the scan completed normally.
    pub success: bool,
    /// The failure, if any.
    pub error: Option<ScanError>,
}

impl ParallelScanResult {
    fn ok(path: PathBuf, entries: Vec<Entry>) -> Self {
        Self {
            path,
            entries,
            success: true,
            error: None,
        }
    }

    fn failed(path: PathBuf, error: ScanError) -> Self {
        Self {
            path,
            entries: Vec::new(),
            success: false,
            error: Some(error),
        }
    }
}

/// Scans many directories concurrently, at most `max_workers` at a time.
#[derive(Debug, Clone)]
pub struct ParallelScanner {
    registry: BackendRegistry,
    max_workers: usize,
}

impl ParallelScanner {
    /// Create an orchestrator with a worker bound matching the host's
    /// available parallelism.
    pub fn new(registry: BackendRegistry) -> Self {
        let max_workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
        Self {
            registry,
            max_workers,
        }
    }

    /// Override the worker bound (clamped to at least 1).
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// The current worker bound.
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Scan every path, returning one result per path **in input
    /// order**. An empty input returns `[]` without spawning anything.
    pub fn scan_all(&self, paths: &[PathBuf]) -> Vec<ParallelScanResult> {
        self.run(paths, |_, _| {})
    }

    /// Like [`ParallelScanner::scan_all`], invoking `on_progress` with
    /// `(completed, total)` on the calling thread as each path finishes.
    pub fn scan_all_with_progress(
        &self,
        paths: &[PathBuf],
        on_progress: impl FnMut(usize, usize),
    ) -> Vec<ParallelScanResult> {
        self.run(paths, on_progress)
    }

    /// Flatten every successful result into one entry list, optionally
    /// filtered. Failed paths are simply omitted.
    pub fn scan_all_merged(&self, paths: &[PathBuf], filter: Option<&EntryFilter>) -> Vec<Entry> {
        self.scan_all(paths)
            .into_iter()
            .filter(|result| result.success)
            .flat_map(|result| result.entries)
            .filter(|entry| filter.is_none_or(|f| f(entry)))
            .collect()
    }

    fn run(
        &self,
        paths: &[PathBuf],
        mut on_complete: impl FnMut(usize, usize),
    ) -> Vec<ParallelScanResult> {
        if paths.is_empty() {
            return Vec::new();
        }

        let total = paths.len();
        let workers = self.max_workers.min(total);
        let cursor = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<(usize, ParallelScanResult)>();

        // Placeholders are overwritten as completions arrive; a worker
        // that dies mid-scan leaves a visible failure, not a hole.
        let mut results: Vec<ParallelScanResult> = paths
            .iter()
            .map(|p| ParallelScanResult::failed(p.clone(), ScanError::other("scan did not run")))
            .collect();

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let cursor = &cursor;
                let registry = &self.registry;
                scope.spawn(move || {
                    loop {
                        let index = cursor.fetch_add(1, Ordering::SeqCst);
                        if index >= total {
                            break;
                        }
                        let result = scan_one(registry.clone(), &paths[index]);
                        if tx.send((index, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(tx);

            let mut completed = 0;
            while let Ok((index, result)) = rx.recv() {
                results[index] = result;
                completed += 1;
                on_complete(completed, total);
            }
        });

        results
    }
}

/// Drive one scanner through its full lifecycle for a single path.
fn scan_one(registry: BackendRegistry, path: &Path) -> ParallelScanResult {
    let mut scanner = DirScanner::new(registry);
    if let Err(err) = scanner.start_async(path.to_path_buf()) {
        return ParallelScanResult::failed(path.to_path_buf(), err);
    }
    let outcome = scanner.wait(None);
    scanner.close();

    match outcome {
        Ok(entries) => ParallelScanResult::ok(path.to_path_buf(), entries),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "batch path failed");
            ParallelScanResult::failed(path.to_path_buf(), err)
        }
    }
}
