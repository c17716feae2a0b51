//! Cooperative (async/await) adapter over [`DirScanner`].
//!
//! Awaiting a [`ScanTask`] suspends the current tokio task on the
//! scanner's watch channel instead of blocking a thread. True
//! parallelism still comes from each scanner's own worker; the runtime
//! only multiplexes the waiting.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use skiff_core::{Entry, ScanError};

use crate::backend::Backend;
use crate::progress::ScanProgress;
use crate::registry::BackendRegistry;
use crate::scanner::{DirScanner, ScanState};

/// Interval between progress checks while suspended.
const PROGRESS_TICK: Duration = Duration::from_millis(50);

/// One scan, awaitable from a cooperative scheduler.
pub struct ScanTask {
    scanner: DirScanner,
    state_rx: watch::Receiver<ScanState>,
}

impl ScanTask {
    /// Start scanning `path` and return the awaitable task.
    pub fn spawn(
        registry: &BackendRegistry,
        path: impl Into<PathBuf>,
    ) -> Result<Self, ScanError> {
        Self::start(DirScanner::new(registry.clone()), path)
    }

    /// Start a task over a specific backend.
    pub fn spawn_with_backend(
        backend: Arc<dyn Backend>,
        path: impl Into<PathBuf>,
    ) -> Result<Self, ScanError> {
        Self::start(DirScanner::with_backend(backend), path)
    }

    fn start(mut scanner: DirScanner, path: impl Into<PathBuf>) -> Result<Self, ScanError> {
        scanner.start_async(path)?;
        let state_rx = scanner.subscribe();
        Ok(Self { scanner, state_rx })
    }

    /// Non-blocking state snapshot.
    pub fn state(&self) -> ScanState {
        self.scanner.state()
    }

    /// Non-blocking progress snapshot.
    pub fn progress(&self) -> ScanProgress {
        self.scanner.progress()
    }

    /// Request cancellation; the awaiting task resumes with
    /// `Err(Cancelled)` once the worker observes it.
    pub fn cancel(&self) {
        self.scanner.cancel();
    }

    /// Suspend until the scan reaches a terminal state.
    pub async fn wait(&mut self) -> Result<Vec<Entry>, ScanError> {
        loop {
            let state = *self.state_rx.borrow_and_update();
            if state.is_terminal() {
                return self.settle();
            }
            if self.state_rx.changed().await.is_err() {
                return Err(ScanError::other("scan worker disappeared"));
            }
        }
    }

    /// Suspend until the scan finishes or `timeout` elapses. A timeout
    /// leaves the scan running; the task can be awaited again.
    pub async fn wait_timeout(&mut self, timeout: Duration) -> Result<Vec<Entry>, ScanError> {
        match tokio::time::timeout(timeout, self.wait()).await {
            Ok(result) => result,
            Err(_) => Err(ScanError::Timeout),
        }
    }

    /// Suspend until the scan finishes, invoking `on_progress` at each
    /// resumption point where the snapshot changed.
    pub async fn wait_with_progress<F>(&mut self, mut on_progress: F) -> Result<Vec<Entry>, ScanError>
    where
        F: FnMut(ScanProgress),
    {
        let mut ticker = tokio::time::interval(PROGRESS_TICK);
        let mut last: Option<ScanProgress> = None;
        loop {
            let snapshot = self.scanner.progress();
            if last != Some(snapshot) {
                on_progress(snapshot);
                last = Some(snapshot);
            }

            let state = *self.state_rx.borrow_and_update();
            if state.is_terminal() {
                return self.settle();
            }

            tokio::select! {
                changed = self.state_rx.changed() => {
                    if changed.is_err() {
                        return Err(ScanError::other("scan worker disappeared"));
                    }
                }
                _ = ticker.tick() => {}
            }
        }
    }

    /// Release the underlying scanner.
    pub fn close(mut self) {
        self.scanner.close();
    }

    /// Resolve a terminal scanner without blocking.
    fn settle(&self) -> Result<Vec<Entry>, ScanError> {
        self.scanner.wait(Some(Duration::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BackendMode;
    use crate::testing::SlowBackend;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    fn registry() -> BackendRegistry {
        BackendRegistry::new(BackendMode::Portable)
    }

    fn create_test_dir(files: usize) -> TempDir {
        let temp = TempDir::new().unwrap();
        for i in 0..files {
            fs::write(temp.path().join(format!("f{i}.txt")), "x").unwrap();
        }
        temp
    }

    #[tokio::test]
    async fn test_await_yields_entries() {
        let temp = create_test_dir(6);
        let mut task = ScanTask::spawn(&registry(), temp.path()).unwrap();
        let entries = task.wait().await.unwrap();
        assert_eq!(entries.len(), 6);
        task.close();
    }

    #[tokio::test]
    async fn test_failure_surfaces_at_await() {
        let mut task = ScanTask::spawn(&registry(), "/nonexistent/skiff-test").unwrap();
        let err = task.wait().await.unwrap_err();
        assert!(matches!(err, ScanError::NotFound { .. }));
        task.close();
    }

    #[tokio::test]
    async fn test_two_tasks_overlap() {
        let step = Duration::from_millis(10);
        let mut a = ScanTask::spawn_with_backend(Arc::new(SlowBackend::steps(20, step)), "a")
            .unwrap();
        let mut b = ScanTask::spawn_with_backend(Arc::new(SlowBackend::steps(20, step)), "b")
            .unwrap();

        let started = Instant::now();
        let (ra, rb) = tokio::join!(a.wait(), b.wait());
        let elapsed = started.elapsed();

        assert!(ra.is_ok());
        assert!(rb.is_ok());
        // Both scans take ~200ms each; run together they should finish
        // in far less than the 400ms a serial execution needs.
        assert!(elapsed < Duration::from_millis(390), "elapsed: {elapsed:?}");
        a.close();
        b.close();
    }

    #[tokio::test]
    async fn test_timeout_leaves_scan_running() {
        let mut task = ScanTask::spawn_with_backend(
            Arc::new(SlowBackend::steps(30, Duration::from_millis(20))),
            "slow",
        )
        .unwrap();

        let err = task.wait_timeout(Duration::from_millis(40)).await.unwrap_err();
        assert_eq!(err, ScanError::Timeout);
        assert_eq!(task.state(), ScanState::Scanning);

        let entries = task.wait().await.unwrap();
        assert!(!entries.is_empty());
        task.close();
    }

    #[tokio::test]
    async fn test_cancel_unblocks_waiter() {
        let mut task = ScanTask::spawn_with_backend(
            Arc::new(SlowBackend::steps(100, Duration::from_millis(10))),
            "slow",
        )
        .unwrap();

        task.cancel();
        let err = task.wait().await.unwrap_err();
        assert_eq!(err, ScanError::Cancelled);
        task.close();
    }

    #[tokio::test]
    async fn test_progress_observed_at_resumption_points() {
        let mut task = ScanTask::spawn_with_backend(
            Arc::new(SlowBackend::steps(8, Duration::from_millis(15))),
            "slow",
        )
        .unwrap();

        let mut snapshots = Vec::new();
        let entries = task
            .wait_with_progress(|p| snapshots.push(p))
            .await
            .unwrap();
        assert!(!entries.is_empty());
        assert!(!snapshots.is_empty());
        for pair in snapshots.windows(2) {
            assert!(pair[1].current >= pair[0].current);
        }
        task.close();
    }
}
