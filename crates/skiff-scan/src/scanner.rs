//! Asynchronous single-directory scanner.
//!
//! A [`DirScanner`] runs one backend invocation on its own worker thread
//! and exposes the lifecycle as an explicit state machine. Callers poll
//! snapshots (`state`, `progress`), block on the `wait` family, or
//! subscribe to a watch channel for async integration.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tokio::sync::watch;
use tracing::{debug, warn};

use skiff_core::{Entry, ScanError};

use crate::backend::{Backend, ScanControl};
use crate::progress::ScanProgress;
use crate::registry::BackendRegistry;

/// Lifecycle state of a [`DirScanner`].
///
/// `Done`, `Cancelled` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Created, not yet started.
    #[default]
    Idle,
    /// Worker running.
    Scanning,
    /// Completed normally; the entry list is final.
    Done,
    /// The worker observed the cancellation flag.
    Cancelled,
    /// The backend failed; the error is stored.
    Failed,
}

impl ScanState {
    /// Check whether this state ends the scan.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScanState::Done | ScanState::Cancelled | ScanState::Failed
        )
    }
}

/// Condvar slice used by the blocking wait family between snapshots.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How long `close` waits for a cancelled worker before detaching it.
const CLOSE_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// State shared between the scanner handle and its worker thread.
struct Shared {
    state: Mutex<ScanState>,
    state_changed: Condvar,
    control: ScanControl,
    entries: Mutex<Vec<Entry>>,
    error: Mutex<Option<ScanError>>,
    state_tx: watch::Sender<ScanState>,
}

impl Shared {
    fn new() -> Self {
        let (state_tx, _) = watch::channel(ScanState::Idle);
        Self {
            state: Mutex::new(ScanState::Idle),
            state_changed: Condvar::new(),
            control: ScanControl::new(),
            entries: Mutex::new(Vec::new()),
            error: Mutex::new(None),
            state_tx,
        }
    }

    fn transition(&self, next: ScanState) {
        {
            let mut state = self.state.lock();
            *state = next;
            self.state_changed.notify_all();
        }
        // send_replace publishes even with no subscribers yet, so a
        // receiver created later still observes the terminal state.
        self.state_tx.send_replace(next);
    }
}

/// One asynchronous scan of one directory.
///
/// Created per scan request; `start_async` may be called once. The
/// scanner must be closed to release its worker; [`DirScanner::close`]
/// is idempotent and callable from any state, and `Drop` closes as a
/// backstop.
pub struct DirScanner {
    registry: BackendRegistry,
    fixed_backend: Option<Arc<dyn Backend>>,
    limit: Option<usize>,
    shared: Arc<Shared>,
    worker: Option<thread::JoinHandle<()>>,
    closed: bool,
}

impl DirScanner {
    /// Create a scanner that resolves its backend from `registry` at
    /// start time.
    pub fn new(registry: BackendRegistry) -> Self {
        Self {
            registry,
            fixed_backend: None,
            limit: None,
            shared: Arc::new(Shared::new()),
            worker: None,
            closed: false,
        }
    }

    /// Create a scanner bound to a specific backend, bypassing registry
    /// resolution.
    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        let mut scanner = Self::new(BackendRegistry::default());
        scanner.fixed_backend = Some(backend);
        scanner
    }

    /// Stop the scan after this many entries.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Non-blocking state snapshot.
    pub fn state(&self) -> ScanState {
        *self.shared.state.lock()
    }

    /// Non-blocking progress snapshot.
    pub fn progress(&self) -> ScanProgress {
        self.shared.control.progress()
    }

    /// Subscribe to state transitions. Used by async callers to await
    /// completion without blocking a thread.
    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.shared.state_tx.subscribe()
    }

    /// Whether the worker thread is still attached and running.
    pub fn worker_alive(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Start scanning `path` on a new worker thread.
    ///
    /// Valid only from `Idle`; returns before the scan completes, no
    /// matter how large the directory is. Scan failures never surface
    /// here — they land in the `Failed` state for `wait` to report.
    pub fn start_async(&mut self, path: impl Into<PathBuf>) -> Result<(), ScanError> {
        if self.closed {
            return Err(ScanError::invalid_state("scanner is closed"));
        }
        {
            let mut state = self.shared.state.lock();
            if *state != ScanState::Idle {
                return Err(ScanError::invalid_state(format!(
                    "scan already started (state: {:?})",
                    *state
                )));
            }
            *state = ScanState::Scanning;
        }
        self.shared.state_tx.send_replace(ScanState::Scanning);

        let backend = match &self.fixed_backend {
            Some(backend) => Arc::clone(backend),
            None => self.registry.resolve(),
        };
        let path = path.into();
        let limit = self.limit;
        let shared = Arc::clone(&self.shared);

        let handle = thread::Builder::new()
            .name("skiff-scan".into())
            .spawn(move || {
                debug!(path = %path.display(), backend = backend.id(), "scan started");
                let result = match limit {
                    Some(max) => backend.scan_limited(&path, max, &shared.control),
                    None => backend.scan(&path, &shared.control),
                };
                let next = match result {
                    Ok(list) => {
                        debug!(path = %path.display(), entries = list.len(), "scan finished");
                        *shared.entries.lock() = list;
                        ScanState::Done
                    }
                    Err(ScanError::Cancelled) => {
                        debug!(path = %path.display(), "scan cancelled");
                        ScanState::Cancelled
                    }
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "scan failed");
                        *shared.error.lock() = Some(err);
                        ScanState::Failed
                    }
                };
                shared.transition(next);
            })
            .map_err(|e| ScanError::other(format!("failed to spawn scan worker: {e}")))?;

        self.worker = Some(handle);
        Ok(())
    }

    /// Block until the scan reaches a terminal state or `timeout`
    /// elapses.
    ///
    /// `Done` returns a clone of the final entry list (identical on
    /// every call). `Failed` re-raises the stored error. A timeout
    /// raises [`ScanError::Timeout`] without touching the scan, which
    /// keeps running and can be waited on again.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<Vec<Entry>, ScanError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.shared.state.lock();
        loop {
            match *state {
                ScanState::Idle => return Err(ScanError::invalid_state("scan not started")),
                ScanState::Done => {
                    drop(state);
                    return Ok(self.shared.entries.lock().clone());
                }
                ScanState::Cancelled => return Err(ScanError::Cancelled),
                ScanState::Failed => {
                    drop(state);
                    let stored = self.shared.error.lock().clone();
                    return Err(stored.unwrap_or(ScanError::other("scan failed")));
                }
                ScanState::Scanning => {}
            }

            match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(ScanError::Timeout);
                    }
                    self.shared
                        .state_changed
                        .wait_for(&mut state, deadline - now);
                }
                None => self.shared.state_changed.wait(&mut state),
            }
        }
    }

    /// Like [`DirScanner::wait`], polling at a short fixed interval and
    /// invoking `on_progress` on the calling thread whenever the
    /// snapshot changes. An `Err` from the callback stops polling and
    /// propagates; the scan itself keeps running.
    pub fn wait_with_progress<F>(
        &self,
        timeout: Option<Duration>,
        mut on_progress: F,
    ) -> Result<Vec<Entry>, ScanError>
    where
        F: FnMut(ScanProgress) -> Result<(), ScanError>,
    {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut last: Option<ScanProgress> = None;
        loop {
            let snapshot = self.shared.control.progress();
            if last != Some(snapshot) {
                on_progress(snapshot)?;
                last = Some(snapshot);
            }

            let mut state = self.shared.state.lock();
            match *state {
                ScanState::Idle => return Err(ScanError::invalid_state("scan not started")),
                ScanState::Done => {
                    drop(state);
                    return Ok(self.shared.entries.lock().clone());
                }
                ScanState::Cancelled => return Err(ScanError::Cancelled),
                ScanState::Failed => {
                    drop(state);
                    let stored = self.shared.error.lock().clone();
                    return Err(stored.unwrap_or(ScanError::other("scan failed")));
                }
                ScanState::Scanning => {}
            }

            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(ScanError::Timeout);
                    }
                    WAIT_POLL_INTERVAL.min(deadline - now)
                }
                None => WAIT_POLL_INTERVAL,
            };
            self.shared.state_changed.wait_for(&mut state, slice);
        }
    }

    /// Request cancellation. Advisory and eventual: the state reports
    /// `Cancelled` once the worker observes the flag. A no-op on an
    /// already-terminal scanner.
    pub fn cancel(&self) {
        if self.state() == ScanState::Scanning {
            self.shared.control.request_cancel();
        }
    }

    /// Close the scanner, releasing the worker. Idempotent, callable
    /// from any state, never fails. If the scan is still running this
    /// cancels it and waits a bounded time for the worker to stop.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        {
            let mut state = self.shared.state.lock();
            if *state == ScanState::Scanning {
                self.shared.control.request_cancel();
                self.shared
                    .state_changed
                    .wait_while_for(&mut state, |s| !s.is_terminal(), CLOSE_JOIN_TIMEOUT);
            }
        }

        if let Some(handle) = self.worker.take() {
            if self.state().is_terminal() {
                let _ = handle.join();
            } else {
                // Backend stuck past the deadline; leave the thread to
                // finish on its own rather than blocking the caller.
                warn!("scan worker did not stop in time, detaching");
            }
        }
    }

    /// Whether [`DirScanner::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for DirScanner {
    fn drop(&mut self) {
        self.close();
    }
}
