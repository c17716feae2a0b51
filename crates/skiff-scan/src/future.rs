//! Promise-style adapter: chainable continuations with auto-release.
//!
//! A [`ScanFuture`] is a pending handle over one scan. Continuations
//! registered with [`ScanFuture::then`] compose left to right, each
//! seeing the previous stage's output. Resolving the chain closes the
//! underlying scanner exactly once — success or error — so a caller who
//! never calls `close` cannot leak the worker.

use std::path::PathBuf;
use std::sync::Arc;

use skiff_core::{Entry, ScanError};

use crate::backend::Backend;
use crate::registry::BackendRegistry;
use crate::scanner::DirScanner;

type Stage = Box<dyn FnOnce(Vec<Entry>) -> Result<Vec<Entry>, ScanError> + Send>;

/// Start a scan and return its pending handle.
pub fn scan_async(registry: &BackendRegistry, path: impl Into<PathBuf>) -> ScanFuture {
    ScanFuture::spawn(registry, path)
}

/// Pending result of a scan plus its continuation chain.
pub struct ScanFuture {
    scanner: Option<DirScanner>,
    stages: Vec<Stage>,
    outcome: Option<Result<Vec<Entry>, ScanError>>,
}

impl ScanFuture {
    /// Start scanning `path` through `registry`.
    pub fn spawn(registry: &BackendRegistry, path: impl Into<PathBuf>) -> Self {
        Self::start(DirScanner::new(registry.clone()), path)
    }

    /// Start a future over a specific backend.
    pub fn spawn_with_backend(backend: Arc<dyn Backend>, path: impl Into<PathBuf>) -> Self {
        Self::start(DirScanner::with_backend(backend), path)
    }

    fn start(mut scanner: DirScanner, path: impl Into<PathBuf>) -> Self {
        match scanner.start_async(path) {
            Ok(()) => Self {
                scanner: Some(scanner),
                stages: Vec::new(),
                outcome: None,
            },
            // Cannot happen for a freshly created scanner, but a failed
            // start still has to surface at `wait`, never here.
            Err(err) => Self {
                scanner: None,
                stages: Vec::new(),
                outcome: Some(Err(err)),
            },
        }
    }

    /// Register a continuation over the eventual entry list. Returns the
    /// extended pending handle.
    pub fn then<F>(mut self, stage: F) -> Self
    where
        F: FnOnce(Vec<Entry>) -> Result<Vec<Entry>, ScanError> + Send + 'static,
    {
        self.stages.push(Box::new(stage));
        self
    }

    /// Request cancellation of the underlying scan.
    pub fn cancel(&self) {
        if let Some(scanner) = &self.scanner {
            scanner.cancel();
        }
    }

    /// Resolve the chain: block until the scan settles, release the
    /// scanner, then run the continuations in registration order.
    ///
    /// A scanner error or a stage error short-circuits every later
    /// stage and is returned. Calling `wait` again replays the settled
    /// outcome (running any stages registered since).
    pub fn wait(&mut self) -> Result<Vec<Entry>, ScanError> {
        if self.outcome.is_none() {
            let result = match self.scanner.as_ref() {
                Some(scanner) => scanner.wait(None),
                None => Err(ScanError::other("scan never started")),
            };
            // The settle hook: exactly one close, before continuations
            // get a chance to fail.
            if let Some(mut scanner) = self.scanner.take() {
                scanner.close();
            }
            self.outcome = Some(result);
        }

        let mut current = self
            .outcome
            .take()
            .unwrap_or_else(|| Err(ScanError::other("scan never started")));

        for stage in self.stages.drain(..) {
            current = match current {
                Ok(entries) => stage(entries),
                Err(err) => Err(err),
            };
        }

        self.outcome = Some(current.clone());
        current
    }

    /// Whether the underlying scan has settled.
    pub fn is_settled(&self) -> bool {
        self.outcome.is_some()
    }

    /// Whether the underlying scanner has been released.
    pub fn scanner_closed(&self) -> bool {
        self.scanner.is_none()
    }
}

// The scanner's own Drop closes the worker if the chain is abandoned
// before `wait`; nothing else to release here.
