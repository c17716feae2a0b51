//! Concurrent directory-scanning engine for skiff.
//!
//! This crate turns "list this directory" into a cancellable,
//! progress-reporting asynchronous operation:
//!
//! - **Backends** — interchangeable traversal strategies behind one
//!   trait: the portable `read_dir` backend plus runtime-probed
//!   accelerators (jwalk, Linux getdents64).
//! - **[`BackendRegistry`]** — resolves a requested mode to an available
//!   backend, falling back to portable rather than failing.
//! - **[`DirScanner`]** — one scan, one worker thread, an explicit
//!   state machine with snapshot reads, blocking waits and advisory
//!   cancellation.
//! - **[`ParallelScanner`]** — scans many directories under a bounded
//!   worker pool with per-path failure isolation.
//! - **[`ScanTask`]** / **[`ScanFuture`]** — the same scan exposed to
//!   async/await callers and to promise-chain callers.
//!
//! # Example
//!
//! ```rust,no_run
//! use skiff_scan::{BackendRegistry, DirScanner};
//!
//! let mut scanner = DirScanner::new(BackendRegistry::default());
//! scanner.start_async("/var/log").unwrap();
//! let entries = scanner.wait(None).unwrap();
//! println!("{} entries", entries.len());
//! scanner.close();
//! ```
//!
//! # Async
//!
//! ```rust,no_run
//! use skiff_scan::{BackendRegistry, ScanTask};
//!
//! # async fn demo() -> Result<(), skiff_scan::ScanError> {
//! let registry = BackendRegistry::default();
//! let mut docs = ScanTask::spawn(&registry, "/home/user/docs")?;
//! let mut mail = ScanTask::spawn(&registry, "/home/user/mail")?;
//! let (docs, mail) = tokio::join!(docs.wait(), mail.wait());
//! # Ok(())
//! # }
//! ```

mod backend;
mod future;
#[cfg(target_os = "linux")]
mod getdents;
mod orchestrator;
mod progress;
mod registry;
mod scanner;
mod task;
mod walk;

pub use backend::{Backend, ReadDirBackend, ScanControl};
pub use future::{ScanFuture, scan_async};
#[cfg(target_os = "linux")]
pub use getdents::GetdentsBackend;
pub use orchestrator::{EntryFilter, ParallelScanResult, ParallelScanner};
pub use progress::ScanProgress;
pub use registry::{BackendMode, BackendRegistry};
pub use scanner::{DirScanner, ScanState};
pub use task::ScanTask;
pub use walk::JwalkBackend;

// Re-export core types for convenience
pub use skiff_core::{Entry, EntryKind, ScanError};
