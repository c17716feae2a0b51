//! Backend registry and selection.
//!
//! A [`BackendRegistry`] is a small value injected into scanner and
//! orchestrator constructors; there is no process-wide mode singleton.
//! Requesting an unknown or unavailable backend never fails a scan — it
//! resolves to the portable backend.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::{Backend, ReadDirBackend};
#[cfg(target_os = "linux")]
use crate::getdents::GetdentsBackend;
use crate::walk::JwalkBackend;

/// Requested backend selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendMode {
    /// Pick the first available accelerator, else portable.
    #[default]
    Auto,
    /// Portable `read_dir` backend.
    Portable,
    /// JWalk parallel-stat accelerator.
    Jwalk,
    /// Linux getdents64 accelerator.
    Getdents,
}

impl FromStr for BackendMode {
    type Err = std::convert::Infallible;

    /// Unrecognized names resolve to `Portable` rather than failing;
    /// callers feeding config strings through here get a working scanner
    /// no matter what the string says.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "auto" => BackendMode::Auto,
            "portable" => BackendMode::Portable,
            "jwalk" => BackendMode::Jwalk,
            "getdents" => BackendMode::Getdents,
            other => {
                debug!(mode = other, "unknown backend mode, using portable");
                BackendMode::Portable
            }
        })
    }
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendMode::Auto => "auto",
            BackendMode::Portable => "portable",
            BackendMode::Jwalk => "jwalk",
            BackendMode::Getdents => "getdents",
        };
        f.write_str(name)
    }
}

/// Accelerators tried by `auto`, in priority order.
const AUTO_PRIORITY: &[BackendMode] = &[BackendMode::Getdents, BackendMode::Jwalk];

/// Resolves a requested [`BackendMode`] to a concrete [`Backend`].
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    mode: BackendMode,
}

impl BackendRegistry {
    /// Create a registry with the given mode.
    pub fn new(mode: BackendMode) -> Self {
        Self { mode }
    }

    /// Create a registry from a mode string (unknown strings become
    /// `portable`).
    pub fn from_mode_str(mode: &str) -> Self {
        let mode = mode.parse().unwrap_or(BackendMode::Portable);
        Self::new(mode)
    }

    /// The currently requested mode.
    pub fn mode(&self) -> BackendMode {
        self.mode
    }

    /// Change the requested mode. Affects scans started afterwards.
    pub fn set_mode(&mut self, mode: BackendMode) {
        self.mode = mode;
    }

    /// Resolve the mode to a backend. `Auto` picks the first available
    /// accelerator in priority order; an explicitly requested but
    /// unavailable accelerator falls back to portable.
    pub fn resolve(&self) -> Arc<dyn Backend> {
        match self.mode {
            BackendMode::Auto => {
                for mode in AUTO_PRIORITY {
                    if let Some(backend) = accelerator(*mode) {
                        if backend.available() {
                            debug!(backend = backend.id(), "auto-selected backend");
                            return backend;
                        }
                    }
                }
                Arc::new(ReadDirBackend::new())
            }
            BackendMode::Portable => Arc::new(ReadDirBackend::new()),
            requested => match accelerator(requested) {
                Some(backend) if backend.available() => backend,
                _ => {
                    warn!(mode = %requested, "requested backend unavailable, using portable");
                    Arc::new(ReadDirBackend::new())
                }
            },
        }
    }

    /// Capability map: every known backend id with its availability,
    /// portable first.
    pub fn available_backends(&self) -> Vec<(&'static str, bool)> {
        let mut backends: Vec<(&'static str, bool)> = vec![("portable", true)];
        for mode in AUTO_PRIORITY {
            match accelerator(*mode) {
                Some(backend) => backends.push((backend.id(), backend.available())),
                None => backends.push((mode_id(*mode), false)),
            }
        }
        backends
    }

    /// Opaque diagnostic string; not meant to be parsed.
    pub fn version(&self) -> String {
        let enabled: Vec<&str> = self
            .available_backends()
            .into_iter()
            .filter(|(_, available)| *available)
            .map(|(id, _)| id)
            .collect();
        format!(
            "skiff-scan {} (mode: {}, backends: {})",
            env!("CARGO_PKG_VERSION"),
            self.mode,
            enabled.join(", ")
        )
    }
}

/// Instantiate an accelerator backend, if it exists on this target.
fn accelerator(mode: BackendMode) -> Option<Arc<dyn Backend>> {
    match mode {
        BackendMode::Jwalk => Some(Arc::new(JwalkBackend::new())),
        #[cfg(target_os = "linux")]
        BackendMode::Getdents => Some(Arc::new(GetdentsBackend::new())),
        #[cfg(not(target_os = "linux"))]
        BackendMode::Getdents => None,
        _ => None,
    }
}

/// Static id for a mode whose backend is not compiled on this target.
fn mode_id(mode: BackendMode) -> &'static str {
    match mode {
        BackendMode::Auto => "auto",
        BackendMode::Portable => "portable",
        BackendMode::Jwalk => "jwalk",
        BackendMode::Getdents => "getdents",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_mode_parses_to_portable() {
        let mode: BackendMode = "turbo-9000".parse().unwrap();
        assert_eq!(mode, BackendMode::Portable);
        assert_eq!(
            BackendRegistry::from_mode_str("nonsense").mode(),
            BackendMode::Portable
        );
    }

    #[test]
    fn test_known_modes_parse() {
        assert_eq!("auto".parse::<BackendMode>().unwrap(), BackendMode::Auto);
        assert_eq!(
            "getdents".parse::<BackendMode>().unwrap(),
            BackendMode::Getdents
        );
        assert_eq!("jwalk".parse::<BackendMode>().unwrap(), BackendMode::Jwalk);
    }

    #[test]
    fn test_portable_always_available() {
        let backends = BackendRegistry::default().available_backends();
        assert_eq!(backends[0], ("portable", true));
    }

    #[test]
    fn test_capability_map_covers_all_accelerators() {
        let backends = BackendRegistry::default().available_backends();
        let ids: Vec<&str> = backends.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["portable", "getdents", "jwalk"]);
    }

    #[test]
    fn test_auto_resolves_to_something_usable() {
        let backend = BackendRegistry::new(BackendMode::Auto).resolve();
        assert!(backend.available());
    }

    #[test]
    fn test_explicit_portable() {
        let backend = BackendRegistry::new(BackendMode::Portable).resolve();
        assert_eq!(backend.id(), "portable");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_auto_prefers_getdents_on_linux() {
        let backend = BackendRegistry::new(BackendMode::Auto).resolve();
        assert_eq!(backend.id(), "getdents");
    }

    #[test]
    fn test_version_is_nonempty() {
        assert!(BackendRegistry::default().version().contains("skiff-scan"));
    }
}
