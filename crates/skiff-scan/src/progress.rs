//! Scan progress reporting.

/// Progress snapshot for a single running scan.
///
/// Both counters are monotonically non-decreasing while the scan runs.
/// A `total` of 0 means the backend does not know the directory size up
/// front; only the portable backend pre-counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanProgress {
    /// Entries processed so far.
    pub current: u64,
    /// Total entries expected, or 0 if unknown.
    pub total: u64,
}

impl ScanProgress {
    /// Create an empty progress snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the backend reported a real total.
    pub fn has_known_total(&self) -> bool {
        self.total > 0
    }

    /// Completion ratio in `[0, 1]`, if the total is known.
    pub fn fraction(&self) -> Option<f64> {
        if self.has_known_total() {
            Some((self.current as f64 / self.total as f64).min(1.0))
        } else {
            None
        }
    }
}
