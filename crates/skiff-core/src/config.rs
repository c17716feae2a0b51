//! Listing configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::entry::Entry;

/// How a directory listing is presented to a consumer.
///
/// This is presentation-side configuration: the engine always returns every
/// immediate child of a directory, and these options are applied to the
/// snapshot afterwards.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ListingOptions {
    /// Include entries whose name starts with a dot.
    #[builder(default = "false")]
    #[serde(default)]
    pub show_hidden: bool,

    /// Group directories before everything else.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub dirs_first: bool,

    /// Truncate the listing after this many entries (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub limit: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl ListingOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(Some(0)) = self.limit {
            return Err("Listing limit must be at least 1".to_string());
        }
        Ok(())
    }
}

impl ListingOptions {
    /// Create a listing options builder.
    pub fn builder() -> ListingOptionsBuilder {
        ListingOptionsBuilder::default()
    }

    /// Apply hidden filtering, directory grouping and the limit to a
    /// scanned snapshot. Relative order within each group is preserved.
    pub fn apply(&self, entries: &mut Vec<Entry>) {
        if !self.show_hidden {
            entries.retain(|e| !e.hidden);
        }
        if self.dirs_first {
            entries.sort_by_key(|e| !e.is_dir());
        }
        if let Some(limit) = self.limit {
            entries.truncate(limit);
        }
    }
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            show_hidden: false,
            dirs_first: true,
            limit: None,
        }
    }
}
