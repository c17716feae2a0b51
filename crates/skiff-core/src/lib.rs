//! Core types for skiff.
//!
//! This crate defines the model shared by the scanning engine and the UI:
//! the [`Entry`] snapshot record, the [`ScanError`] taxonomy, and
//! presentation-side [`ListingOptions`]. It has no I/O of its own.

mod config;
mod entry;
mod error;

pub use config::{ListingOptions, ListingOptionsBuilder};
pub use entry::{Entry, EntryKind};
pub use error::ScanError;
