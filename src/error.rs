//! Error types for fginspect
//!
//! This module defines the crate-wide error type and the per-item failure
//! record used while enumerating geodatabase metadata.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using fginspect Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result of describing a single enumerated item
pub type ItemResult<T> = std::result::Result<T, ItemFailure>;

/// Main error type for fginspect operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The data source could not be opened or bound as a workspace
    #[error("workspace error: {0}")]
    Workspace(String),

    /// The catalog snapshot could not be parsed
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A named item does not exist in the workspace
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Kind of item (feature class, table, ...)
        kind: &'static str,
        /// Item name
        name: String,
    },

    /// The item exists but cannot be read
    #[error("'{name}' is unreadable: {reason}")]
    Unreadable {
        /// Item name
        name: String,
        /// Reason reported by the provider
        reason: String,
    },

    /// A record count is not an integer
    #[error("invalid record count: {0:?}")]
    InvalidCount(String),

    /// A listing wildcard could not be compiled
    #[error("wildcard error: {0}")]
    Wildcard(#[from] regex::Error),

    /// The report file exists and overwriting is disabled
    #[error("report file already exists: {}", .0.display())]
    ReportExists(PathBuf),
}

impl Error {
    /// Create a not-found error
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            name: name.into(),
        }
    }
}

/// Failure to describe one item during enumeration
///
/// Failures never reach the report; they are logged and the item is
/// omitted.
#[derive(Debug)]
pub struct ItemFailure {
    /// Name of the offending item
    pub item: String,
    /// Underlying error
    pub reason: Error,
}

impl ItemFailure {
    /// Create a new item failure
    pub fn new(item: impl Into<String>, reason: Error) -> Self {
        Self {
            item: item.into(),
            reason,
        }
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item, self.reason)
    }
}

impl std::error::Error for ItemFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}

/// Attach an item name to a provider result
pub trait ItemContext<T> {
    /// Convert the error into an [`ItemFailure`] for `item`
    fn for_item(self, item: &str) -> ItemResult<T>;
}

impl<T> ItemContext<T> for Result<T> {
    fn for_item(self, item: &str) -> ItemResult<T> {
        self.map_err(|e| ItemFailure::new(item, e))
    }
}

/// Log every failure and keep the successes, preserving order
pub fn settle<T>(results: impl IntoIterator<Item = ItemResult<T>>) -> Vec<T> {
    results
        .into_iter()
        .filter_map(|result| match result {
            Ok(value) => Some(value),
            Err(failure) => {
                log::error!("{}", failure.item);
                log::error!("An exception occurred: {}", failure.reason);
                None
            }
        })
        .collect()
}
