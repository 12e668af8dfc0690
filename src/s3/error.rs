use thiserror::Error;

/// Errors that can occur while planning, cleaning up, or uploading objects.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Caller-fixable input problem: empty path list, blank path entry,
    /// or an empty upload plan.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Two inputs resolved to the same destination key.
    #[error("duplicate object key detected: {key}")]
    DuplicateKey { key: String },

    /// Overwrite is disabled and the destination key is already present.
    #[error("object {key} already exists and overwrite is disabled")]
    ObjectExists { key: String },

    /// Local filesystem failure (stat, open, traverse, read, seek).
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Storage transport failure not classifiable as not-found.
    #[error("{context}: {message}")]
    Storage { context: String, message: String },
}

/// Cleanup failure carrying the number of objects removed before the error.
///
/// Cleanup is not all-or-nothing: pages already deleted stay deleted, so the
/// partial count is reported alongside the underlying cause.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct CleanupError {
    pub removed: usize,
    #[source]
    pub source: SyncError,
}
