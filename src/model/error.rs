//! Error types for the log-ingestion core.
//!
//! The taxonomy is deliberately small. Malformed log lines are not errors:
//! the parsing pipeline degrades line-by-line (a bad line becomes "not a
//! data line") rather than aborting a whole-file parse. A missing log or
//! layout resource is recovered by substituting an empty result. Only
//! genuine I/O failures (permissions, disk errors) surface as [`InputError`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors encountered when reading the log source.
///
/// `FileNotFound` is distinguished from generic I/O failures because the
/// caller recovers from it differently: an absent log yields an empty
/// event stream (the dashboard simply shows nothing yet), while permission
/// or disk errors are surfaced to the operator.
#[derive(Debug, Error)]
pub enum InputError {
    /// The log file does not exist at the given path.
    ///
    /// **Recovery**: substitute an empty event stream and log at WARN.
    /// The source helpers do this automatically; the variant exists for
    /// callers that open the file directly.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The filesystem path that was not found.
        path: PathBuf,
    },

    /// Generic I/O error reading the log source.
    ///
    /// **Recovery**: none inside the core; propagate to the caller.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
