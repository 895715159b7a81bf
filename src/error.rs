/// Crate-level error types for the command database collaborator.
use std::path::PathBuf;

/// The analysis core itself never fails on malformed config text — cycles,
/// depth overruns, and unparsable statements are all modeled as data. The
/// only hard failures live at the edge: loading the JSON command database.
/// Each variant carries enough context to report without a debugger.
#[allow(clippy::error_impl_error, reason = "crate-level error type")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A database entry is missing required fields or has the wrong shape.
    #[error("invalid database entry at index {index}: {reason}")]
    DatabaseEntry {
        /// Position of the offending entry in the array.
        index: usize,
        /// Description of the shape mismatch.
        reason: String,
    },

    /// The database document parsed but is not a JSON array.
    #[error("command database is not a JSON array")]
    DatabaseNotArray,

    /// The database file does not exist on disk.
    #[error("database not found: {}", path.display())]
    DatabaseNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// The database document is not valid JSON at all.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON parse error.
        #[from]
        serde_json::Error,
    ),
}
