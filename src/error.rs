/// Crate-level error types for ccmark.
use std::path::PathBuf;

/// Every failure names the file or reason involved so it can be reported
/// without a debugger. Only I/O and configuration can fail: classifying a
/// loaded buffer is total.
#[allow(clippy::error_impl_error, reason = "crate-level error type re-exported as ccmark::Error")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An explicitly requested config file does not exist on disk.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// A source file could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        /// File that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A rendered output file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    FileWrite {
        /// File that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped serde_json error.
        #[from]
        serde_json::Error,
    ),

    /// A workspace operation named a file that was never added.
    #[error("not tracked: {}", path.display())]
    NotTracked {
        /// The unknown file.
        path: PathBuf,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The filesystem watcher could not be set up.
    #[error("watch: {reason}")]
    Watch {
        /// Description of the watcher failure.
        reason: String,
    },
}
