//! Error types for archive operations

use thiserror::Error;

/// Errors that can occur while loading a backup container
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The input matches neither the ZIP nor the GZIP signature
    #[error("Unsupported archive format (expected ZIP or GZIP-compressed TAR)")]
    UnsupportedFormat,

    /// IO error while reading entries
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid ZIP archive format
    #[error("Invalid ZIP archive: {0}")]
    InvalidZip(#[from] zip::result::ZipError),

    /// Archive entry is password-protected
    #[error("Archive entry '{name}' is password-protected")]
    PasswordProtected {
        /// Name of the encrypted entry
        name: String,
    },

    /// File content is not valid UTF-8 where text was expected
    #[error("File '{path}' is not valid UTF-8")]
    InvalidUtf8 {
        /// Full path of the file inside the archive
        path: String,
    },
}

/// Result type for archive operations
pub type Result<T> = std::result::Result<T, ArchiveError>;
