//! Error types for course extraction and export

use mbz_archive::ArchiveError;
use thiserror::Error;

/// Errors that abort a backup conversion
///
/// Every variant is fatal: a conversion either produces a complete output
/// archive or fails with one of these. Activities that reference files
/// missing from the backup are not errors; those references are pruned.
#[derive(Error, Debug)]
pub enum CourseError {
    /// The container could not be loaded
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// A required descriptor, element or attribute is absent or unparsable
    #[error("Malformed descriptor {path}: {reason}")]
    MalformedDescriptor {
        /// Path of the descriptor (or folder) inside the backup
        path: String,
        /// What was missing or invalid
        reason: String,
    },

    /// A descriptor is not well-formed XML
    #[error("XML parse error in {path}: {source}")]
    Xml {
        /// Path of the descriptor inside the backup
        path: String,
        /// Underlying parser error
        #[source]
        source: roxmltree::Error,
    },

    /// A file manifest entry has no matching blob in the content store
    #[error("File {file_id} has no content blob (contenthash {contenthash})")]
    UnresolvedContent {
        /// Id of the manifest entry
        file_id: i64,
        /// Content hash that could not be found
        contenthash: String,
    },

    /// A section references an activity that is not in the backup
    #[error("Section {section_id} references missing activity {activity_id}")]
    MissingActivity {
        /// Id of the referencing section
        section_id: i64,
        /// Id of the unresolved activity
        activity_id: i64,
    },

    /// Error while writing the output archive
    #[error("ZIP write error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// IO error while writing the output archive
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CourseError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDescriptor {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for course operations
pub type Result<T> = std::result::Result<T, CourseError>;
