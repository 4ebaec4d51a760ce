//! Backup container loading for `mbz_rs`
//!
//! Moodle course backups (`.mbz`) are either ZIP archives or gzip-compressed
//! TAR streams. This crate sniffs which one it was given and rebuilds the
//! contents as an in-memory [`Folder`] tree, so the rest of the pipeline never
//! has to care about the container encoding.
//!
//! # Usage
//!
//! ```no_run
//! use mbz_archive::load;
//!
//! let bytes = std::fs::read("backup.mbz")?;
//! let root = load(&bytes)?;
//! for file in root.list_files(true) {
//!     println!("{} ({} bytes)", file.path(), file.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod loader;
pub mod tree;

pub use error::{ArchiveError, Result};
pub use loader::{detect_format, load, ContainerFormat};
pub use tree::{File, Folder};
