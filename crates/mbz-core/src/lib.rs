//! Moodle backup to browsable ZIP conversion
//!
//! The pipeline has three stages:
//!
//! 1. [`mbz_archive::load`] sniffs the container (ZIP or TAR.GZ) and rebuilds
//!    its contents as an in-memory tree.
//! 2. [`extract_course`] reads activities, files and sections from the
//!    backup's XML descriptors and content-addressed file store.
//! 3. [`build`] renders the course as a ZIP archive with one numbered folder
//!    per section and readable file names.
//!
//! [`convert`] runs all three.
//!
//! ```no_run
//! use mbz_core::{convert, BuildOptions};
//!
//! let backup = std::fs::read("course.mbz")?;
//! let zip = convert(&backup, &BuildOptions::default())?;
//! std::fs::write("course.zip", zip)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod export;
pub mod extract;
pub mod model;
pub mod summary;
mod xml;

pub use error::{CourseError, Result};
pub use export::{build, plan, BuildOptions, Compression, OutputEntry};
pub use extract::extract_course;
pub use model::{Activity, ActivityType, Course, MoodleFile, RichText, Section};
pub use summary::CourseSummary;

use log::info;

/// Load a backup and extract its course model
///
/// # Errors
///
/// Fails if the container format is unsupported or the backup is incomplete.
pub fn read_course(backup: &[u8]) -> Result<Course> {
    let root = mbz_archive::load(backup)?;
    extract_course(&root)
}

/// Convert backup bytes into a browsable ZIP archive
///
/// All-or-nothing: any error aborts the conversion and no archive is returned.
///
/// # Errors
///
/// See [`CourseError`].
pub fn convert(backup: &[u8], options: &BuildOptions) -> Result<Vec<u8>> {
    let course = read_course(backup)?;
    info!(
        "Extracted {} sections, {} activities, {} files",
        course.sections().len(),
        course.activities().len(),
        course.files().len()
    );
    build(&course, options)
}
