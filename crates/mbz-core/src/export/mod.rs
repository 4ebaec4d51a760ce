//! Browsable ZIP export of a [`Course`]
//!
//! Output layout:
//!
//! ```text
//! 1_<newest section>/
//!     0_Texto_<label>.html          description only
//!     1_Tarea_<assignment>.pdf      exactly one file
//!     2_<resource>/                 two or more files
//!         1_<first file>
//!         2_<second file>
//!         <resource>.html           description, if any
//! 2_<older section>/
//!     ...
//! ```
//!
//! The whole archive is planned before anything is written, so a course that
//! references a missing activity produces no output at all.

pub mod naming;

use crate::error::{CourseError, Result};
use crate::model::{Activity, Course};
use bytes::Bytes;
use log::{debug, warn};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

/// Compression used for entries of the output archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Deflate (default)
    #[default]
    Deflated,
    /// No compression
    Stored,
}

impl Compression {
    const fn method(self) -> CompressionMethod {
        match self {
            Self::Deflated => CompressionMethod::Deflated,
            Self::Stored => CompressionMethod::Stored,
        }
    }
}

impl std::fmt::Display for Compression {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Deflated => "deflated",
            Self::Stored => "stored",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deflated" | "deflate" => Ok(Self::Deflated),
            "stored" | "store" | "none" => Ok(Self::Stored),
            _ => Err(format!(
                "Unknown compression '{s}'. Expected: deflated, stored"
            )),
        }
    }
}

/// Settings for [`build`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BuildOptions {
    pub compression: Compression,
}

/// One entry of the output archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEntry {
    /// Folder path, without trailing slash
    Directory(String),
    /// File path and contents
    File { path: String, content: Bytes },
}

impl OutputEntry {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Directory(path) | Self::File { path, .. } => path,
        }
    }
}

/// Lay out the output archive without writing it
///
/// Names that clean to the same path collapse into one entry: the later
/// entry replaces the earlier one in its position.
///
/// # Errors
///
/// Returns [`CourseError::MissingActivity`] if a section references an
/// activity id that the course does not contain.
pub fn plan(course: &Course) -> Result<Vec<OutputEntry>> {
    let mut entries = Vec::new();

    for (position, section) in course.sections().iter().enumerate() {
        let section_dir =
            naming::clean_component(&format!("{}_{}", position + 1, section.name));
        entries.push(OutputEntry::Directory(section_dir.clone()));

        for (index, &activity_id) in section.activity_ids.iter().enumerate() {
            let activity =
                course
                    .activity(activity_id)
                    .ok_or(CourseError::MissingActivity {
                        section_id: section.id,
                        activity_id,
                    })?;
            plan_activity(&mut entries, &section_dir, index, activity, course);
        }
    }

    Ok(dedup_paths(entries))
}

fn plan_activity(
    entries: &mut Vec<OutputEntry>,
    dir: &str,
    index: usize,
    activity: &Activity,
    course: &Course,
) {
    let display_name = naming::display_name(index, activity);
    let files = course.resolved_files(activity);

    let mut push_file = |dir: &str, name: String, content: Bytes| {
        entries.push(OutputEntry::File {
            path: format!("{dir}/{name}"),
            content,
        });
    };

    match (files.as_slice(), &activity.description) {
        ([], None) => push_file(dir, naming::file_name(&display_name, Some("txt")), Bytes::new()),
        ([], Some(text)) => push_file(
            dir,
            naming::file_name(&display_name, Some(text.extension())),
            Bytes::from(text.content.clone()),
        ),
        ([file], _) => push_file(
            dir,
            naming::file_name(&display_name, naming::extension_of(&file.name)),
            file.content.clone(),
        ),
        (files, description) => {
            let subdir = format!("{dir}/{}", naming::clean_component(&display_name));
            let mut planned = vec![OutputEntry::Directory(subdir.clone())];
            for (position, file) in files.iter().enumerate() {
                planned.push(OutputEntry::File {
                    path: format!(
                        "{subdir}/{}",
                        naming::clean_component(&format!("{}_{}", position + 1, file.name))
                    ),
                    content: file.content.clone(),
                });
            }
            // Named after the raw activity name, not the display name
            if let Some(text) = description {
                planned.push(OutputEntry::File {
                    path: format!(
                        "{subdir}/{}",
                        naming::file_name(&activity.name, Some(text.extension()))
                    ),
                    content: Bytes::from(text.content.clone()),
                });
            }
            entries.extend(planned);
        }
    }
}

/// Keep one entry per archive path; a later file replaces an earlier one
fn dedup_paths(entries: Vec<OutputEntry>) -> Vec<OutputEntry> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(entries.len());
    let mut unique: Vec<OutputEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        let key = match &entry {
            OutputEntry::Directory(path) => format!("{path}/"),
            OutputEntry::File { path, .. } => path.clone(),
        };
        if let Some(&idx) = index.get(&key) {
            if matches!(entry, OutputEntry::File { .. }) {
                warn!("Duplicate output path {key}, keeping the later entry");
            }
            unique[idx] = entry;
        } else {
            index.insert(key, unique.len());
            unique.push(entry);
        }
    }
    unique
}

/// Render the course as a ZIP archive
///
/// # Errors
///
/// Returns [`CourseError::MissingActivity`] for unresolved section entries,
/// or a ZIP/IO error if the archive cannot be written.
pub fn build(course: &Course, options: &BuildOptions) -> Result<Vec<u8>> {
    let entries = plan(course)?;
    write_zip(&entries, options)
}

/// Write planned entries to an in-memory ZIP archive
///
/// # Errors
///
/// Returns a ZIP/IO error if the archive cannot be written, including when
/// two entries share a path.
pub fn write_zip(entries: &[OutputEntry], options: &BuildOptions) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options = SimpleFileOptions::default().compression_method(options.compression.method());

    for entry in entries {
        match entry {
            OutputEntry::Directory(path) => zip.add_directory(format!("{path}/"), file_options)?,
            OutputEntry::File { path, content } => {
                zip.start_file(path.as_str(), file_options)?;
                zip.write_all(content)?;
            }
        }
    }

    let bytes = zip.finish()?.into_inner();
    debug!(
        "Wrote {} entries ({} bytes, {})",
        entries.len(),
        bytes.len(),
        options.compression
    );
    Ok(bytes)
}
