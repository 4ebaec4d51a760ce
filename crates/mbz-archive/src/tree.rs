//! In-memory folder/file tree reconstructed from archive entries
//!
//! Entries arrive as a flat stream of `(path, bytes)` pairs. [`Folder::insert`]
//! splits each path on `/` and creates intermediate folders on demand, so the
//! tree looks the same whether the backup was packed as ZIP or TAR.GZ.
//!
//! Iteration order is insertion order everywhere. Recursive lookups resolve
//! duplicate names to the file that was inserted first.

use crate::error::{ArchiveError, Result};
use bytes::Bytes;
use log::warn;
use std::collections::HashMap;

/// UTF-8 byte order mark, tolerated at the start of XML descriptors
const UTF8_BOM: &str = "\u{feff}";

/// A file leaf in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    name: String,
    path: String,
    content: Bytes,
    seq: u64,
}

impl File {
    /// File name (last path segment)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full slash-delimited path from the root, for diagnostics
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File contents. Cloning the returned `Bytes` shares the buffer.
    #[inline]
    #[must_use]
    pub const fn content(&self) -> &Bytes {
        &self.content
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Decode the contents as UTF-8 text
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidUtf8`] if the content is not valid UTF-8.
    pub fn text(&self) -> Result<&str> {
        let text = std::str::from_utf8(&self.content).map_err(|_| ArchiveError::InvalidUtf8 {
            path: self.path.clone(),
        })?;
        Ok(text.strip_prefix(UTF8_BOM).unwrap_or(text))
    }
}

/// A folder node. The root folder has an empty name.
#[derive(Debug, Clone, Default)]
pub struct Folder {
    name: String,
    path: String,
    folders: Vec<Folder>,
    folder_index: HashMap<String, usize>,
    files: Vec<File>,
    inserted: u64,
}

impl Folder {
    /// Create an empty root folder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn child(name: &str, parent_path: &str) -> Self {
        let path = if parent_path.is_empty() {
            name.to_string()
        } else {
            format!("{parent_path}/{name}")
        };
        Self {
            name: name.to_string(),
            path,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full slash-delimited path from the root (empty for the root)
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Insert a file at a slash-delimited path relative to this folder
    ///
    /// Missing intermediate folders are created. Empty segments are ignored,
    /// so `"a//b"` and `"/a/b"` both land at `a/b`. Inserting a path that
    /// already holds a file replaces its content in place.
    pub fn insert(&mut self, path: &str, content: impl Into<Bytes>) {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            warn!("Ignoring entry with empty path");
            return;
        }

        let seq = self.inserted;
        self.inserted += 1;
        self.insert_segments(&segments, content.into(), seq);
    }

    fn insert_segments(&mut self, segments: &[&str], content: Bytes, seq: u64) {
        match segments {
            [] => {}
            [name] => {
                if let Some(existing) = self.files.iter_mut().find(|f| f.name == *name) {
                    warn!("Duplicate archive entry {}, keeping the last copy", existing.path);
                    existing.content = content;
                    return;
                }
                let path = if self.path.is_empty() {
                    (*name).to_string()
                } else {
                    format!("{}/{name}", self.path)
                };
                self.files.push(File {
                    name: (*name).to_string(),
                    path,
                    content,
                    seq,
                });
            }
            [folder, rest @ ..] => {
                let idx = if let Some(&idx) = self.folder_index.get(*folder) {
                    idx
                } else {
                    self.folders.push(Self::child(folder, &self.path));
                    let idx = self.folders.len() - 1;
                    self.folder_index.insert((*folder).to_string(), idx);
                    idx
                };
                self.folders[idx].insert_segments(rest, content, seq);
            }
        }
    }

    /// Direct child folder with exactly this name
    #[must_use]
    pub fn find_folder(&self, name: &str) -> Option<&Self> {
        self.folder_index.get(name).map(|&idx| &self.folders[idx])
    }

    /// First file named exactly `name`, searching subfolders when `recursive`
    ///
    /// When several files share the name, the one inserted first wins.
    #[must_use]
    pub fn find_file(&self, name: &str, recursive: bool) -> Option<&File> {
        if recursive {
            self.list_files(true).into_iter().find(|f| f.name == name)
        } else {
            self.files.iter().find(|f| f.name == name)
        }
    }

    /// Files of this folder (and all subfolders when `recursive`) in insertion order
    #[must_use]
    pub fn list_files(&self, recursive: bool) -> Vec<&File> {
        if !recursive {
            return self.files.iter().collect();
        }
        let mut files = Vec::new();
        self.collect_files(&mut files);
        files.sort_by_key(|f| f.seq);
        files
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a File>) {
        out.extend(self.files.iter());
        for folder in &self.folders {
            folder.collect_files(out);
        }
    }

    /// Immediate child folders in insertion order
    #[must_use]
    pub fn list_folders(&self) -> Vec<&Self> {
        self.folders.iter().collect()
    }

    /// Number of files in this folder and all subfolders
    #[must_use]
    pub fn len_files_recursive(&self) -> usize {
        self.files.len()
            + self
                .folders
                .iter()
                .map(Self::len_files_recursive)
                .sum::<usize>()
    }
}
