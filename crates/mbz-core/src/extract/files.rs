//! File records from `files.xml` and the content-addressed `files/` store
//!
//! The manifest lists each file with its original name and a content hash.
//! Bodies live under `files/<prefix>/<contenthash>`, so a manifest entry is
//! resolved by looking the hash up anywhere below `files/`. The store is
//! indexed once; when a hash appears twice the first-inserted blob wins.

use crate::error::{CourseError, Result};
use crate::model::MoodleFile;
use crate::xml;
use log::debug;
use mbz_archive::{File, Folder};
use std::collections::HashMap;

const FILES_MANIFEST: &str = "files.xml";
const FILES_DIR: &str = "files";

/// Manifest filename Moodle uses for directory placeholders
const DIRECTORY_PLACEHOLDER: &str = ".";

pub(crate) fn read_files(root: &Folder) -> Result<Vec<MoodleFile>> {
    let manifest = xml::required_file(root, FILES_MANIFEST)?;
    let store = xml::required_folder(root, FILES_DIR)?;
    let doc = xml::parse(manifest)?;
    let path = manifest.path();
    let blobs = index_store(store);

    let mut files = Vec::new();
    for node in doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "file")
    {
        let filename = xml::required_text(node, "filename", path)?;
        if filename == DIRECTORY_PLACEHOLDER {
            continue;
        }

        let id = xml::required_int_attribute(node, "id", path)?;
        let contenthash = xml::required_text(node, "contenthash", path)?;
        let blob = blobs
            .get(contenthash.as_str())
            .ok_or_else(|| CourseError::UnresolvedContent {
                file_id: id,
                contenthash: contenthash.clone(),
            })?;

        files.push(MoodleFile {
            id,
            name: filename,
            content: blob.content().clone(),
        });
    }

    debug!("Read {} files", files.len());
    Ok(files)
}

/// Blobs below `store` by name, first-inserted first
fn index_store(store: &Folder) -> HashMap<&str, &File> {
    let mut blobs = HashMap::new();
    for file in store.list_files(true) {
        blobs.entry(file.name()).or_insert(file);
    }
    blobs
}
