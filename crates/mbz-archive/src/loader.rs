//! Container sniffing and loading
//!
//! Moodle backups ship either as a ZIP archive or as a gzip-compressed TAR
//! stream, interchangeably and regardless of the file extension. The loader
//! detects which one it got from the magic bytes and feeds every regular file
//! into a [`Folder`] tree. Anything else is rejected.

use crate::error::{ArchiveError, Result};
use crate::tree::Folder;
use flate2::read::GzDecoder;
use log::{debug, warn};
use std::io::{Cursor, Read};
use std::path::{Component, Path};
use tar::Archive;
use zip::result::ZipError;
use zip::ZipArchive;

/// Container encodings a backup may arrive in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    /// ZIP archive
    Zip,
    /// TAR stream wrapped in a single gzip layer
    GzipTar,
}

impl std::fmt::Display for ContainerFormat {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Zip => "zip",
            Self::GzipTar => "tar.gz",
        };
        write!(f, "{s}")
    }
}

/// Detect the container format from magic bytes
#[inline]
#[must_use = "returns the detected container format"]
pub fn detect_format(bytes: &[u8]) -> Option<ContainerFormat> {
    if infer::archive::is_zip(bytes) {
        Some(ContainerFormat::Zip)
    } else if infer::archive::is_gz(bytes) {
        Some(ContainerFormat::GzipTar)
    } else {
        None
    }
}

/// Load a backup container into an in-memory tree
///
/// # Errors
///
/// Returns [`ArchiveError::UnsupportedFormat`] if the signature is neither
/// ZIP nor GZIP, and propagates decoding errors from the container.
pub fn load(bytes: &[u8]) -> Result<Folder> {
    let format = detect_format(bytes).ok_or(ArchiveError::UnsupportedFormat)?;
    debug!("Detected {format} container ({} bytes)", bytes.len());

    let mut root = Folder::new();
    match format {
        ContainerFormat::Zip => load_zip(bytes, &mut root)?,
        ContainerFormat::GzipTar => load_tar_gz(bytes, &mut root)?,
    }

    debug!("Loaded {} entries", root.len_files_recursive());
    Ok(root)
}

/// Keep only normal path components and join them with `/`
///
/// Parent refs (`..`), current dir (`.`), roots and drive prefixes are
/// dropped. Returns `None` if nothing is left.
fn sanitize_path(path: &Path) -> Option<String> {
    let parts: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn load_zip(bytes: &[u8], root: &mut Folder) -> Result<()> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    for i in 0..archive.len() {
        let raw_name = archive.name_for_index(i).unwrap_or_default().to_string();
        let mut zip_file = match archive.by_index(i) {
            Ok(zip_file) => zip_file,
            Err(ZipError::UnsupportedArchive(msg)) if msg == ZipError::PASSWORD_REQUIRED => {
                return Err(ArchiveError::PasswordProtected { name: raw_name });
            }
            Err(e) => return Err(e.into()),
        };

        if zip_file.is_dir() {
            continue;
        }
        if zip_file.encrypted() {
            return Err(ArchiveError::PasswordProtected { name: raw_name });
        }

        let Some(path) = sanitize_path(Path::new(&raw_name)) else {
            warn!("Skipping invalid path: {raw_name}");
            continue;
        };

        let mut contents = Vec::new();
        zip_file.read_to_end(&mut contents)?;
        root.insert(&path, contents);
    }

    Ok(())
}

fn load_tar_gz(bytes: &[u8], root: &mut Folder) -> Result<()> {
    let mut archive = Archive::new(GzDecoder::new(bytes));

    for entry in archive.entries()? {
        let mut entry = entry?;

        // Skip directories, links and other special entries
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let raw_path = entry.path()?.into_owned();
        let Some(path) = sanitize_path(&raw_path) else {
            warn!("Skipping invalid path: {}", raw_path.display());
            continue;
        };

        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        root.insert(&path, contents);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use zip::write::{SimpleFileOptions, ZipWriter};

    const ENTRIES: &[(&str, &[u8])] = &[
        ("moodle_backup.xml", b"<moodle_backup/>"),
        ("files.xml", b"<files/>"),
        ("files/0a/0a1b2c", b"\x00\x01binary"),
        ("activities/label_7/label.xml", b"<activity/>"),
        ("sections/section_3/section.xml", b"<section/>"),
    ];

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.add_directory("files/", options).unwrap();
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn build_tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let mut dir = tar::Header::new_gnu();
        dir.set_entry_type(tar::EntryType::Directory);
        dir.set_size(0);
        dir.set_mode(0o755);
        dir.set_cksum();
        builder
            .append_data(&mut dir, "files/", std::io::empty())
            .unwrap();

        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, *name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn assert_tree_matches(root: &Folder, entries: &[(&str, &[u8])]) {
        let loaded: Vec<(&str, &[u8])> = root
            .list_files(true)
            .into_iter()
            .map(|f| (f.path(), f.content().as_ref()))
            .collect();
        assert_eq!(loaded, entries.to_vec());
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(&build_zip(ENTRIES)), Some(ContainerFormat::Zip));
        assert_eq!(
            detect_format(&build_tar_gz(ENTRIES)),
            Some(ContainerFormat::GzipTar)
        );
        assert_eq!(detect_format(b"<?xml version=\"1.0\"?>"), None);
        assert_eq!(detect_format(&[]), None);
    }

    #[test]
    fn test_load_zip_yields_every_entry() {
        let root = load(&build_zip(ENTRIES)).expect("Failed to load ZIP");
        assert_tree_matches(&root, ENTRIES);
    }

    #[test]
    fn test_load_tar_gz_yields_every_entry() {
        let root = load(&build_tar_gz(ENTRIES)).expect("Failed to load TAR.GZ");
        assert_tree_matches(&root, ENTRIES);
    }

    #[test]
    fn test_unsupported_format_is_an_error() {
        let result = load(b"BZh91AY&SY not a supported container");
        assert!(matches!(result, Err(ArchiveError::UnsupportedFormat)));
    }

    #[test]
    fn test_plain_tar_is_rejected() {
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_size(3);
        header.set_cksum();
        builder.append_data(&mut header, "a.txt", &b"abc"[..]).unwrap();
        let tar = builder.into_inner().unwrap();

        assert!(matches!(load(&tar), Err(ArchiveError::UnsupportedFormat)));
    }

    #[test]
    fn test_truncated_zip_is_an_error() {
        let mut zip = build_zip(ENTRIES);
        zip.truncate(40);
        assert!(load(&zip).is_err());
    }

    #[test]
    fn test_encrypted_zip_entry_is_password_protected() {
        use zip::unstable::write::FileOptionsExt;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("files.xml", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"<files/>").unwrap();
        zip.start_file(
            "moodle_backup.xml",
            SimpleFileOptions::default().with_deprecated_encryption(b"secret"),
        )
        .unwrap();
        zip.write_all(b"<moodle_backup/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        assert!(matches!(
            load(&bytes),
            Err(ArchiveError::PasswordProtected { ref name }) if name == "moodle_backup.xml"
        ));
    }

    #[test]
    fn test_entry_with_empty_sanitized_path_is_skipped() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, data) in [("..", &b"escape"[..]), ("files.xml", &b"<files/>"[..])] {
            zip.start_file(name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        let bytes = zip.finish().unwrap().into_inner();

        let root = load(&bytes).expect("Failed to load ZIP");
        assert_tree_matches(&root, &[("files.xml", &b"<files/>"[..])]);
    }

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path(Path::new("./activities/a/b.xml")),
            Some("activities/a/b.xml".to_string())
        );
        assert_eq!(
            sanitize_path(Path::new("../../etc/passwd")),
            Some("etc/passwd".to_string())
        );
        assert_eq!(sanitize_path(Path::new("/")), None);
        assert_eq!(sanitize_path(Path::new("..")), None);
    }
}
