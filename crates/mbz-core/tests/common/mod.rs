//! Fixture backups built in memory

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

/// Entries of a small but complete backup
///
/// Sections (newest first): "Week 1" = [assign 1, resource 2],
/// "General" = [label 3, forum 4]. Resource 2 also references file 77,
/// which the backup does not contain.
pub fn sample_backup() -> Vec<(String, Vec<u8>)> {
    let mut entries = vec![
        entry("moodle_backup.xml", "<moodle_backup/>"),
        entry(
            "files.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<files>
  <file id="10"><contenthash>h10</contenthash><filepath>/</filepath><filename>a.png</filename></file>
  <file id="11"><contenthash>h11</contenthash><filepath>/</filepath><filename>b.png</filename></file>
  <file id="12"><contenthash>h12</contenthash><filepath>/</filepath><filename>syllabus.pdf</filename></file>
  <file id="13"><contenthash>h13</contenthash><filepath>/</filepath><filename>.</filename></file>
</files>"#,
        ),
        entry("files/h1/h10", "PNG-A"),
        entry("files/h1/h11", "PNG-B"),
        entry("files/h1/h12", "%PDF-1.4"),
    ];

    entries.extend(activity(
        "assign",
        1,
        "Essay",
        Some(("&lt;p&gt;Write 500 words&lt;/p&gt;", "1")),
        &[12],
    ));
    entries.extend(activity("resource", 2, "Gallery", None, &[10, 77, 11]));
    entries.extend(activity("label", 3, "Welcome", Some(("Hello class", "")), &[]));
    entries.extend(activity("forum", 4, "News", Some(("", "1")), &[]));

    entries.push(section(100, 0, "General", "3,4"));
    entries.push(section(101, 1, "Week 1", "1,2"));
    entries
}

pub fn entry(path: &str, content: &str) -> (String, Vec<u8>) {
    (path.to_string(), content.as_bytes().to_vec())
}

pub fn activity(
    module: &str,
    id: i64,
    name: &str,
    intro: Option<(&str, &str)>,
    file_ids: &[i64],
) -> Vec<(String, Vec<u8>)> {
    let intro = intro
        .map(|(text, format)| format!("<intro>{text}</intro><introformat>{format}</introformat>"))
        .unwrap_or_default();
    let refs: String = file_ids
        .iter()
        .map(|id| format!("<file><id>{id}</id></file>"))
        .collect();
    let dir = format!("activities/{module}_{id}");
    vec![
        (
            format!("{dir}/{module}.xml"),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<activity id="{id}" moduleid="{id}" modulename="{module}">
  <{module} id="{id}"><name>{name}</name>{intro}<timemodified>0</timemodified></{module}>
</activity>"#
            )
            .into_bytes(),
        ),
        (
            format!("{dir}/inforef.xml"),
            format!("<inforef><fileref>{refs}</fileref></inforef>").into_bytes(),
        ),
    ]
}

pub fn section(id: i64, number: i64, name: &str, sequence: &str) -> (String, Vec<u8>) {
    (
        format!("sections/section_{id}/section.xml"),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<section id="{id}"><number>{number}</number><name>{name}</name><sequence>{sequence}</sequence></section>"#
        )
        .into_bytes(),
    )
}

pub fn to_zip(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        zip.start_file(name.as_str(), options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn to_tar_gz(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name.as_str(), data.as_slice())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// (path, contents) of every file entry in a ZIP; directories end with `/`
pub fn read_zip(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut contents = Vec::new();
            file.read_to_end(&mut contents).unwrap();
            (file.name().to_string(), contents)
        })
        .collect()
}
