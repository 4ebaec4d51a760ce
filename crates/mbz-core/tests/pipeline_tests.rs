//! End-to-end conversion tests over in-memory fixture backups

mod common;

use common::{read_zip, sample_backup, section, to_tar_gz, to_zip};
use mbz_archive::ArchiveError;
use mbz_core::{convert, read_course, ActivityType, BuildOptions, CourseError};

fn expected_output() -> Vec<(String, Vec<u8>)> {
    [
        ("1_Week 1/", ""),
        ("1_Week 1/0_Tarea_Essay.pdf", "%PDF-1.4"),
        ("1_Week 1/1_Gallery/", ""),
        ("1_Week 1/1_Gallery/1_a.png", "PNG-A"),
        ("1_Week 1/1_Gallery/2_b.png", "PNG-B"),
        ("2_General/", ""),
        ("2_General/0_Texto_Welcome.txt", "Hello class"),
        ("2_General/1_News.txt", ""),
    ]
    .iter()
    .map(|(path, content)| (path.to_string(), content.as_bytes().to_vec()))
    .collect()
}

#[test]
fn test_convert_zip_backup() {
    let output = convert(&to_zip(&sample_backup()), &BuildOptions::default()).expect("convert");
    assert_eq!(read_zip(&output), expected_output());
}

#[test]
fn test_convert_tar_gz_backup() {
    let output =
        convert(&to_tar_gz(&sample_backup()), &BuildOptions::default()).expect("convert");
    assert_eq!(read_zip(&output), expected_output());
}

#[test]
fn test_read_course_model() {
    let course = read_course(&to_zip(&sample_backup())).expect("course");

    let section_names: Vec<&str> = course.sections().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(section_names, vec!["Week 1", "General"]);

    // File 77 is referenced but absent from files.xml
    let gallery = course.activity(2).expect("activity 2");
    assert_eq!(gallery.file_ids, vec![10, 11]);
    assert_eq!(gallery.activity_type, ActivityType::Resource);

    let essay = course.activity(1).expect("activity 1");
    let description = essay.description.as_ref().expect("essay intro");
    assert!(!description.is_plain);
    assert_eq!(description.content, "<p>Write 500 words</p>");

    // Empty intro with a non-empty format is still no description
    assert!(course.activity(4).expect("activity 4").description.is_none());

    // The "." directory placeholder is not a file
    assert!(course.file(13).is_none());
    assert_eq!(course.files().len(), 3);
}

#[test]
fn test_sections_numbered_one_to_three_come_out_reversed() {
    let mut entries: Vec<_> = sample_backup()
        .into_iter()
        .filter(|(path, _)| !path.starts_with("sections/"))
        .collect();
    entries.push(section(1, 1, "A", ""));
    entries.push(section(2, 2, "B", ""));
    entries.push(section(3, 3, "C", ""));

    let course = read_course(&to_zip(&entries)).expect("course");
    let numbers: Vec<i64> = course.sections().iter().map(|s| s.number).collect();
    assert_eq!(numbers, vec![3, 2, 1]);
}

#[test]
fn test_missing_activity_produces_no_output() {
    let mut entries = sample_backup();
    entries.push(section(102, 2, "Broken", "1,999"));

    let err = convert(&to_zip(&entries), &BuildOptions::default()).expect_err("missing 999");
    assert!(matches!(
        err,
        CourseError::MissingActivity {
            section_id: 102,
            activity_id: 999
        }
    ));
}

#[test]
fn test_missing_blob_is_fatal() {
    let entries: Vec<_> = sample_backup()
        .into_iter()
        .filter(|(path, _)| path != "files/h1/h11")
        .collect();

    let err = convert(&to_tar_gz(&entries), &BuildOptions::default()).expect_err("h11 missing");
    assert!(matches!(err, CourseError::UnresolvedContent { file_id: 11, .. }));
}

#[test]
fn test_unsupported_container_is_fatal() {
    let err = convert(b"Rar!\x1a\x07\x00 not a backup", &BuildOptions::default())
        .expect_err("unsupported");
    assert!(matches!(
        err,
        CourseError::Archive(ArchiveError::UnsupportedFormat)
    ));
}
