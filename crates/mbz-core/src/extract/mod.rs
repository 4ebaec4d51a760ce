//! Course model extraction from a loaded backup tree
//!
//! Activities, files and sections are read independently of each other, so
//! the three readers run in parallel and are joined before the activities'
//! file references are normalized against the files that actually exist.

mod activities;
mod files;
mod sections;

use crate::error::Result;
use crate::model::{Activity, Course, MoodleFile};
use log::debug;
use mbz_archive::Folder;
use std::collections::HashSet;

/// Build the course model from a loaded backup tree
///
/// # Errors
///
/// Fails if a required descriptor is missing or malformed, or if a file
/// listed in `files.xml` has no content blob.
pub fn extract_course(root: &Folder) -> Result<Course> {
    let (activities, (files, sections)) = rayon::join(
        || activities::read_activities(root),
        || rayon::join(|| files::read_files(root), || sections::read_sections(root)),
    );
    let (activities, files, sections) = (activities?, files?, sections?);

    let activities = prune_dangling_file_ids(activities, &files);
    Ok(Course::new(activities, files, sections))
}

/// Drop file references that no manifest entry backs
///
/// Backups routinely omit some referenced files, so these are not errors.
fn prune_dangling_file_ids(activities: Vec<Activity>, files: &[MoodleFile]) -> Vec<Activity> {
    let known: HashSet<i64> = files.iter().map(|f| f.id).collect();
    activities
        .into_iter()
        .map(|mut activity| {
            let before = activity.file_ids.len();
            activity.file_ids.retain(|id| known.contains(id));
            let dropped = before - activity.file_ids.len();
            if dropped > 0 {
                debug!(
                    "Activity {} references {dropped} file(s) not in the backup",
                    activity.id
                );
            }
            activity
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActivityType;
    use bytes::Bytes;

    fn resource(id: i64, file_ids: Vec<i64>) -> Activity {
        Activity {
            id,
            name: format!("R{id}"),
            description: None,
            activity_type: ActivityType::Resource,
            file_ids,
        }
    }

    #[test]
    fn test_prune_keeps_order_and_duplicates() {
        let files = vec![
            MoodleFile {
                id: 10,
                name: "a.png".to_string(),
                content: Bytes::new(),
            },
            MoodleFile {
                id: 11,
                name: "b.png".to_string(),
                content: Bytes::new(),
            },
        ];
        let pruned = prune_dangling_file_ids(
            vec![resource(1, vec![11, 99, 10, 11]), resource(2, vec![98])],
            &files,
        );
        assert_eq!(pruned[0].file_ids, vec![11, 10, 11]);
        assert!(pruned[1].file_ids.is_empty());
    }

    #[test]
    fn test_extract_course_reports_first_failure() {
        // No activities/, files.xml or sections/ at all
        let root = Folder::new();
        assert!(extract_course(&root).is_err());
    }
}
