//! Serializable overview of a course, in output order

use crate::export::naming;
use crate::model::{ActivityType, Course};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSummary {
    pub sections: Vec<SectionSummary>,
    pub activity_count: usize,
    pub file_count: usize,
    pub total_file_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub id: i64,
    pub number: i64,
    pub name: String,
    pub activities: Vec<ActivitySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivitySummary {
    pub id: i64,
    /// Name the activity gets in the output archive
    pub display_name: String,
    pub activity_type: ActivityType,
    pub has_description: bool,
    pub file_count: usize,
    /// `false` if the section points at an activity the backup lacks
    pub resolved: bool,
}

impl CourseSummary {
    #[must_use]
    pub fn from_course(course: &Course) -> Self {
        let sections = course
            .sections()
            .iter()
            .map(|section| SectionSummary {
                id: section.id,
                number: section.number,
                name: section.name.clone(),
                activities: section
                    .activity_ids
                    .iter()
                    .enumerate()
                    .map(|(index, &id)| match course.activity(id) {
                        Some(activity) => ActivitySummary {
                            id,
                            display_name: naming::display_name(index, activity),
                            activity_type: activity.activity_type,
                            has_description: activity.description.is_some(),
                            file_count: course.resolved_files(activity).len(),
                            resolved: true,
                        },
                        None => ActivitySummary {
                            id,
                            display_name: String::new(),
                            activity_type: ActivityType::Unknown,
                            has_description: false,
                            file_count: 0,
                            resolved: false,
                        },
                    })
                    .collect(),
            })
            .collect();

        Self {
            sections,
            activity_count: course.activities().len(),
            file_count: course.files().len(),
            total_file_bytes: course.files().iter().map(|f| f.content.len()).sum(),
        }
    }
}
