//! Course domain model
//!
//! A [`Course`] is assembled once per conversion from the three collections
//! read out of a backup and is read-only afterwards.

use bytes::Bytes;
use log::warn;
use serde::Serialize;
use std::collections::HashMap;

/// Moodle module kinds the converter distinguishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Assign,
    Forum,
    Label,
    Resource,
    Quiz,
    /// Any module name not listed above
    #[default]
    Unknown,
}

impl ActivityType {
    /// Map a backup module name (`assign`, `label`, ...) to its type
    #[must_use]
    pub fn from_module_name(name: &str) -> Self {
        match name {
            "assign" => Self::Assign,
            "forum" => Self::Forum,
            "label" => Self::Label,
            "resource" => Self::Resource,
            "quiz" => Self::Quiz,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ActivityType {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Assign => "assign",
            Self::Forum => "forum",
            Self::Label => "label",
            Self::Resource => "resource",
            Self::Quiz => "quiz",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Description text attached to an activity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RichText {
    /// `true` for plain text, `false` for HTML markup
    pub is_plain: bool,
    pub content: String,
}

impl RichText {
    /// File extension used when the text is written out on its own
    #[inline]
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        if self.is_plain {
            "txt"
        } else {
            "html"
        }
    }
}

/// A course module (assignment, label, resource, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: i64,
    pub name: String,
    pub description: Option<RichText>,
    pub activity_type: ActivityType,
    /// Referenced file ids in descriptor order
    pub file_ids: Vec<i64>,
}

/// A file from the backup's content store, under its original name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodleFile {
    pub id: i64,
    pub name: String,
    /// Shares the loaded archive's buffer
    pub content: Bytes,
}

/// An ordered group of activities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: i64,
    pub number: i64,
    pub name: String,
    pub activity_ids: Vec<i64>,
}

/// Activities, files and sections of one backup
///
/// Collections keep insertion order. Lookups by id go through an index built
/// at construction time.
#[derive(Debug, Clone, Default)]
pub struct Course {
    activities: Vec<Activity>,
    files: Vec<MoodleFile>,
    sections: Vec<Section>,
    activity_index: HashMap<i64, usize>,
    file_index: HashMap<i64, usize>,
}

impl Course {
    /// Assemble a course. Records with an id already seen are dropped.
    #[must_use]
    pub fn new(activities: Vec<Activity>, files: Vec<MoodleFile>, sections: Vec<Section>) -> Self {
        let (activities, activity_index) = index_by_id(activities, |a| a.id, "activity");
        let (files, file_index) = index_by_id(files, |f| f.id, "file");
        Self {
            activities,
            files,
            sections,
            activity_index,
            file_index,
        }
    }

    #[inline]
    #[must_use]
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    #[inline]
    #[must_use]
    pub fn files(&self) -> &[MoodleFile] {
        &self.files
    }

    /// Sections in output order
    #[inline]
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn activity(&self, id: i64) -> Option<&Activity> {
        self.activity_index.get(&id).map(|&idx| &self.activities[idx])
    }

    #[must_use]
    pub fn file(&self, id: i64) -> Option<&MoodleFile> {
        self.file_index.get(&id).map(|&idx| &self.files[idx])
    }

    /// Files of `activity` that exist in this course, in reference order
    #[must_use]
    pub fn resolved_files(&self, activity: &Activity) -> Vec<&MoodleFile> {
        activity
            .file_ids
            .iter()
            .filter_map(|&id| self.file(id))
            .collect()
    }
}

fn index_by_id<T>(
    items: Vec<T>,
    id_of: impl Fn(&T) -> i64,
    kind: &str,
) -> (Vec<T>, HashMap<i64, usize>) {
    let mut kept = Vec::with_capacity(items.len());
    let mut index = HashMap::with_capacity(items.len());
    for item in items {
        let id = id_of(&item);
        if index.contains_key(&id) {
            warn!("Duplicate {kind} id {id}, keeping the first record");
            continue;
        }
        index.insert(id, kept.len());
        kept.push(item);
    }
    (kept, index)
}
