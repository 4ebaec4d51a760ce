//! Output naming rules
//!
//! Display names are `{index}_{label}_{name}` with empty parts left out.
//! Every emitted name is cleaned before it is written: absolute URLs that
//! course authors paste into titles are removed and path separators are
//! neutralized so a title cannot create folders of its own.

use crate::model::{Activity, ActivityType};
use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s<>]+").expect("Invalid URL regex"));

/// Label shown in front of the activity name, for the types that have one
#[inline]
#[must_use]
pub const fn type_label(activity_type: ActivityType) -> Option<&'static str> {
    match activity_type {
        ActivityType::Assign => Some("Tarea"),
        ActivityType::Label => Some("Texto"),
        _ => None,
    }
}

/// `{index}_{label}_{name}`; `index` is the 0-based position in the section
#[must_use]
pub fn display_name(index: usize, activity: &Activity) -> String {
    let index = index.to_string();
    [
        index.as_str(),
        type_label(activity.activity_type).unwrap_or(""),
        activity.name.as_str(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("_")
}

/// Text after the last `.` of a filename, if any
#[must_use]
pub fn extension_of(filename: &str) -> Option<&str> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// Cleaned `stem` joined with an extension that is known separately
///
/// The stem is cleaned on its own, so a URL at the end of a name is never
/// mistaken for an extension.
#[must_use]
pub fn file_name(stem: &str, extension: Option<&str>) -> String {
    let stem = clean_component(stem);
    match extension.filter(|ext| !ext.is_empty()) {
        Some(ext) => format!("{stem}.{}", clean_component(ext)),
        None => stem,
    }
}

/// Strip URLs and replace path separators in a single path component
#[must_use]
pub fn clean_component(name: &str) -> String {
    let stripped = if URL_PATTERN.is_match(name) {
        let without_urls = URL_PATTERN.replace_all(name, "");
        without_urls.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        name.to_string()
    };
    stripped.replace(['/', '\\'], "-")
}
