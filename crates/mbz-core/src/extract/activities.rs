//! Activity records from `activities/{type}_{id}/`

use crate::error::{CourseError, Result};
use crate::model::{Activity, ActivityType, RichText};
use crate::xml;
use log::debug;
use mbz_archive::Folder;
use roxmltree::Node;

const ACTIVITIES_DIR: &str = "activities";
const INFOREF_FILE: &str = "inforef.xml";

/// Per-type hook for module-specific fields of an activity descriptor
///
/// The generic fields are read before the hook runs.
pub(crate) trait ActivityReader: Sync {
    fn read(&self, _node: Node<'_, '_>, _activity: &mut Activity) {}
}

/// Modules without extra fields
struct DefaultReader;

impl ActivityReader for DefaultReader {}

/// `assign` modules. The model carries no assignment-specific fields yet.
struct AssignReader;

impl ActivityReader for AssignReader {}

impl ActivityType {
    pub(crate) fn reader(self) -> &'static dyn ActivityReader {
        match self {
            Self::Assign => &AssignReader,
            _ => &DefaultReader,
        }
    }
}

/// Read every activity subfolder in folder order
pub(crate) fn read_activities(root: &Folder) -> Result<Vec<Activity>> {
    let folder = xml::required_folder(root, ACTIVITIES_DIR)?;
    let activities = folder
        .list_folders()
        .into_iter()
        .map(read_activity)
        .collect::<Result<Vec<_>>>()?;
    debug!("Read {} activities", activities.len());
    Ok(activities)
}

fn read_activity(folder: &Folder) -> Result<Activity> {
    let (module_name, id_text) = folder.name().split_once('_').ok_or_else(|| {
        CourseError::malformed(folder.path(), "activity folder name is not {type}_{id}")
    })?;
    let id = xml::parse_int(id_text, "activity id", folder.path())?;

    let descriptor = xml::required_file(folder, &format!("{module_name}.xml"))?;
    let doc = xml::parse(descriptor)?;
    let node = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == module_name)
        .ok_or_else(|| {
            CourseError::malformed(descriptor.path(), format!("missing <{module_name}> element"))
        })?;

    let activity_type = ActivityType::from_module_name(module_name);
    let mut activity = Activity {
        id,
        name: xml::required_text(node, "name", descriptor.path())?,
        description: read_rich_text(node, "intro"),
        activity_type,
        file_ids: read_file_refs(folder)?,
    };
    activity_type.reader().read(node, &mut activity);

    Ok(activity)
}

/// Text element paired with its `{tag}format` sibling
///
/// Missing or empty text yields `None`. An absent or empty format marks the
/// text as plain; any other format value means markup.
fn read_rich_text(node: Node<'_, '_>, tag: &str) -> Option<RichText> {
    let content = xml::child_text(node, tag).filter(|text| !text.is_empty())?;
    let is_plain = xml::child_text(node, &format!("{tag}format")).map_or(true, |f| f.is_empty());
    Some(RichText { is_plain, content })
}

/// File ids listed in the activity's `inforef.xml`, duplicates kept
fn read_file_refs(folder: &Folder) -> Result<Vec<i64>> {
    let inforef = xml::required_file(folder, INFOREF_FILE)?;
    let doc = xml::parse(inforef)?;

    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "file")
        .map(|file| {
            let id = xml::required_text(file, "id", inforef.path())?;
            xml::parse_int(&id, "file id", inforef.path())
        })
        .collect()
}
