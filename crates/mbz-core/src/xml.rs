//! Helpers for reading backup XML descriptors
//!
//! Descriptors are small, so they are parsed into a `roxmltree` DOM and
//! queried by tag name. Lookups search descendants in document order, which
//! matches how the backup nests its records.

use crate::error::{CourseError, Result};
use mbz_archive::{File, Folder};
use roxmltree::{Document, Node};

/// Moodle's marker for a null text field
const NULL_MARKER: &str = "$@NULL@$";

/// Parse a file from the tree as an XML document
pub(crate) fn parse(file: &File) -> Result<Document<'_>> {
    let text = file.text()?;
    Document::parse(text).map_err(|source| CourseError::Xml {
        path: file.path().to_string(),
        source,
    })
}

/// First element below `node` (excluding `node` itself) with this tag name
pub(crate) fn find_element<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|n| n.is_element() && n.tag_name().name() == tag)
}

/// Concatenated text of all text nodes below `node`
///
/// The null marker reads as an empty string.
pub(crate) fn text_content(node: Node<'_, '_>) -> String {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    if text == NULL_MARKER {
        String::new()
    } else {
        text
    }
}

/// Text of the first `tag` element below `node`, if present
pub(crate) fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    find_element(node, tag).map(text_content)
}

/// Like [`child_text`], but a missing element is a malformed descriptor
pub(crate) fn required_text(node: Node<'_, '_>, tag: &str, path: &str) -> Result<String> {
    child_text(node, tag)
        .ok_or_else(|| CourseError::malformed(path, format!("missing <{tag}> element")))
}

/// Parse an integer field, naming the field and descriptor on failure
pub(crate) fn parse_int(text: &str, field: &str, path: &str) -> Result<i64> {
    text.trim().parse().map_err(|_| {
        CourseError::malformed(path, format!("{field} is not an integer: {text:?}"))
    })
}

/// Required attribute parsed as an integer
pub(crate) fn required_int_attribute(node: Node<'_, '_>, name: &str, path: &str) -> Result<i64> {
    let value = node.attribute(name).ok_or_else(|| {
        CourseError::malformed(
            path,
            format!("<{}> has no {name} attribute", node.tag_name().name()),
        )
    })?;
    parse_int(value, name, path)
}

/// Direct child folder that the backup layout requires
pub(crate) fn required_folder<'a>(parent: &'a Folder, name: &str) -> Result<&'a Folder> {
    parent
        .find_folder(name)
        .ok_or_else(|| CourseError::malformed(join(parent.path(), name), "folder not found"))
}

/// File in `parent` (non-recursive) that the backup layout requires
pub(crate) fn required_file<'a>(parent: &'a Folder, name: &str) -> Result<&'a File> {
    parent
        .find_file(name, false)
        .ok_or_else(|| CourseError::malformed(join(parent.path(), name), "file not found"))
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}
