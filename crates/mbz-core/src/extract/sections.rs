//! Section records from `sections/**/section.xml`

use crate::error::{CourseError, Result};
use crate::model::Section;
use crate::xml;
use log::debug;
use mbz_archive::{File, Folder};

const SECTIONS_DIR: &str = "sections";
const SECTION_SUFFIX: &str = "section.xml";

/// Read all sections, most recent (highest `number`) first
pub(crate) fn read_sections(root: &Folder) -> Result<Vec<Section>> {
    let folder = xml::required_folder(root, SECTIONS_DIR)?;
    let mut sections = folder
        .list_files(true)
        .into_iter()
        .filter(|f| f.name().ends_with(SECTION_SUFFIX))
        .map(read_section)
        .collect::<Result<Vec<_>>>()?;

    sections.sort_by(|a, b| b.number.cmp(&a.number));
    debug!("Read {} sections", sections.len());
    Ok(sections)
}

fn read_section(file: &File) -> Result<Section> {
    let doc = xml::parse(file)?;
    let path = file.path();
    let node = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "section")
        .ok_or_else(|| CourseError::malformed(path, "missing <section> element"))?;

    let number = xml::required_text(node, "number", path)?;
    let sequence = xml::required_text(node, "sequence", path)?;

    Ok(Section {
        id: xml::required_int_attribute(node, "id", path)?,
        number: xml::parse_int(&number, "number", path)?,
        name: xml::required_text(node, "name", path)?,
        activity_ids: parse_sequence(&sequence, path)?,
    })
}

/// Comma-separated activity ids. Blank tokens (an empty section) are skipped.
fn parse_sequence(sequence: &str, path: &str) -> Result<Vec<i64>> {
    sequence
        .split(',')
        .filter(|token| !token.trim().is_empty())
        .map(|token| xml::parse_int(token, "sequence entry", path))
        .collect()
}
