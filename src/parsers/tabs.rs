use indexmap::IndexMap;

use crate::error::ExtractionError;
use crate::parsers::{Document, Layout, element_text};
use crate::results::SectionRecord;

/// Extracts one record per section identifier, in the given order.
///
/// All-or-nothing: the first section that is missing, or that has no
/// label/value list, fails the whole extraction.
pub fn extract(
    doc: &Document,
    layout: &Layout,
    section_ids: &[String],
) -> Result<Vec<SectionRecord>, ExtractionError> {
    section_ids
        .iter()
        .map(|id| extract_section(doc, layout, id))
        .collect()
}

fn extract_section(
    doc: &Document,
    layout: &Layout,
    id: &str,
) -> Result<SectionRecord, ExtractionError> {
    let container = doc
        .html()
        .select(&layout.section_container)
        .find(|el| el.value().id() == Some(id))
        .ok_or_else(|| ExtractionError::MissingSection {
            section: id.to_string(),
        })?;

    let info_list = container
        .select(&layout.info_list)
        .next()
        .ok_or_else(|| ExtractionError::MissingInfoList {
            section: id.to_string(),
        })?;

    let labels = info_list.select(&layout.label);
    let values = info_list.select(&layout.value);

    let mut fields = IndexMap::new();
    for (label, value) in labels.zip(values) {
        let key = label_key(&element_text(label));
        fields.insert(key, element_text(value).trim().to_string());
    }

    ::log::trace!("Section {} has {} fields", id, fields.len());

    Ok(SectionRecord {
        id: id.to_string(),
        fields,
    })
}

/// Trims a label and drops its trailing colon(s)
pub fn label_key(label: &str) -> String {
    label.trim().trim_end_matches(':').to_string()
}
