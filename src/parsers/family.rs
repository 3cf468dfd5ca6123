use scraper::ElementRef;

use crate::error::ExtractionError;
use crate::parsers::{Document, Layout, element_text};
use crate::results::FamilyInfo;

/// Reads the family field: the first label containing the family marker and
/// the value element that directly follows it.
pub fn extract(doc: &Document, layout: &Layout) -> Result<FamilyInfo, ExtractionError> {
    let label = doc
        .html()
        .select(&layout.label)
        .find(|el| element_text(*el).contains(&layout.family_marker))
        .ok_or(ExtractionError::NoFamilyLabel)?;

    // Skip whitespace text nodes, but only as far as the next element
    let value = label
        .next_siblings()
        .find_map(ElementRef::wrap)
        .filter(|el| layout.value.matches(el))
        .ok_or(ExtractionError::NoFamilyValue)?;

    let link = value
        .select(&layout.anchor)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

    Ok(FamilyInfo {
        name: element_text(value).trim().to_string(),
        link,
    })
}
