pub mod description;
pub mod family;
pub mod images;
pub mod tabs;

#[cfg(test)]
pub(crate) mod tests;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::SiteLayout;
use crate::error::{ExtractionError, HarvestError};
use crate::results::{FamilyInfo, ImageAsset, SectionRecord};

/// Parsed page markup. Read-only once built.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }
}

/// Compiled form of a [`SiteLayout`]
#[derive(Debug, Clone)]
pub struct Layout {
    pub section_container: Selector,
    pub info_list: Selector,
    pub label: Selector,
    pub value: Selector,
    pub description: Selector,
    pub slide: Selector,
    pub slide_image: Selector,
    pub anchor: Selector,
    pub lazy_src_attr: String,
    pub family_marker: String,
}

impl Layout {
    /// Compiles every selector, reporting the first invalid one
    pub fn compile(site: &SiteLayout) -> Result<Self, HarvestError> {
        Ok(Self {
            section_container: parse_selector("section_container", &site.section_container)?,
            info_list: parse_selector("info_list", &site.info_list)?,
            label: parse_selector("label", &site.label)?,
            value: parse_selector("value", &site.value)?,
            description: parse_selector("description", &site.description)?,
            slide: parse_selector("slide", &site.slide)?,
            slide_image: parse_selector("slide_image", &site.slide_image)?,
            anchor: parse_selector("anchor", "a")?,
            lazy_src_attr: site.lazy_src_attr.clone(),
            family_marker: site.family_marker.clone(),
        })
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::compile(&SiteLayout::default()).expect("Default selectors should be valid")
    }
}

fn parse_selector(field: &'static str, selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        field,
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Concatenated text of an element and its descendants
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Everything the extractors pull out of one document
#[derive(Debug)]
pub struct PageExtract {
    pub sections: Result<Vec<SectionRecord>, ExtractionError>,
    pub description: String,
    pub family: Result<FamilyInfo, ExtractionError>,
    pub assets: Vec<ImageAsset>,
}

/// Runs all extractors over a document. Each field fails independently.
pub fn extract_all(
    doc: &Document,
    layout: &Layout,
    section_ids: &[String],
    base_url: &Url,
) -> PageExtract {
    let sections = tabs::extract(doc, layout, section_ids);
    let description = description::extract(doc, layout);
    let family = family::extract(doc, layout);
    let assets = images::discover(doc, layout, base_url);

    ::log::debug!(
        "Extracted {} from {}: sections ok={}, family ok={}, {} images",
        if description.is_empty() { "no description" } else { "description" },
        base_url,
        sections.is_ok(),
        family.is_ok(),
        assets.len()
    );

    PageExtract {
        sections,
        description,
        family,
        assets,
    }
}
