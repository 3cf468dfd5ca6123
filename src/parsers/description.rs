use crate::parsers::{Document, Layout};
use crate::utils::collapse_whitespace;

/// Normalized description text, or an empty string when the page has none
pub fn extract(doc: &Document, layout: &Layout) -> String {
    match doc.html().select(&layout.description).next() {
        Some(container) => normalize(&container.text().collect::<Vec<_>>().join(" ")),
        None => String::new(),
    }
}

/// Collapses whitespace runs and trims. Idempotent.
pub fn normalize(text: &str) -> String {
    collapse_whitespace(text)
}
