use url::Url;

use crate::parsers::{Document, Layout};
use crate::results::ImageAsset;

/// Collects one image per carousel slide, resolved against the page URL.
///
/// A slide contributes the first image carrying the lazy-load attribute.
/// Slides without one, or whose reference cannot be resolved, are skipped.
/// Document order is kept and duplicates are not removed.
pub fn discover(doc: &Document, layout: &Layout, base_url: &Url) -> Vec<ImageAsset> {
    let mut assets = Vec::new();

    for slide in doc.html().select(&layout.slide) {
        let reference = slide
            .select(&layout.slide_image)
            .find_map(|img| img.value().attr(&layout.lazy_src_attr))
            .map(str::trim)
            .filter(|r| !r.is_empty());

        let Some(reference) = reference else {
            ::log::debug!("Skipping slide without {} image", layout.lazy_src_attr);
            continue;
        };

        match base_url.join(reference) {
            Ok(resolved) => assets.push(ImageAsset::new(resolved)),
            Err(e) => {
                ::log::debug!("Skipping unresolvable image reference {}: {}", reference, e);
            }
        }
    }

    assets
}
