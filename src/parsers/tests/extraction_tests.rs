use crate::error::ExtractionError;
use crate::parsers::tests::fixtures;
use crate::parsers::{Document, Layout, description, extract_all, family, images, tabs};
use url::Url;

fn section_ids() -> Vec<String> {
    (1..=5).map(|i| format!("tab{i}")).collect()
}

fn base() -> Url {
    Url::parse("https://site/en/plants/pteaqu/").unwrap()
}

#[cfg(test)]
mod tab_tests {
    use super::*;

    #[test]
    fn test_all_sections_in_order() {
        let doc = Document::parse(&fixtures::full_page());
        let records = tabs::extract(&doc, &Layout::default(), &section_ids()).unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["tab1", "tab2", "tab3", "tab4", "tab5"]);

        let first = &records[0];
        let labels: Vec<_> = first.fields.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["Name tab1", "Color"]);
        assert_eq!(first.get("Name tab1"), Some("Value tab1"));
        assert_eq!(first.get("Color"), Some("Green"));
    }

    #[test]
    fn test_any_missing_section_fails_the_page() {
        for missing in ["tab1", "tab3", "tab5"] {
            let doc = Document::parse(&fixtures::page_without_section(missing));
            let result = tabs::extract(&doc, &Layout::default(), &section_ids());
            assert_eq!(
                result,
                Err(ExtractionError::MissingSection {
                    section: missing.to_string()
                }),
                "missing {missing} should fail the whole record"
            );
        }
    }

    #[test]
    fn test_missing_info_list() {
        let doc = Document::parse(&fixtures::page_without_info_list("tab2"));
        let result = tabs::extract(&doc, &Layout::default(), &section_ids());
        assert_eq!(
            result,
            Err(ExtractionError::MissingInfoList {
                section: "tab2".to_string()
            })
        );
    }

    #[test]
    fn test_first_failure_wins() {
        let html = r#"<div id="tab1"><p>empty</p></div>"#;
        let doc = Document::parse(html);
        let result = tabs::extract(&doc, &Layout::default(), &section_ids());
        assert_eq!(
            result,
            Err(ExtractionError::MissingInfoList {
                section: "tab1".to_string()
            })
        );
    }

    #[test]
    fn test_duplicate_labels_overwrite() {
        let html = r#"<div id="tab1"><dl class="info">
            <dt>Height:</dt><dd>1 m</dd>
            <dt>Leaf:</dt><dd>Pinnate</dd>
            <dt>Height:</dt><dd>2 m</dd>
        </dl></div>"#;
        let doc = Document::parse(html);
        let records =
            tabs::extract(&doc, &Layout::default(), &["tab1".to_string()]).unwrap();
        assert_eq!(records[0].fields.len(), 2);
        assert_eq!(records[0].get("Height"), Some("2 m"));
        let labels: Vec<_> = records[0].fields.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["Height", "Leaf"]);
    }

    #[test]
    fn test_unpaired_labels_are_ignored() {
        let html = r#"<div id="tab1"><dl class="info">
            <dt>Height:</dt><dd>1 m</dd>
            <dt>Orphan:</dt>
        </dl></div>"#;
        let doc = Document::parse(html);
        let records =
            tabs::extract(&doc, &Layout::default(), &["tab1".to_string()]).unwrap();
        assert_eq!(records[0].fields.len(), 1);
    }

    #[test]
    fn test_empty_section_list() {
        let doc = Document::parse("<html></html>");
        let records = tabs::extract(&doc, &Layout::default(), &[]).unwrap();
        assert!(records.is_empty());
    }
}

#[cfg(test)]
mod description_tests {
    use super::*;

    #[test]
    fn test_description_is_normalized() {
        let doc = Document::parse(&fixtures::full_page());
        assert_eq!(
            description::extract(&doc, &Layout::default()),
            "A large, coarse fern. Grows in open woodland."
        );
    }

    #[test]
    fn test_missing_description_is_empty() {
        let doc = Document::parse("<html><body><p>Nothing here</p></body></html>");
        assert_eq!(description::extract(&doc, &Layout::default()), "");
    }

    #[test]
    fn test_adjacent_inline_elements_are_separated() {
        let doc = Document::parse(r#"<div class="description"><i>Rosa</i><i>canina</i></div>"#);
        assert_eq!(description::extract(&doc, &Layout::default()), "Rosa canina");
    }
}

#[cfg(test)]
mod family_tests {
    use super::*;

    #[test]
    fn test_family_with_link() {
        let html = r#"<dl>
            <dt>Family: foo</dt>
            <dd><a href="/families/rosaceae">Rosaceae</a></dd>
        </dl>"#;
        let doc = Document::parse(html);
        let info = family::extract(&doc, &Layout::default()).unwrap();
        assert_eq!(info.name, "Rosaceae");
        assert_eq!(info.link.as_deref(), Some("/families/rosaceae"));
    }

    #[test]
    fn test_family_without_link() {
        let html = "<dl><dt>Family:</dt><dd> Poaceae </dd></dl>";
        let doc = Document::parse(html);
        let info = family::extract(&doc, &Layout::default()).unwrap();
        assert_eq!(info.name, "Poaceae");
        assert_eq!(info.link, None);
    }

    #[test]
    fn test_family_name_is_trimmed_only() {
        let html = "<dl><dt>Family:</dt><dd>\n  Rosaceae  (rose family)\n</dd></dl>";
        let doc = Document::parse(html);
        let info = family::extract(&doc, &Layout::default()).unwrap();
        assert_eq!(info.name, "Rosaceae  (rose family)");
    }

    #[test]
    fn test_first_matching_label_wins() {
        let html = "<dl>
            <dt>Genus:</dt><dd>Rosa</dd>
            <dt>Family:</dt><dd>Rosaceae</dd>
            <dt>Family:</dt><dd>Other</dd>
        </dl>";
        let doc = Document::parse(html);
        let info = family::extract(&doc, &Layout::default()).unwrap();
        assert_eq!(info.name, "Rosaceae");
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        let doc = Document::parse("<dl><dt>family:</dt><dd>Rosaceae</dd></dl>");
        assert_eq!(
            family::extract(&doc, &Layout::default()),
            Err(ExtractionError::NoFamilyLabel)
        );
    }

    #[test]
    fn test_label_without_value() {
        let doc = Document::parse("<dl><dt>Family:</dt></dl>");
        assert_eq!(
            family::extract(&doc, &Layout::default()),
            Err(ExtractionError::NoFamilyValue)
        );
    }

    #[test]
    fn test_label_followed_by_another_label() {
        let doc = Document::parse("<dl><dt>Family:</dt><dt>Genus:</dt><dd>Rosa</dd></dl>");
        assert_eq!(
            family::extract(&doc, &Layout::default()),
            Err(ExtractionError::NoFamilyValue)
        );
    }
}

#[cfg(test)]
mod image_tests {
    use super::*;

    fn urls(html: &str, base: &Url) -> Vec<String> {
        let doc = Document::parse(html);
        images::discover(&doc, &Layout::default(), base)
            .into_iter()
            .map(|a| a.source_url.to_string())
            .collect()
    }

    #[test]
    fn test_relative_reference_is_joined() {
        let base = Url::parse("https://site/en/plants/x/").unwrap();
        let html = r#"<div class="slide"><img data-src="../img/a.jpg"></div>"#;
        assert_eq!(urls(html, &base), vec!["https://site/en/plants/img/a.jpg"]);
    }

    #[test]
    fn test_absolute_reference_passes_through() {
        let html = r#"<div class="slide"><img data-src="https://cdn.example.org/p/a.jpg"></div>"#;
        assert_eq!(urls(html, &base()), vec!["https://cdn.example.org/p/a.jpg"]);
    }

    #[test]
    fn test_slides_without_source_are_skipped() {
        let doc = Document::parse(&fixtures::full_page());
        let assets = images::discover(&doc, &Layout::default(), &base());
        let found: Vec<_> = assets.iter().map(|a| a.source_url.as_str()).collect();
        assert_eq!(
            found,
            vec![
                "https://site/img/pteaqu1.jpg",
                "https://site/en/plants/pteaqu/pteaqu2.jpg"
            ]
        );
    }

    #[test]
    fn test_first_image_with_attribute_is_used() {
        let html = r#"<div class="slide">
            <img src="/spinner.gif">
            <img data-src="/img/real.jpg">
            <img data-src="/img/second.jpg">
        </div>"#;
        assert_eq!(urls(html, &base()), vec!["https://site/img/real.jpg"]);
    }

    #[test]
    fn test_empty_attribute_is_skipped() {
        let html = r#"<div class="slide"><img data-src="  "></div>"#;
        assert!(urls(html, &base()).is_empty());
    }

    #[test]
    fn test_duplicates_are_kept_in_order() {
        let html = r#"
            <div class="slide"><img data-src="/img/b.jpg"></div>
            <div class="slide"><img data-src="/img/a.jpg"></div>
            <div class="slide"><img data-src="/img/b.jpg"></div>"#;
        assert_eq!(
            urls(html, &base()),
            vec![
                "https://site/img/b.jpg",
                "https://site/img/a.jpg",
                "https://site/img/b.jpg"
            ]
        );
    }

    #[test]
    fn test_images_outside_slides_are_ignored() {
        let html = r#"<div class="gallery"><img data-src="/img/a.jpg"></div>"#;
        assert!(urls(html, &base()).is_empty());
    }
}

#[cfg(test)]
mod page_tests {
    use super::*;

    #[test]
    fn test_extract_all_fields_fail_independently() {
        let doc = Document::parse(&fixtures::page_without_section("tab2"));
        let extract = extract_all(&doc, &Layout::default(), &section_ids(), &base());

        assert!(extract.sections.is_err());
        assert!(!extract.description.is_empty());
        assert_eq!(extract.family.unwrap().name, "Dennstaedtiaceae");
        assert_eq!(extract.assets.len(), 2);
    }
}
