use std::collections::{BTreeMap, BTreeSet};

use docsweep::analyze;
use docsweep::structure::{close_styles, ReachabilityAnalyzer, ReferenceGraph};
use docsweep::types::{StyleRecord, StyleType};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::fixtures::DocxFixture;

#[test]
fn test_unused_hyperlink_is_orphaned_but_styles_relationship_is_not() {
    let store = DocxFixture::new()
        .body("<w:p><w:r><w:t>Plain</w:t></w:r></w:p>")
        .relationship("rId7", "hyperlink", "https://example.com/a", true)
        .store();

    let report = analyze(&store);
    let ids: Vec<&str> = report
        .orphans
        .relationships
        .iter()
        .map(|o| o.record.id.as_str())
        .collect();
    assert_eq!(ids, vec!["rId7"]);
    assert_eq!(report.orphans.relationships[0].reason, "Unreferenced hyperlink relationship");
}

#[test]
fn test_referenced_hyperlink_is_used() {
    let store = DocxFixture::new()
        .body(r#"<w:p><w:hyperlink r:id="rId7"><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p>"#)
        .relationship("rId7", "hyperlink", "https://example.com/a", true)
        .store();

    assert!(analyze(&store).orphans.relationships.is_empty());
}

#[test]
fn test_based_on_parent_is_used_through_child() {
    let store = DocxFixture::new()
        .body(r#"<w:p><w:pPr><w:pStyle w:val="Child"/></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#)
        .styles(concat!(
            r#"<w:style w:type="paragraph" w:styleId="Parent"><w:name w:val="Parent"/></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="Child"><w:name w:val="Child"/><w:basedOn w:val="Parent"/></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="Stray"><w:name w:val="Stray"/><w:basedOn w:val="Parent"/></w:style>"#,
        ))
        .store();

    let report = analyze(&store);
    let orphaned: Vec<&str> = report
        .orphans
        .styles
        .iter()
        .map(|o| o.record.style_id.as_str())
        .collect();
    assert_eq!(orphaned, vec!["Stray"]);
}

#[test]
fn test_media_referenced_by_drawing_is_kept() {
    let store = DocxFixture::new()
        .body(r#"<w:p><w:r><w:drawing><a:blip xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" r:embed="rId5"/></w:drawing></w:r></w:p>"#)
        .relationship("rId5", "image", "media/image1.png", false)
        .part("word/media/image1.png", vec![0u8; 64])
        .part("word/media/image2.png", vec![0u8; 128])
        .store();

    let report = analyze(&store);
    assert_eq!(report.orphans.media.len(), 1);
    assert_eq!(report.orphans.media[0].record.path, "word/media/image2.png");
    assert_eq!(report.savings.media, 128);
    assert!(report.orphans.relationships.is_empty());
}

#[test]
fn test_analysis_is_idempotent() {
    let store = DocxFixture::new()
        .body(r#"<w:p w:rsidR="0011"><w:bookmarkStart w:id="0" w:name="_GoBack"/><w:bookmarkEnd w:id="0"/><w:r><w:t>x</w:t></w:r></w:p>"#)
        .styles(r#"<w:style w:type="character" w:styleId="Unused"/>"#)
        .relationship("rId3", "hyperlink", "https://example.com", true)
        .store();

    let first = analyze(&store).to_json().unwrap();
    let second = analyze(&store).to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_malformed_part_contributes_nothing() {
    let store = DocxFixture::new()
        .body("<w:p><w:r><w:t>x</w:t></w:r></w:p>")
        .part("word/header1.xml", "<w:hdr><w:p>")
        .store();

    let report = analyze(&store);
    assert!(report.cruft.empty_elements.is_empty());
}

fn style(id: usize, based_on: Option<usize>) -> StyleRecord {
    StyleRecord {
        style_id: format!("S{}", id),
        name: None,
        style_type: StyleType::Paragraph,
        based_on: based_on.map(|parent| format!("S{}", parent)),
        next: None,
        linked: None,
        is_default: false,
    }
}

proptest! {
    // Each style may be based on any style (cycles included)
    #[test]
    fn prop_style_closure_is_closed_and_keeps_ancestors(
        parents in prop::collection::vec(prop::option::of(0usize..20), 1..20),
        seeds in prop::collection::btree_set(0usize..20, 0..5),
    ) {
        let count = parents.len();
        let styles: BTreeMap<String, StyleRecord> = parents
            .iter()
            .enumerate()
            .map(|(id, parent)| {
                let record = style(id, parent.map(|p| p % count));
                (record.style_id.clone(), record)
            })
            .collect();

        let mut used: BTreeSet<String> = seeds
            .iter()
            .filter(|seed| **seed < count)
            .map(|seed| format!("S{}", seed))
            .collect();
        let initial = used.clone();
        close_styles(&mut used, &styles);

        prop_assert!(initial.is_subset(&used));
        for id in &used {
            if let Some(record) = styles.get(id) {
                for dependency in record.dependencies() {
                    prop_assert!(used.contains(dependency));
                }
            }
        }
        // Every ancestor of a seed is reached
        for seed in &initial {
            let mut current = styles.get(seed).and_then(|s| s.based_on.clone());
            let mut steps = 0;
            while let Some(parent) = current {
                prop_assert!(used.contains(&parent));
                steps += 1;
                if steps > count {
                    break;
                }
                current = styles.get(&parent).and_then(|s| s.based_on.clone());
            }
        }
    }
}

#[test]
fn test_builtin_styles_are_always_used() {
    let store = DocxFixture::new()
        .body("<w:p><w:r><w:t>x</w:t></w:r></w:p>")
        .styles(r#"<w:style w:type="table" w:styleId="TableNormal"><w:name w:val="Normal Table"/></w:style>"#)
        .store();

    let graph = ReferenceGraph::build(&store);
    let used = ReachabilityAnalyzer::new().analyze(&store, &graph);
    assert!(used.styles.contains("TableNormal"));
    assert!(analyze(&store).orphans.styles.is_empty());
}
