use docsweep::scanner::{scan_all, CruftKind, EmptyElementScanner};
use docsweep::types::{XmlTree, W_NS};
use docsweep::{analyze, clean, CleanCategory, CleanOptions};
use pretty_assertions::assert_eq;

use crate::fixtures::{part_text, DocxFixture};

const THEME: &str = r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office"><a:themeElements><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/><a:font script="Jpan" typeface="Yu Gothic Light"/><a:font script="Arab" typeface="Times New Roman"/></a:majorFont></a:fontScheme></a:themeElements></a:theme>"#;

const SETTINGS: &str = r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:proofState w:spelling="clean"/><w:compat><w:useFELayout/><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="15"/><w:compatSetting w:name="overrideTableStyleFontSizeAndJustification" w:uri="http://schemas.microsoft.com/office/word" w:val="1"/></w:compat></w:settings>"#;

fn runs(xml: &str) -> (XmlTree, Vec<docsweep::types::NodeId>) {
    let document = format!(
        r#"<w:p xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{}</w:p>"#,
        xml
    );
    let tree = XmlTree::parse(document.as_bytes()).unwrap();
    let runs = tree.elements_named(W_NS, "r").collect();
    (tree, runs)
}

#[test]
fn test_empty_text_run_is_empty_but_drawing_run_is_not() {
    let (tree, runs) = runs("<w:r><w:t></w:t></w:r><w:r><w:drawing/></w:r><w:r><w:rPr><w:b/></w:rPr><w:tab/></w:r>");
    assert!(EmptyElementScanner::is_empty_run(&tree, runs[0]));
    assert!(!EmptyElementScanner::is_empty_run(&tree, runs[1]));
    assert!(!EmptyElementScanner::is_empty_run(&tree, runs[2]));
}

#[test]
fn test_go_back_pair_counts_as_one_bookmark() {
    let mut store = DocxFixture::new()
        .body(r#"<w:p><w:bookmarkStart w:id="0" w:name="_GoBack"/><w:r><w:t>Text</w:t></w:r><w:bookmarkEnd w:id="0"/><w:bookmarkStart w:id="1" w:name="Keep"/><w:bookmarkEnd w:id="1"/></w:p>"#)
        .store();

    let report = analyze(&store);
    assert_eq!(report.cruft.occurrences(CruftKind::InternalBookmarks), 1);

    let result = clean(&mut store, report, CleanOptions::only(CleanCategory::InternalBookmarks));
    assert_eq!(result.statistics.internal_bookmarks, 1);

    let document = part_text(&store, "word/document.xml");
    assert!(!document.contains("_GoBack"));
    assert!(!document.contains(r#"w:id="0""#));
    assert!(document.contains(r#"w:name="Keep""#));
    assert!(document.contains(r#"<w:bookmarkEnd w:id="1"/>"#));
}

#[test]
fn test_theme_and_settings_cruft_is_found_and_removed() {
    let mut store = DocxFixture::new()
        .body(r#"<w:p><w:proofErr w:type="spellStart"/><w:r><w:t>teh</w:t></w:r><w:proofErr w:type="spellEnd"/></w:p>"#)
        .part("word/theme/theme1.xml", THEME)
        .part("word/settings.xml", SETTINGS)
        .relationship("rId2", "settings", "settings.xml", false)
        .relationship("rId3", "theme", "theme/theme1.xml", false)
        .store();

    let cruft = scan_all(&store);
    assert_eq!(cruft.occurrences(CruftKind::FontScripts), 2);
    assert_eq!(cruft.occurrences(CruftKind::CompatSettings), 2);
    assert_eq!(cruft.occurrences(CruftKind::ProofState), 3);

    let report = analyze(&store);
    let result = clean(&mut store, report, CleanOptions::all());
    assert!(result.success);
    assert_eq!(result.statistics.font_scripts, 2);
    assert_eq!(result.statistics.compat_settings, 2);
    assert_eq!(result.statistics.proof_state, 3);

    let theme = part_text(&store, "word/theme/theme1.xml");
    assert!(theme.contains("Calibri Light"));
    assert!(!theme.contains("Jpan"));
    let settings = part_text(&store, "word/settings.xml");
    assert!(settings.contains("overrideTableStyleFontSizeAndJustification"));
    assert!(!settings.contains("compatibilityMode"));
    assert!(!settings.contains("proofState"));
    assert!(!part_text(&store, "word/document.xml").contains("proofErr"));
}

#[test]
fn test_revision_markers_are_stripped_everywhere() {
    let mut store = DocxFixture::new()
        .body(r#"<w:p w:rsidR="00A1" w:rsidRDefault="00A1" w:rsidP="00B2"><w:r w:rsidRPr="00C3"><w:t>x</w:t></w:r></w:p><w:sectPr w:rsidR="00A1"/>"#)
        .store();

    let report = analyze(&store);
    assert_eq!(report.statistics.revision_attributes, 5);

    let result = clean(&mut store, report, CleanOptions::only(CleanCategory::RevisionMarkers));
    assert_eq!(result.statistics.revision_markers, 5);
    assert!(!part_text(&store, "word/document.xml").contains("rsid"));
}
