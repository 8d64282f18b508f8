use std::collections::BTreeMap;

use docsweep::config::SectionConfig;
use docsweep::{process, ContentKind, DetectionConfig, DetectionEngine};
use pretty_assertions::assert_eq;

use crate::fixtures::{part_text, DocxFixture};

fn engine() -> DetectionEngine {
    let config = DetectionConfig {
        specifier_notes: SectionConfig {
            text_patterns: vec![r"^\s*specifier note".into()],
            formatting_signals: BTreeMap::from([("colors".to_string(), vec!["0000FF".to_string()])]),
            ..Default::default()
        },
        copyright_notices: SectionConfig {
            text_patterns: vec!["copyright".into(), r"all rights reserved".into()],
            ..Default::default()
        },
        attribution_references: SectionConfig {
            text_patterns: vec![r"\bspecagent\b".into()],
            ..Default::default()
        },
        editorial_artifacts: SectionConfig {
            text_patterns: vec![r"\[insert [^\]]+\]".into()],
            ..Default::default()
        },
        preserve_patterns: SectionConfig {
            text_patterns: vec![r"^PART \d".into()],
            ..Default::default()
        },
        style_based_detection: SectionConfig {
            paragraph_styles: vec!["SpecNote".into()],
            ..Default::default()
        },
        ..Default::default()
    };
    DetectionEngine::from_config(&config).unwrap()
}

#[test]
fn test_italic_coloured_run_with_whitespace_run_removes_paragraph() {
    let mut store = DocxFixture::new()
        .body(concat!(
            r#"<w:p><w:r><w:rPr><w:i/><w:color w:val="0000ff"/></w:rPr><w:t>Coordinate with Division 01.</w:t></w:r>"#,
            r#"<w:r><w:t xml:space="preserve">   </w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>Provide products as specified.</w:t></w:r></w:p>"#,
        ))
        .store();

    let result = process(&mut store, &engine(), false);
    assert_eq!(result.nodes_removed, 1);
    assert_eq!(result.detections.len(), 1);
    assert_eq!(result.detections[0].kind, ContentKind::SpecifierNote);
    assert!((result.detections[0].confidence - 0.5).abs() < 1e-9);

    let document = part_text(&store, "word/document.xml");
    assert!(!document.contains("Division 01"));
    assert!(document.contains("Provide products"));
}

#[test]
fn test_specifier_run_with_every_signal_is_clamped_and_paragraph_removed() {
    // The note pattern ends the text, so only the run matches it, not the
    // paragraph with its trailing whitespace run
    let config = DetectionConfig {
        specifier_notes: SectionConfig {
            text_patterns: vec![r"^specifier note:.*\.$".into()],
            formatting_signals: BTreeMap::from([("colors".to_string(), vec!["0000FF".to_string()])]),
            ..Default::default()
        },
        style_based_detection: SectionConfig {
            character_styles: vec!["SpecNoteChar".into()],
            ..Default::default()
        },
        ..Default::default()
    };
    let engine = DetectionEngine::from_config(&config).unwrap();
    let mut store = DocxFixture::new()
        .body(concat!(
            r#"<w:p><w:r><w:rPr><w:rStyle w:val="SpecNoteChar"/><w:i/><w:color w:val="0000FF"/></w:rPr>"#,
            r#"<w:t>Specifier Note: Coordinate with Division 01.</w:t></w:r>"#,
            r#"<w:r><w:t xml:space="preserve">  </w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>Provide products as specified.</w:t></w:r></w:p>"#,
        ))
        .store();

    let result = process(&mut store, &engine, false);
    assert_eq!(result.detections.len(), 1);
    let detection = &result.detections[0];
    assert_eq!(detection.kind, ContentKind::SpecifierNote);
    assert!((detection.confidence - 1.0).abs() < 1e-9);
    assert!(detection.reason.contains("Italic text"));
    assert!(detection.reason.contains("Style: SpecNoteChar"));
    assert_eq!(result.nodes_removed, 1);

    let document = part_text(&store, "word/document.xml");
    assert!(!document.contains("Specifier Note"));
    assert!(!document.contains("SpecNoteChar"));
    assert!(document.contains("Provide products"));
}

#[test]
fn test_copyright_paragraphs_are_removed_with_bonus_for_two_indicators() {
    let mut store = DocxFixture::new()
        .body(concat!(
            "<w:p><w:r><w:t>Copyright 2024 ARCOM.</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>MasterSpec, Copyright ARCOM. All rights reserved.</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>Submit product data.</w:t></w:r></w:p>",
        ))
        .store();

    let result = process(&mut store, &engine(), false);
    let confidences: Vec<f64> = result.detections.iter().map(|d| d.confidence).collect();
    assert!(result.detections.iter().all(|d| d.kind == ContentKind::Copyright));
    assert_eq!(confidences.len(), 2);
    assert!((confidences[0] - 0.7).abs() < 1e-9);
    assert!((confidences[1] - 1.0).abs() < 1e-9);
    assert!(result.detections[1].reason.contains("Multiple indicators: 2"));
    assert_eq!(result.nodes_removed, 2);

    let document = part_text(&store, "word/document.xml");
    assert!(!document.contains("ARCOM"));
    assert!(document.contains("Submit product data."));
}

#[test]
fn test_attribution_paragraph_is_removed() {
    let mut store = DocxFixture::new()
        .body(concat!(
            "<w:p><w:r><w:t>Prepared with SpecAgent 2.1</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>Submit samples.</w:t></w:r></w:p>",
        ))
        .store();

    let result = process(&mut store, &engine(), false);
    assert_eq!(result.detections.len(), 1);
    assert_eq!(result.detections[0].kind, ContentKind::Attribution);
    assert!((result.detections[0].confidence - 1.0).abs() < 1e-9);
    assert_eq!(result.nodes_removed, 1);

    let document = part_text(&store, "word/document.xml");
    assert!(!document.contains("SpecAgent"));
    assert!(document.contains("Submit samples."));
}

#[test]
fn test_preserve_pattern_vetoes_copyright() {
    let mut store = DocxFixture::new()
        .body("<w:p><w:r><w:t>PART 1 - Copyright requirements</w:t></w:r></w:p>")
        .store();

    let result = process(&mut store, &engine(), false);
    assert_eq!(result.preserved_count, 1);
    assert_eq!(result.removed_count, 0);
    assert!(part_text(&store, "word/document.xml").contains("PART 1"));
}

#[test]
fn test_copyright_bonus_for_multiple_patterns() {
    let mut store = DocxFixture::new()
        .body("<w:p><w:r><w:t>Copyright 2024 ARCOM. All rights reserved.</w:t></w:r></w:p>")
        .store();

    let result = process(&mut store, &engine(), true);
    let detection = &result.detections[0];
    assert_eq!(detection.kind, ContentKind::Copyright);
    assert!((detection.confidence - 1.0).abs() < 1e-9);
}

#[test]
fn test_paragraph_style_marks_specifier_note() {
    let mut store = DocxFixture::new()
        .body(r#"<w:p><w:pPr><w:pStyle w:val="SpecNote"/></w:pPr><w:r><w:t>Edit to suit project.</w:t></w:r></w:p>"#)
        .store();

    let result = process(&mut store, &engine(), false);
    assert_eq!(result.nodes_removed, 1);
    assert_eq!(result.detections[0].kind, ContentKind::SpecifierNote);
}

#[test]
fn test_mixed_paragraph_keeps_unflagged_run() {
    let mut store = DocxFixture::new()
        .body(concat!(
            r#"<w:p><w:r><w:t xml:space="preserve">Manufacturer: </w:t></w:r>"#,
            r#"<w:r><w:rPr><w:vanish/></w:rPr><w:t>internal only</w:t></w:r></w:p>"#,
        ))
        .store();

    let result = process(&mut store, &engine(), false);
    assert_eq!(result.nodes_removed, 0);
    assert!(result.detections.iter().any(|d| d.kind == ContentKind::HiddenText));
    let document = part_text(&store, "word/document.xml");
    assert!(document.contains("Manufacturer"));
    assert!(document.contains("internal only"));
}

#[test]
fn test_editorial_placeholder_paragraph_is_removed() {
    let mut store = DocxFixture::new()
        .body("<w:p><w:r><w:t>[Insert project name]</w:t></w:r></w:p>")
        .store();

    let result = process(&mut store, &engine(), false);
    assert_eq!(result.detections[0].kind, ContentKind::EditorialArtifact);
    assert!((result.detections[0].confidence - 0.8).abs() < 1e-9);
    assert_eq!(result.nodes_removed, 1);
    assert!(!part_text(&store, "word/document.xml").contains("project name"));
}

#[test]
fn test_headers_and_footers_are_processed() {
    let footer = r#"<w:ftr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:p><w:r><w:t>Copyright notice</w:t></w:r></w:p></w:ftr>"#;
    let mut store = DocxFixture::new()
        .body("<w:p><w:r><w:t>Body</w:t></w:r></w:p>")
        .part("word/footer1.xml", footer)
        .store();

    let result = process(&mut store, &engine(), false);
    assert_eq!(result.nodes_removed, 1);
    assert_eq!(result.detections[0].origin.part, "word/footer1.xml");
    let footer = part_text(&store, "word/footer1.xml");
    assert!(!footer.contains("Copyright"));
    // A footer keeps its last paragraph
    assert!(footer.contains("<w:p/>"));
}

#[test]
fn test_invalid_pattern_is_a_config_error() {
    let config = DetectionConfig {
        copyright_notices: SectionConfig {
            text_patterns: vec!["(unclosed".into()],
            ..Default::default()
        },
        ..Default::default()
    };
    let error = DetectionEngine::from_config(&config).err().unwrap();
    assert!(error.to_string().contains("copyright_notices"));
}

#[test]
fn test_yaml_config_round_trips_through_engine() {
    let yaml = indoc::indoc! {r#"
        copyright_notices:
          text_patterns:
            - "copyright"
        hidden_text:
          enabled: false
    "#};
    let config: DetectionConfig = yaml.parse().unwrap();
    assert!(!config.hidden_text.enabled);
    assert!(config.specifier_notes.enabled);
    assert!(DetectionEngine::from_config(&config).is_ok());
}
