use docsweep::config::SectionConfig;
use docsweep::structure::{ReachabilityAnalyzer, ReferenceGraph};
use docsweep::{
    analyze, clean, CleanCategory, CleanOptions, DetectionConfig, PartStore, Pipeline,
    PipelineConfig, StructuralValidator,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::fixtures::DocxFixture;

fn cluttered() -> DocxFixture {
    DocxFixture::new()
        .body(concat!(
            r#"<w:p w:rsidR="00AA"><w:pPr><w:pStyle w:val="Heading"/></w:pPr><w:r><w:t>SECTION 09 91 23</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:rPr><w:rStyle w:val="NoteChar"/></w:rPr><w:t>Copyright 2023 Example Corp.</w:t></w:r></w:p>"#,
            r#"<w:p><w:bookmarkStart w:id="3" w:name="_Hlk1234"/><w:r><w:drawing><a:blip xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" r:embed="rId4"/></w:drawing></w:r><w:bookmarkEnd w:id="3"/><w:r/></w:p>"#,
        ))
        .styles(concat!(
            r#"<w:style w:type="paragraph" w:styleId="Base"><w:name w:val="Base"/></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="Heading"><w:name w:val="Heading"/><w:basedOn w:val="Base"/></w:style>"#,
            r#"<w:style w:type="character" w:styleId="NoteChar"><w:name w:val="Note Char"/></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="Unused"><w:name w:val="Unused"/></w:style>"#,
        ))
        .relationship("rId4", "image", "media/image1.png", false)
        .relationship("rId8", "hyperlink", "https://example.com", true)
        .part("word/media/image1.png", vec![7u8; 32])
        .part("word/media/image9.png", vec![9u8; 256])
}

fn detection() -> DetectionConfig {
    DetectionConfig {
        copyright_notices: SectionConfig {
            text_patterns: vec!["copyright".into()],
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_clean_never_orphans_a_used_resource() {
    let mut store = cluttered().store();
    let graph = ReferenceGraph::build(&store);
    let used = ReachabilityAnalyzer::new().analyze(&store, &graph);

    let report = analyze(&store);
    let result = clean(&mut store, report, CleanOptions::all());
    assert!(result.success, "{:?}", result.errors);

    let after = ReferenceGraph::build(&store);
    for style in used.styles.iter().filter(|s| graph.styles.contains_key(*s)) {
        assert!(after.styles.contains_key(style), "used style {} was removed", style);
    }
    for key in &used.relationships {
        assert!(after.relationships.contains_key(key), "used relationship {} was removed", key);
    }
    assert!(store.contains("word/media/image1.png"));
    assert!(!store.contains("word/media/image9.png"));
}

#[test]
fn test_clean_then_validate_and_reanalyze() {
    let mut store = cluttered().store();
    let report = analyze(&store);
    assert_eq!(report.orphans.styles.len(), 1);
    assert_eq!(report.orphans.relationships.len(), 1);
    assert_eq!(report.orphans.media.len(), 1);

    let result = clean(&mut store, report, CleanOptions::all());
    assert!(result.success);
    assert!(result.validation.as_ref().unwrap().passed);
    assert!(StructuralValidator::new().ensure_valid(&store).is_ok());

    let again = analyze(&store);
    assert!(again.is_clean(), "{}", again.to_json().unwrap());
}

#[test]
fn test_options_without_media_keep_orphaned_media() {
    let mut store = cluttered().store();
    let report = analyze(&store);
    let result = clean(&mut store, report, CleanOptions::all().without(CleanCategory::Media));
    assert_eq!(result.statistics.media, 0);
    assert!(store.contains("word/media/image9.png"));
}

#[test]
fn test_directory_round_trip_through_pipeline() {
    let dir = TempDir::new().unwrap();
    cluttered().write_to(dir.path());

    let pipeline = Pipeline::new(PipelineConfig {
        detection: detection(),
        options: CleanOptions::all(),
        dry_run: false,
        content: true,
        deep: true,
    })
    .unwrap();
    let outcome = pipeline.run_dir(dir.path()).unwrap();

    assert!(outcome.success());
    assert!(outcome.committed);
    assert_eq!(outcome.processing.as_ref().unwrap().nodes_removed, 1);
    let clean = outcome.clean.as_ref().unwrap();
    // NoteChar becomes orphaned once the copyright paragraph is gone
    assert_eq!(clean.statistics.styles, 2);

    assert!(!dir.path().join("word/media/image9.png").exists());
    assert!(dir.path().join("word/media/image1.png").exists());

    let reloaded = PartStore::load_dir(dir.path()).unwrap();
    assert!(StructuralValidator::new().validate(&reloaded).passed);
    let document = String::from_utf8(reloaded.get("word/document.xml").unwrap().to_bytes()).unwrap();
    assert!(document.contains("SECTION 09 91 23"));
    assert!(!document.contains("Copyright"));
    assert!(analyze(&reloaded).is_clean());
}

#[test]
fn test_dry_run_leaves_directory_untouched() {
    let dir = TempDir::new().unwrap();
    cluttered().write_to(dir.path());
    let before = std::fs::read(dir.path().join("word/document.xml")).unwrap();

    let pipeline = Pipeline::new(PipelineConfig {
        detection: detection(),
        options: CleanOptions::all(),
        dry_run: true,
        content: true,
        deep: true,
    })
    .unwrap();
    let outcome = pipeline.run_dir(dir.path()).unwrap();

    assert!(!outcome.committed);
    assert_eq!(outcome.clean.unwrap().statistics.media, 1);
    assert_eq!(std::fs::read(dir.path().join("word/document.xml")).unwrap(), before);
    assert!(dir.path().join("word/media/image9.png").exists());
}

#[test]
fn test_broken_container_is_not_committed() {
    let dir = TempDir::new().unwrap();
    cluttered().write_to(dir.path());
    std::fs::remove_file(dir.path().join("_rels/.rels")).unwrap();

    let pipeline = Pipeline::new(PipelineConfig {
        detection: DetectionConfig::default(),
        options: CleanOptions::all(),
        dry_run: false,
        content: false,
        deep: true,
    })
    .unwrap();
    let outcome = pipeline.run_dir(dir.path()).unwrap();

    assert!(!outcome.success());
    assert!(!outcome.committed);
    assert!(dir.path().join("word/media/image9.png").exists());
}
