//! Safe removal of orphaned resources and cruft
//!
//! Categories are applied in a fixed order, each behind its own flag. A
//! category that cannot touch a part records a warning and the remaining
//! categories still run. The structural validator has the last word.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::{CleanCategory, CleanOptions};
use crate::error::CleanerError;
use crate::report::savings::{
    BOOKMARK_BYTES, COMPAT_SETTING_BYTES, EMPTY_ELEMENT_BYTES, FONT_MAPPING_BYTES,
    PROOF_MARKER_BYTES, RELATIONSHIP_BYTES, REVISION_ATTRIBUTE_BYTES, STYLE_BYTES,
};
use crate::report::OrphanReport;
use crate::scanner::proof_state_scanner::PROOF_TARGETS;
use crate::scanner::{
    BookmarkScanner, CompatScanner, CruftKind, EmptyElementScanner, FontScriptScanner,
    ProofStateScanner, RevisionScanner,
};
use crate::types::{NodeId, PartStore, XmlTree, A_NS, PKG_REL_NS, SETTINGS_PATH, STYLES_PATH, W_NS};
use crate::verification::{StructuralValidator, VerificationResult};

/// Per-category removal counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningStatistics {
    pub media: usize,
    pub relationships: usize,
    pub styles: usize,
    pub revision_markers: usize,
    pub empty_elements: usize,
    pub font_scripts: usize,
    pub compat_settings: usize,
    pub internal_bookmarks: usize,
    pub proof_state: usize,
    pub bytes_saved: u64,
    pub duration_ms: u64,
}

impl CleaningStatistics {
    pub fn count(&self, category: CleanCategory) -> usize {
        match category {
            CleanCategory::Media => self.media,
            CleanCategory::Relationships => self.relationships,
            CleanCategory::Styles => self.styles,
            CleanCategory::RevisionMarkers => self.revision_markers,
            CleanCategory::EmptyElements => self.empty_elements,
            CleanCategory::FontScripts => self.font_scripts,
            CleanCategory::CompatSettings => self.compat_settings,
            CleanCategory::InternalBookmarks => self.internal_bookmarks,
            CleanCategory::ProofState => self.proof_state,
        }
    }

    fn record(&mut self, category: CleanCategory, removed: usize, bytes: u64) {
        let slot = match category {
            CleanCategory::Media => &mut self.media,
            CleanCategory::Relationships => &mut self.relationships,
            CleanCategory::Styles => &mut self.styles,
            CleanCategory::RevisionMarkers => &mut self.revision_markers,
            CleanCategory::EmptyElements => &mut self.empty_elements,
            CleanCategory::FontScripts => &mut self.font_scripts,
            CleanCategory::CompatSettings => &mut self.compat_settings,
            CleanCategory::InternalBookmarks => &mut self.internal_bookmarks,
            CleanCategory::ProofState => &mut self.proof_state,
        };
        *slot += removed;
        self.bytes_saved += bytes;
    }

    /// Total removed items across categories
    pub fn total_removed(&self) -> usize {
        CleanCategory::ORDERED.iter().map(|c| self.count(*c)).sum()
    }
}

/// Outcome of a clean
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanResult {
    pub statistics: CleaningStatistics,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    /// Validation of the cleaned store; absent for a projection
    pub validation: Option<VerificationResult>,
    pub success: bool,
}

impl CleanResult {
    /// What a clean with these options would remove, without touching anything
    pub fn projected(report: &OrphanReport, options: CleanOptions) -> Self {
        let savings = &report.savings;
        let mut statistics = CleaningStatistics::default();
        for category in CleanCategory::ORDERED {
            if !options.includes(category) {
                continue;
            }
            let (count, bytes) = match category {
                CleanCategory::Media => (report.orphans.media.len(), savings.media),
                CleanCategory::Relationships => {
                    (report.orphans.relationships.len(), savings.relationships)
                }
                CleanCategory::Styles => (report.orphans.styles.len(), savings.styles),
                CleanCategory::RevisionMarkers => (
                    report.cruft.occurrences(CruftKind::RevisionMarkers),
                    savings.revision_markers,
                ),
                CleanCategory::EmptyElements => (
                    report.cruft.occurrences(CruftKind::EmptyElements),
                    savings.empty_elements,
                ),
                CleanCategory::FontScripts => (
                    report.cruft.occurrences(CruftKind::FontScripts),
                    savings.font_scripts,
                ),
                CleanCategory::CompatSettings => (
                    report.cruft.occurrences(CruftKind::CompatSettings),
                    savings.compat_settings,
                ),
                CleanCategory::InternalBookmarks => (
                    report.cruft.occurrences(CruftKind::InternalBookmarks),
                    savings.internal_bookmarks,
                ),
                CleanCategory::ProofState => (
                    report.cruft.occurrences(CruftKind::ProofState),
                    savings.proof_state,
                ),
            };
            statistics.record(category, count, bytes);
        }
        Self {
            statistics,
            success: true,
            ..Default::default()
        }
    }
}

/// Applies a report's removals to a part store
#[derive(Debug, Default)]
pub struct SafeRemover {
    validator: StructuralValidator,
}

impl SafeRemover {
    pub fn new() -> Self {
        Self {
            validator: StructuralValidator::new(),
        }
    }

    /// Consumes the report; a report drives at most one clean
    #[instrument(skip(self, store, report))]
    pub fn clean(&self, store: &mut PartStore, report: OrphanReport, options: CleanOptions) -> CleanResult {
        info!("Starting clean");
        let start_time = Instant::now();
        let mut result = CleanResult::default();

        for category in CleanCategory::ORDERED {
            if !options.includes(category) {
                debug!("Skipping {}", category);
                continue;
            }
            let (removed, bytes) = match category {
                CleanCategory::Media => self.remove_media(store, &report),
                CleanCategory::Relationships => {
                    let n = self.remove_relationships(store, &report, &mut result.warnings);
                    (n, n as u64 * RELATIONSHIP_BYTES)
                }
                CleanCategory::Styles => {
                    let n = self.remove_styles(store, &report, &mut result.warnings);
                    (n, n as u64 * STYLE_BYTES)
                }
                CleanCategory::RevisionMarkers => {
                    let n = self.remove_revision_markers(store, &mut result.warnings);
                    (n, n as u64 * REVISION_ATTRIBUTE_BYTES)
                }
                CleanCategory::EmptyElements => {
                    let n = self.remove_empty_elements(store, &mut result.warnings);
                    (n, n as u64 * EMPTY_ELEMENT_BYTES)
                }
                CleanCategory::FontScripts => {
                    let n = self.remove_font_scripts(store, &mut result.warnings);
                    (n, n as u64 * FONT_MAPPING_BYTES)
                }
                CleanCategory::CompatSettings => {
                    let n = self.remove_compat_settings(store, &mut result.warnings);
                    (n, n as u64 * COMPAT_SETTING_BYTES)
                }
                CleanCategory::InternalBookmarks => {
                    let n = self.remove_internal_bookmarks(store, &mut result.warnings);
                    (n, n as u64 * BOOKMARK_BYTES)
                }
                CleanCategory::ProofState => {
                    let n = self.remove_proof_state(store, &mut result.warnings);
                    (n, n as u64 * PROOF_MARKER_BYTES)
                }
            };
            debug!("Removed {} item(s) for {}", removed, category);
            result.statistics.record(category, removed, bytes);
        }

        let validation = self.validator.validate(store);
        result
            .errors
            .extend(validation.failures().filter_map(|check| check.details.clone()));
        result.validation = Some(validation);
        result.success = result.errors.is_empty();
        result.statistics.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Clean finished: {} item(s), ~{} bytes, {} warning(s)",
            result.statistics.total_removed(),
            result.statistics.bytes_saved,
            result.warnings.len()
        );
        result
    }

    fn remove_media(&self, store: &mut PartStore, report: &OrphanReport) -> (usize, u64) {
        let mut removed = 0;
        let mut bytes = 0;
        for orphan in &report.orphans.media {
            if let Some(part) = store.remove(&orphan.record.path) {
                removed += 1;
                bytes += part.byte_len() as u64;
            }
        }
        (removed, bytes)
    }

    fn remove_relationships(
        &self,
        store: &mut PartStore,
        report: &OrphanReport,
        warnings: &mut Vec<String>,
    ) -> usize {
        let mut by_part: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for orphan in &report.orphans.relationships {
            by_part
                .entry(orphan.record.rels_part.as_str())
                .or_default()
                .insert(orphan.record.id.as_str());
        }

        let mut removed = 0;
        for (rels, ids) in by_part {
            let outcome = edit_part(store, rels, |tree| {
                let nodes: Vec<NodeId> = tree
                    .elements_named(PKG_REL_NS, "Relationship")
                    .filter(|node| tree.attr_plain(*node, "Id").map_or(false, |id| ids.contains(id)))
                    .collect();
                remove_nodes(tree, nodes)
            });
            removed += settle(outcome, warnings);
        }
        removed
    }

    /// Strictly the styles the report found orphaned
    fn remove_styles(&self, store: &mut PartStore, report: &OrphanReport, warnings: &mut Vec<String>) -> usize {
        if report.orphans.styles.is_empty() {
            return 0;
        }
        let orphaned: BTreeSet<&str> = report
            .orphans
            .styles
            .iter()
            .map(|orphan| orphan.record.style_id.as_str())
            .collect();
        let outcome = edit_part(store, STYLES_PATH, |tree| {
            let nodes: Vec<NodeId> = tree
                .elements_named(W_NS, "style")
                .filter(|node| {
                    tree.attr(*node, W_NS, "styleId")
                        .map_or(false, |id| orphaned.contains(id))
                })
                .collect();
            remove_nodes(tree, nodes)
        });
        settle(outcome, warnings)
    }

    fn remove_revision_markers(&self, store: &mut PartStore, warnings: &mut Vec<String>) -> usize {
        let paths: Vec<String> = store.xml_parts().map(|(path, _)| path.to_string()).collect();
        let mut removed = 0;
        for path in paths {
            let outcome = edit_part(store, &path, |tree| {
                let nodes: Vec<NodeId> = tree.descendants(tree.root()).collect();
                nodes
                    .into_iter()
                    .map(|node| tree.remove_attributes(node, RevisionScanner::is_revision_attribute))
                    .sum()
            });
            removed += settle(outcome, warnings);
        }
        removed
    }

    fn remove_empty_elements(&self, store: &mut PartStore, warnings: &mut Vec<String>) -> usize {
        let mut removed = 0;
        for path in EmptyElementScanner::target_parts(store) {
            let outcome = edit_part(store, &path, |tree| {
                let (runs, rprs) = EmptyElementScanner::empty_elements(tree);
                remove_nodes(tree, runs.into_iter().chain(rprs).collect())
            });
            removed += settle(outcome, warnings);
        }
        removed
    }

    fn remove_font_scripts(&self, store: &mut PartStore, warnings: &mut Vec<String>) -> usize {
        let mut removed = 0;
        for path in FontScriptScanner::theme_parts(store) {
            let outcome = edit_part(store, &path, |tree| {
                let nodes: Vec<NodeId> = tree
                    .elements_named(A_NS, "font")
                    .filter(|node| FontScriptScanner::is_removable_font(tree, *node))
                    .collect();
                remove_nodes(tree, nodes)
            });
            removed += settle(outcome, warnings);
        }
        removed
    }

    fn remove_compat_settings(&self, store: &mut PartStore, warnings: &mut Vec<String>) -> usize {
        if !store.contains(SETTINGS_PATH) {
            return 0;
        }
        let outcome = edit_part(store, SETTINGS_PATH, |tree| {
            let nodes = CompatScanner::removable_settings(tree);
            remove_nodes(tree, nodes)
        });
        settle(outcome, warnings)
    }

    /// Counts bookmarks, not elements: a start/end pair is one bookmark
    fn remove_internal_bookmarks(&self, store: &mut PartStore, warnings: &mut Vec<String>) -> usize {
        let mut removed = 0;
        for path in store.content_part_paths() {
            let outcome = edit_part(store, &path, |tree| {
                let ids = BookmarkScanner::internal_bookmarks(tree);
                if ids.is_empty() {
                    return 0;
                }
                let nodes: Vec<NodeId> = tree
                    .descendants(tree.root())
                    .filter(|node| {
                        (tree.is_element(*node, W_NS, "bookmarkStart")
                            || tree.is_element(*node, W_NS, "bookmarkEnd"))
                            && tree
                                .attr(*node, W_NS, "id")
                                .map_or(false, |id| ids.contains_key(id))
                    })
                    .collect();
                remove_nodes(tree, nodes);
                ids.len()
            });
            removed += settle(outcome, warnings);
        }
        removed
    }

    fn remove_proof_state(&self, store: &mut PartStore, warnings: &mut Vec<String>) -> usize {
        let mut removed = 0;
        for (path, local) in PROOF_TARGETS {
            if !store.contains(path) {
                continue;
            }
            let outcome = edit_part(store, path, |tree| {
                let nodes = ProofStateScanner::markers(tree, local);
                remove_nodes(tree, nodes)
            });
            removed += settle(outcome, warnings);
        }
        removed
    }
}

fn edit_part<F>(store: &mut PartStore, path: &str, edit: F) -> Result<usize, CleanerError>
where
    F: FnOnce(&mut XmlTree) -> usize,
{
    let tree = store.xml_mut(path)?;
    Ok(edit(tree))
}

fn remove_nodes(tree: &mut XmlTree, nodes: Vec<NodeId>) -> usize {
    nodes
        .into_iter()
        .filter(|node| tree.is_attached(*node) && tree.remove_merging_text(*node))
        .count()
}

fn settle(outcome: Result<usize, CleanerError>, warnings: &mut Vec<String>) -> usize {
    match outcome {
        Ok(removed) => removed,
        Err(e) => {
            warn!("{}", e);
            warnings.push(e.to_string());
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportBuilder;

    const CONTENT_TYPES: &str = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#;
    const PACKAGE_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;
    const DOCUMENT: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body><w:p w:rsidR="00AA"><w:bookmarkStart w:id="0" w:name="_GoBack"/><w:r><w:t>Body</w:t></w:r><w:bookmarkEnd w:id="0"/><w:r><w:t></w:t></w:r></w:p></w:body></w:document>"#;
    const DOCUMENT_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/></Relationships>"#;
    const STYLES: &str = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Lonely"><w:name w:val="Lonely"/></w:style></w:styles>"#;

    fn store() -> PartStore {
        PartStore::from_parts([
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", PACKAGE_RELS),
            ("word/document.xml", DOCUMENT),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS),
            ("word/styles.xml", STYLES),
        ])
    }

    #[test]
    fn test_clean_removes_every_category_and_validates() {
        let mut store = store();
        let report = ReportBuilder::new().build(&store);
        let result = SafeRemover::new().clean(&mut store, report, CleanOptions::all());

        assert!(result.success, "{:?}", result.errors);
        assert_eq!(result.statistics.relationships, 1);
        assert_eq!(result.statistics.styles, 1);
        assert_eq!(result.statistics.revision_markers, 1);
        assert_eq!(result.statistics.empty_elements, 1);
        assert_eq!(result.statistics.internal_bookmarks, 1);

        let document = String::from_utf8(store.get("word/document.xml").unwrap().to_bytes()).unwrap();
        assert!(!document.contains("_GoBack"));
        assert!(!document.contains("rsidR"));
        assert!(document.contains("Body"));

        let again = ReportBuilder::new().build(&store);
        assert!(again.is_clean(), "{:?}", again);
    }

    #[test]
    fn test_disabled_category_is_untouched() {
        let mut store = store();
        let report = ReportBuilder::new().build(&store);
        let options = CleanOptions::all().without(CleanCategory::Styles);
        let result = SafeRemover::new().clean(&mut store, report, options);
        assert_eq!(result.statistics.styles, 0);
        let styles = String::from_utf8(store.get("word/styles.xml").unwrap().to_bytes()).unwrap();
        assert!(styles.contains("Lonely"));
    }

    #[test]
    fn test_projection_matches_clean_counts() {
        let mut store = store();
        let report = ReportBuilder::new().build(&store);
        let projected = CleanResult::projected(&report, CleanOptions::only(CleanCategory::Relationships));
        assert_eq!(projected.statistics.relationships, 1);
        assert_eq!(projected.statistics.total_removed(), 1);
        assert_eq!(projected.statistics.bytes_saved, RELATIONSHIP_BYTES);

        let result = SafeRemover::new().clean(&mut store, report, CleanOptions::only(CleanCategory::Relationships));
        assert_eq!(result.statistics.relationships, projected.statistics.relationships);
    }

    #[test]
    fn test_malformed_part_becomes_warning() {
        let mut store = store();
        store.insert_bytes("word/settings.xml", b"<w:settings>".to_vec());
        let report = ReportBuilder::new().build(&store);
        let result = SafeRemover::new().clean(&mut store, report, CleanOptions::only(CleanCategory::CompatSettings));
        assert_eq!(result.warnings.len(), 1);
        assert!(result.success);
    }

    #[test]
    fn test_validation_failure_marks_unsuccessful() {
        let mut store = store();
        store.remove("_rels/.rels");
        let report = ReportBuilder::new().build(&store);
        let result = SafeRemover::new().clean(&mut store, report, CleanOptions::empty());
        assert!(!result.success);
        assert_eq!(result.errors, vec!["Missing _rels/.rels".to_string()]);
    }
}
