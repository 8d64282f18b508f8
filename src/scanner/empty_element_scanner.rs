//! Empty run and empty run-property scanner

use std::collections::HashSet;

use crate::tables::is_content_bearing_run_child;
use crate::types::{NodeId, PartStore, XmlTree, STYLES_PATH, W_NS};

use super::{CruftFinding, CruftKind, CruftScanner};

#[derive(Debug, Default)]
pub struct EmptyElementScanner;

impl EmptyElementScanner {
    pub fn new() -> Self {
        Self
    }

    /// Parts scanned for empty elements: content parts and the styles part
    pub fn target_parts(store: &PartStore) -> Vec<String> {
        let mut parts = store.content_part_paths();
        if store.contains(STYLES_PATH) {
            parts.push(STYLES_PATH.to_string());
        }
        parts
    }

    /// A `w:r` whose children carry no content
    pub fn is_empty_run(tree: &XmlTree, node: NodeId) -> bool {
        if !tree.is_element(node, W_NS, "r") {
            return false;
        }
        !tree.child_elements(node).any(|child| {
            let Some(element) = tree.element(child) else {
                return false;
            };
            // Markup-compatibility wrappers and other foreign children may hold drawings
            if element.name.namespace.as_deref() != Some(W_NS) {
                return true;
            }
            match element.name.local.as_str() {
                "t" => !tree.direct_text(child).is_empty(),
                local => is_content_bearing_run_child(local),
            }
        })
    }

    /// A `w:rPr` without child elements. The previous-properties record of
    /// a tracked formatting change must stay even when empty.
    pub fn is_empty_rpr(tree: &XmlTree, node: NodeId) -> bool {
        tree.is_element(node, W_NS, "rPr")
            && tree.child_elements(node).next().is_none()
            && !tree
                .parent(node)
                .map_or(false, |parent| tree.is_element(parent, W_NS, "rPrChange"))
    }

    /// Empty runs and empty run properties, in document order. Properties
    /// inside a run that is itself empty go with the run.
    pub fn empty_elements(tree: &XmlTree) -> (Vec<NodeId>, Vec<NodeId>) {
        let mut runs = Vec::new();
        let mut empty_runs = HashSet::new();
        let mut rprs = Vec::new();
        for node in tree.descendants(tree.root()) {
            if Self::is_empty_run(tree, node) {
                runs.push(node);
                empty_runs.insert(node);
            } else if Self::is_empty_rpr(tree, node) {
                let inside_empty_run = tree
                    .ancestor_named(node, W_NS, "r")
                    .map_or(false, |run| empty_runs.contains(&run));
                if !inside_empty_run {
                    rprs.push(node);
                }
            }
        }
        (runs, rprs)
    }
}

impl CruftScanner for EmptyElementScanner {
    fn kind(&self) -> CruftKind {
        CruftKind::EmptyElements
    }

    fn scan(&self, store: &PartStore) -> Vec<CruftFinding> {
        let mut findings = Vec::new();
        for path in Self::target_parts(store) {
            let Some(tree) = store.xml(&path) else {
                continue;
            };
            let (runs, rprs) = Self::empty_elements(tree);
            if !runs.is_empty() {
                findings.push(CruftFinding::new(
                    CruftKind::EmptyElements,
                    &path,
                    "r",
                    runs.len(),
                    "Runs without content",
                ));
            }
            if !rprs.is_empty() {
                findings.push(CruftFinding::new(
                    CruftKind::EmptyElements,
                    &path,
                    "rPr",
                    rprs.len(),
                    "Run properties without settings",
                ));
            }
        }
        findings
    }
}
