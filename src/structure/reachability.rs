//! Reachability analysis: which declared resources the content actually uses

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, instrument, warn};

use crate::structure::reference_graph::ReferenceGraph;
use crate::tables::BUILTIN_STYLES;
use crate::types::{relationship_key, PartStore, StyleRecord, XmlTree, R_NS, W_NS};

/// Upper bound on style closure rounds
pub const MAX_CLOSURE_ROUNDS: usize = 100;

/// Used-set per category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedResources {
    /// Relationship keys (`"<rels path>:<id>"`)
    pub relationships: BTreeSet<String>,
    pub styles: BTreeSet<String>,
    pub fonts: BTreeSet<String>,
    pub numbering: BTreeSet<String>,
    pub web_divs: BTreeSet<String>,
}

#[derive(Debug, Default)]
pub struct ReachabilityAnalyzer;

impl ReachabilityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, store, graph))]
    pub fn analyze(&self, store: &PartStore, graph: &ReferenceGraph) -> UsedResources {
        let mut used = UsedResources::default();

        // Phase 1: direct references from content parts
        for path in store.content_part_paths() {
            match store.xml(&path) {
                Some(tree) => collect_content_references(tree, &mut used),
                None => debug!("Skipping unparsable content part {}", path),
            }
        }

        // Phase 2: relationship references, each owner into its own rels part
        for (owner, rels_part) in graph.owned_rels_parts() {
            let Some(tree) = store.xml(&owner) else {
                continue;
            };
            for id in relationship_references(tree) {
                let key = relationship_key(&rels_part, &id);
                if graph.relationships.contains_key(&key) {
                    used.relationships.insert(key);
                }
            }
        }

        // Phase 3: style closure
        used.styles
            .extend(BUILTIN_STYLES.iter().map(|s| s.to_string()));
        close_styles(&mut used.styles, &graph.styles);

        debug!(
            "Used: {} relationships, {} styles, {} fonts, {} numbering, {} web divs",
            used.relationships.len(),
            used.styles.len(),
            used.fonts.len(),
            used.numbering.len(),
            used.web_divs.len()
        );
        used
    }
}

fn collect_content_references(tree: &XmlTree, used: &mut UsedResources) {
    for node in tree.descendants(tree.root()) {
        let Some(element) = tree.element(node) else {
            continue;
        };
        if element.name.namespace.as_deref() != Some(W_NS) {
            continue;
        }
        match element.name.local.as_str() {
            "pStyle" | "rStyle" | "tblStyle" => {
                if let Some(val) = tree.attr(node, W_NS, "val") {
                    used.styles.insert(val.to_string());
                }
            }
            "rFonts" => {
                for attribute in ["ascii", "hAnsi", "cs", "eastAsia"] {
                    if let Some(font) = tree.attr(node, W_NS, attribute) {
                        used.fonts.insert(font.to_string());
                    }
                }
            }
            "numId" => {
                if let Some(val) = tree.attr(node, W_NS, "val").filter(|v| *v != "0") {
                    used.numbering.insert(val.to_string());
                }
            }
            "divId" => {
                if let Some(val) = tree.attr(node, W_NS, "val") {
                    used.web_divs.insert(val.to_string());
                }
            }
            _ => {}
        }
    }
}

/// Relationship ids referenced anywhere in a part
pub fn relationship_references(tree: &XmlTree) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    for node in tree.descendants(tree.root()) {
        let Some(element) = tree.element(node) else {
            continue;
        };
        for attr in &element.attributes {
            let in_rel_namespace = attr.name.namespace.as_deref() == Some(R_NS);
            if in_rel_namespace || looks_like_rid_attribute(&attr.name.local, &attr.value) {
                ids.insert(attr.value.clone());
            }
        }
    }
    ids
}

fn looks_like_rid_attribute(name: &str, value: &str) -> bool {
    if !value.starts_with("rId") {
        return false;
    }
    let name = name.to_ascii_lowercase();
    name.contains("id") || name.contains("embed") || name.contains("link")
}

/// Extends `used` with every style reachable through based-on, link and next
pub fn close_styles(used: &mut BTreeSet<String>, styles: &BTreeMap<String, StyleRecord>) {
    let mut frontier: Vec<String> = used.iter().cloned().collect();
    let mut rounds = 0;

    while !frontier.is_empty() {
        if rounds == MAX_CLOSURE_ROUNDS {
            warn!("Style closure stopped after {} rounds", MAX_CLOSURE_ROUNDS);
            break;
        }
        rounds += 1;

        let mut next_frontier = Vec::new();
        for style_id in frontier {
            let Some(style) = styles.get(&style_id) else {
                continue;
            };
            for dependency in style.dependencies() {
                if used.insert(dependency.to_string()) {
                    next_frontier.push(dependency.to_string());
                }
            }
        }
        frontier = next_frontier;
    }
}
