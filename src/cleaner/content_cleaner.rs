//! Content tree surgery: removes paragraphs and runs the detection engine flags

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::analyzer::{ContentNode, Detection, DetectionEngine};
use crate::types::{NodeId, PartStore, XmlTree, W_NS};

/// Outcome of a surgery pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub detections: Vec<Detection>,
    /// Detections of removable kinds
    pub removed_count: usize,
    pub preserved_count: usize,
    /// Elements actually detached; zero on a dry run
    pub nodes_removed: usize,
    pub errors: Vec<String>,
}

impl ProcessingResult {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Detections and removal targets for one part, planned before any mutation
#[derive(Debug, Default)]
struct SurgeryPlan {
    detections: Vec<Detection>,
    removals: Vec<NodeId>,
}

/// Elements that must keep a final `w:p` child
const PARAGRAPH_CONTAINERS: [&str; 6] = ["tc", "hdr", "ftr", "footnote", "endnote", "txbxContent"];

#[derive(Debug, Default)]
pub struct ContentSurgeon;

impl ContentSurgeon {
    pub fn new() -> Self {
        Self
    }

    /// Classifies the body, headers and footers, removing what the engine
    /// flags unless `dry_run` is set
    #[instrument(skip(self, store, engine))]
    pub fn process(&self, store: &mut PartStore, engine: &DetectionEngine, dry_run: bool) -> ProcessingResult {
        let mut result = ProcessingResult::default();

        for path in store.surgery_part_paths() {
            let plan = match store.try_xml(&path) {
                Ok(tree) => Self::plan(&path, tree, engine),
                Err(e) => {
                    warn!("Skipping {}: {}", path, e);
                    result.errors.push(e.to_string());
                    continue;
                }
            };
            debug!(
                "{}: {} detection(s), {} removal(s)",
                path,
                plan.detections.len(),
                plan.removals.len()
            );

            if !dry_run && !plan.removals.is_empty() {
                match store.xml_mut(&path) {
                    Ok(tree) => {
                        for node in plan.removals {
                            if tree.is_attached(node) && tree.remove_merging_text(node) {
                                result.nodes_removed += 1;
                            }
                        }
                    }
                    Err(e) => result.errors.push(e.to_string()),
                }
            }
            result.detections.extend(plan.detections);
        }

        result.preserved_count = result.detections.iter().filter(|d| d.is_preserve()).count();
        result.removed_count = result.detections.len() - result.preserved_count;
        info!(
            "Content surgery: {} detection(s), {} preserved, {} node(s) removed{}",
            result.detections.len(),
            result.preserved_count,
            result.nodes_removed,
            if dry_run { " (dry run)" } else { "" }
        );
        result
    }

    fn plan(path: &str, tree: &XmlTree, engine: &DetectionEngine) -> SurgeryPlan {
        let mut plan = SurgeryPlan::default();
        let mut paragraphs = Vec::new();

        for paragraph in tree.elements_named(W_NS, "p") {
            let text = tree.text_of(paragraph);
            let mut found = engine.detect(ContentNode::new(path, tree, paragraph), &text);
            let removable = DetectionEngine::should_remove(&found);
            let preserved = found.iter().any(Detection::is_preserve);
            Self::tag(&mut found, paragraph);
            plan.detections.extend(found);

            if removable {
                paragraphs.push(paragraph);
                continue;
            }
            if preserved {
                continue;
            }

            // Runs of nested paragraphs (text boxes) belong to those paragraphs
            let runs: Vec<(NodeId, String)> = tree
                .descendants(paragraph)
                .filter(|node| {
                    tree.is_element(*node, W_NS, "r")
                        && tree.ancestor_named(*node, W_NS, "p") == Some(paragraph)
                })
                .map(|run| (run, tree.text_of(run)))
                .filter(|(_, text)| !text.trim().is_empty())
                .collect();
            if runs.is_empty() {
                continue;
            }

            let mut flagged = 0;
            for (run, text) in &runs {
                let mut found = engine.detect(ContentNode::new(path, tree, *run), text);
                if DetectionEngine::should_remove(&found) {
                    flagged += 1;
                }
                Self::tag(&mut found, paragraph);
                plan.detections.extend(found);
            }
            if flagged == runs.len() {
                paragraphs.push(paragraph);
            }
        }

        for paragraph in paragraphs {
            if Self::is_load_bearing(tree, paragraph) {
                plan.removals.extend(Self::owned_runs(tree, paragraph));
            } else {
                plan.removals.push(paragraph);
            }
        }

        for run in tree.elements_named(W_NS, "r") {
            if tree.ancestor_named(run, W_NS, "p").is_some() {
                continue;
            }
            let text = tree.text_of(run);
            if text.trim().is_empty() {
                continue;
            }
            let found = engine.detect(ContentNode::new(path, tree, run), &text);
            if DetectionEngine::should_remove(&found) {
                plan.removals.push(run);
            }
            plan.detections.extend(found);
        }
        plan
    }

    /// A paragraph that carries section properties, or closes a container
    /// that must end with a paragraph. Such paragraphs lose their runs but stay.
    fn is_load_bearing(tree: &XmlTree, paragraph: NodeId) -> bool {
        let carries_section = tree
            .find_child(paragraph, W_NS, "pPr")
            .map_or(false, |ppr| tree.find_child(ppr, W_NS, "sectPr").is_some());
        if carries_section {
            return true;
        }
        let Some(parent) = tree.parent(paragraph) else {
            return false;
        };
        let is_container = tree.element(parent).map_or(false, |e| {
            e.name.namespace.as_deref() == Some(W_NS)
                && PARAGRAPH_CONTAINERS.contains(&e.name.local.as_str())
        });
        is_container
            && tree
                .child_elements(parent)
                .filter(|child| tree.is_element(*child, W_NS, "p"))
                .last()
                == Some(paragraph)
    }

    /// Runs whose nearest paragraph is `paragraph`
    fn owned_runs(tree: &XmlTree, paragraph: NodeId) -> Vec<NodeId> {
        tree.descendants(paragraph)
            .filter(|node| {
                tree.is_element(*node, W_NS, "r")
                    && tree.ancestor_named(*node, W_NS, "p") == Some(paragraph)
            })
            .collect()
    }

    fn tag(detections: &mut [Detection], paragraph: NodeId) {
        for detection in detections {
            detection.paragraph = Some(paragraph);
        }
    }
}
