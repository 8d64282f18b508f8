//! Detection engine: runs the configured classifiers over content nodes

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::config::DetectionConfig;
use crate::error::ConfigError;
use crate::types::{NodeId, XmlTree, W_NS};

use super::classifiers::{
    Classifier, CopyrightClassifier, HiddenTextClassifier, PatternClassifier,
    SpecifierNoteClassifier, REMOVAL_THRESHOLD,
};

/// Kinds of content the engine recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    SpecifierNote,
    Copyright,
    HiddenText,
    Attribution,
    EditorialArtifact,
    /// Content that must stay, overriding every other kind
    Preserve,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::SpecifierNote => "specifier_note",
            ContentKind::Copyright => "copyright",
            ContentKind::HiddenText => "hidden_text",
            ContentKind::Attribution => "attribution",
            ContentKind::EditorialArtifact => "editorial_artifact",
            ContentKind::Preserve => "preserve",
        }
    }
}

/// Part path plus node id; detections never hold references into a tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub part: String,
    pub node: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub kind: ContentKind,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub origin: NodeRef,
    pub text: String,
    pub reason: String,
    /// Paragraph the node was classified within
    pub paragraph: Option<NodeId>,
}

impl Detection {
    pub fn new(
        kind: ContentKind,
        node: &ContentNode<'_>,
        text: &str,
        confidence: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            confidence,
            origin: NodeRef {
                part: node.part.to_string(),
                node: node.id,
            },
            text: text.to_string(),
            reason: reason.into(),
            paragraph: None,
        }
    }

    pub fn is_preserve(&self) -> bool {
        self.kind == ContentKind::Preserve
    }
}

/// Whether a node is a run, a paragraph or something else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Run,
    Paragraph,
    Other,
}

/// A run or paragraph handed to the classifiers
#[derive(Debug, Clone, Copy)]
pub struct ContentNode<'a> {
    pub part: &'a str,
    pub tree: &'a XmlTree,
    pub id: NodeId,
}

impl<'a> ContentNode<'a> {
    pub fn new(part: &'a str, tree: &'a XmlTree, id: NodeId) -> Self {
        Self { part, tree, id }
    }

    pub fn role(&self) -> NodeRole {
        if self.tree.is_element(self.id, W_NS, "r") {
            NodeRole::Run
        } else if self.tree.is_element(self.id, W_NS, "p") {
            NodeRole::Paragraph
        } else {
            NodeRole::Other
        }
    }
}

/// Configured classifier set with the preserve classifier in front
pub struct DetectionEngine {
    preserve: PatternClassifier,
    classifiers: Vec<Box<dyn Classifier>>,
}

impl DetectionEngine {
    /// Builds every classifier, compiling their patterns up front
    #[instrument(skip(config))]
    pub fn from_config(config: &DetectionConfig) -> Result<Self, ConfigError> {
        let section = |name: &str| config.pattern_config(name).unwrap_or_default();

        let preserve = PatternClassifier::preserve(section("preserve_patterns"))?;
        let classifiers: Vec<Box<dyn Classifier>> = vec![
            Box::new(SpecifierNoteClassifier::new(section("specifier_notes"))?),
            Box::new(CopyrightClassifier::new(section("copyright_notices"))?),
            Box::new(HiddenTextClassifier::new(section("hidden_text"))),
            Box::new(PatternClassifier::attribution(section("attribution_references"))?),
            Box::new(PatternClassifier::editorial(section("editorial_artifacts"))?),
        ];
        debug!("Detection engine ready with {} classifiers", classifiers.len() + 1);
        Ok(Self {
            preserve,
            classifiers,
        })
    }

    /// Classifies one node. A preserve match is returned alone.
    pub fn detect(&self, node: ContentNode<'_>, text: &str) -> Vec<Detection> {
        if let Some(preserved) = self.preserve.classify(&node, text) {
            trace!("Preserved node {:?} in {}", node.id, node.part);
            return vec![preserved];
        }
        self.classifiers
            .iter()
            .filter_map(|classifier| classifier.classify(&node, text))
            .collect()
    }

    /// False when anything is preserved, else true if any detection clears
    /// the removal threshold
    pub fn should_remove(detections: &[Detection]) -> bool {
        if detections.iter().any(Detection::is_preserve) {
            return false;
        }
        detections
            .iter()
            .any(|detection| detection.confidence >= REMOVAL_THRESHOLD)
    }
}
