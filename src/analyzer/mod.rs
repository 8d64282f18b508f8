//! Heuristic content classification
//!
//! The detection engine is built once from configuration and then asked,
//! node by node, what kind of content a run or paragraph holds.

pub mod classifiers;
pub mod detection_engine;
pub mod diagnose;
pub mod formatting;

pub use classifiers::{Classifier, REMOVAL_THRESHOLD};
pub use detection_engine::{ContentKind, ContentNode, Detection, DetectionEngine, NodeRef, NodeRole};
pub use diagnose::{diagnose, FormattingSummary, ParagraphProfile, RunProfile};
pub use formatting::RunFormatting;
