//! Cruft scanners
//!
//! Six independent, stateless scanners over the part store. None of them
//! depends on reachability. Each exposes the predicate the remover applies,
//! so a scan and the matching removal always agree on what is cruft.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::types::PartStore;

pub mod bookmark_scanner;
pub mod compat_scanner;
pub mod empty_element_scanner;
pub mod font_script_scanner;
pub mod proof_state_scanner;
pub mod revision_scanner;

pub use self::{
    bookmark_scanner::BookmarkScanner, compat_scanner::CompatScanner,
    empty_element_scanner::EmptyElementScanner, font_script_scanner::FontScriptScanner,
    proof_state_scanner::ProofStateScanner, revision_scanner::RevisionScanner,
};

/// Cruft categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CruftKind {
    RevisionMarkers,
    EmptyElements,
    FontScripts,
    CompatSettings,
    InternalBookmarks,
    ProofState,
}

/// Single scanner finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CruftFinding {
    /// Finding category
    pub kind: CruftKind,
    /// Part the finding was made in
    pub part: String,
    /// Local name of the element involved
    pub element: String,
    /// Identifying value: bookmark name, font script, compat setting name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Bookmark id, when the finding is a bookmark
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Number of occurrences this finding stands for
    pub count: usize,
    /// Human readable explanation
    pub reason: String,
}

impl CruftFinding {
    pub fn new(kind: CruftKind, part: &str, element: &str, count: usize, reason: impl Into<String>) -> Self {
        Self {
            kind,
            part: part.to_string(),
            element: element.to_string(),
            detail: None,
            id: None,
            count,
            reason: reason.into(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Core scanner trait
pub trait CruftScanner: Send + Sync {
    /// Category this scanner reports
    fn kind(&self) -> CruftKind;

    /// Scans the store; malformed or missing parts contribute nothing
    fn scan(&self, store: &PartStore) -> Vec<CruftFinding>;
}

/// Findings of every scanner, one list per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CruftFindings {
    pub revision_markers: Vec<CruftFinding>,
    pub empty_elements: Vec<CruftFinding>,
    pub font_scripts: Vec<CruftFinding>,
    pub compat_settings: Vec<CruftFinding>,
    pub internal_bookmarks: Vec<CruftFinding>,
    pub proof_state: Vec<CruftFinding>,
}

impl CruftFindings {
    pub fn get(&self, kind: CruftKind) -> &[CruftFinding] {
        match kind {
            CruftKind::RevisionMarkers => &self.revision_markers,
            CruftKind::EmptyElements => &self.empty_elements,
            CruftKind::FontScripts => &self.font_scripts,
            CruftKind::CompatSettings => &self.compat_settings,
            CruftKind::InternalBookmarks => &self.internal_bookmarks,
            CruftKind::ProofState => &self.proof_state,
        }
    }

    fn slot(&mut self, kind: CruftKind) -> &mut Vec<CruftFinding> {
        match kind {
            CruftKind::RevisionMarkers => &mut self.revision_markers,
            CruftKind::EmptyElements => &mut self.empty_elements,
            CruftKind::FontScripts => &mut self.font_scripts,
            CruftKind::CompatSettings => &mut self.compat_settings,
            CruftKind::InternalBookmarks => &mut self.internal_bookmarks,
            CruftKind::ProofState => &mut self.proof_state,
        }
    }

    /// Sum of occurrence counts for a category
    pub fn occurrences(&self, kind: CruftKind) -> usize {
        self.get(kind).iter().map(|f| f.count).sum()
    }
}

/// Every scanner in report order
pub fn all_scanners() -> Vec<Box<dyn CruftScanner>> {
    vec![
        Box::new(RevisionScanner::new()),
        Box::new(EmptyElementScanner::new()),
        Box::new(FontScriptScanner::new()),
        Box::new(CompatScanner::new()),
        Box::new(BookmarkScanner::new()),
        Box::new(ProofStateScanner::new()),
    ]
}

/// Runs every scanner in parallel; results land in a fixed order
#[instrument(skip(store))]
pub fn scan_all(store: &PartStore) -> CruftFindings {
    let scanners = all_scanners();
    let results: Vec<(CruftKind, Vec<CruftFinding>)> = scanners
        .par_iter()
        .map(|scanner| (scanner.kind(), scanner.scan(store)))
        .collect();

    let mut findings = CruftFindings::default();
    for (kind, found) in results {
        debug!("{:?}: {} findings", kind, found.len());
        findings.slot(kind).extend(found);
    }
    findings
}
