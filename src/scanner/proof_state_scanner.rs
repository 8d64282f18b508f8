//! Spelling and grammar proofing markers

use crate::types::{NodeId, PartStore, XmlTree, DOCUMENT_PATH, SETTINGS_PATH, W_NS};

use super::{CruftFinding, CruftKind, CruftScanner};

/// (part, element local name) pairs holding proofing state
pub const PROOF_TARGETS: [(&str, &str); 3] = [
    (SETTINGS_PATH, "proofState"),
    (SETTINGS_PATH, "proofErr"),
    (DOCUMENT_PATH, "proofErr"),
];

#[derive(Debug, Default)]
pub struct ProofStateScanner;

impl ProofStateScanner {
    pub fn new() -> Self {
        Self
    }

    pub fn markers(tree: &XmlTree, local: &str) -> Vec<NodeId> {
        tree.elements_named(W_NS, local).collect()
    }
}

impl CruftScanner for ProofStateScanner {
    fn kind(&self) -> CruftKind {
        CruftKind::ProofState
    }

    fn scan(&self, store: &PartStore) -> Vec<CruftFinding> {
        PROOF_TARGETS
            .iter()
            .filter_map(|(path, local)| {
                let tree = store.xml(path)?;
                let count = Self::markers(tree, local).len();
                (count > 0).then(|| {
                    CruftFinding::new(
                        CruftKind::ProofState,
                        path,
                        local,
                        count,
                        "Spelling and grammar check state",
                    )
                })
            })
            .collect()
    }
}
