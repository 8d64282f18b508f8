//! Revision-session (`w:rsid*`) attribute scanner

use crate::tables::is_rsid_attribute;
use crate::types::{xml::Attribute, PartStore, XmlTree, W_NS};

use super::{CruftFinding, CruftKind, CruftScanner};

#[derive(Debug, Default)]
pub struct RevisionScanner;

impl RevisionScanner {
    pub fn new() -> Self {
        Self
    }

    /// Predicate shared with the remover
    pub fn is_revision_attribute(attr: &Attribute) -> bool {
        attr.name.namespace.as_deref() == Some(W_NS) && is_rsid_attribute(&attr.name.local)
    }

    pub fn count_in(tree: &XmlTree) -> usize {
        tree.descendants(tree.root())
            .filter_map(|node| tree.element(node))
            .map(|element| {
                element
                    .attributes
                    .iter()
                    .filter(|attr| Self::is_revision_attribute(attr))
                    .count()
            })
            .sum()
    }
}

impl CruftScanner for RevisionScanner {
    fn kind(&self) -> CruftKind {
        CruftKind::RevisionMarkers
    }

    fn scan(&self, store: &PartStore) -> Vec<CruftFinding> {
        store
            .xml_parts()
            .filter_map(|(path, tree)| {
                let count = Self::count_in(tree);
                (count > 0).then(|| {
                    CruftFinding::new(
                        CruftKind::RevisionMarkers,
                        path,
                        "*",
                        count,
                        "Revision session identifiers",
                    )
                })
            })
            .collect()
    }
}
