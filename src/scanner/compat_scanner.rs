//! Legacy compatibility flags in the settings part

use crate::tables::{compat_reason, is_removable_compat_flag, KEPT_COMPAT_SETTING};
use crate::types::{NodeId, PartStore, XmlTree, SETTINGS_PATH, W_NS};

use super::{CruftFinding, CruftKind, CruftScanner};

#[derive(Debug, Default)]
pub struct CompatScanner;

impl CompatScanner {
    pub fn new() -> Self {
        Self
    }

    /// Removable children of `w:compat`, in document order
    pub fn removable_settings(tree: &XmlTree) -> Vec<NodeId> {
        tree.elements_named(W_NS, "compat")
            .flat_map(|compat| tree.child_elements(compat).collect::<Vec<_>>())
            .filter(|node| Self::is_removable(tree, *node))
            .collect()
    }

    pub fn is_removable(tree: &XmlTree, node: NodeId) -> bool {
        let Some(element) = tree.element(node) else {
            return false;
        };
        if element.name.namespace.as_deref() != Some(W_NS)
            || !is_removable_compat_flag(&element.name.local)
        {
            return false;
        }
        if element.name.local == "compatSetting" {
            let name = tree.attr(node, W_NS, "name").unwrap_or_default();
            return !name.contains(KEPT_COMPAT_SETTING);
        }
        true
    }
}

impl CruftScanner for CompatScanner {
    fn kind(&self) -> CruftKind {
        CruftKind::CompatSettings
    }

    fn scan(&self, store: &PartStore) -> Vec<CruftFinding> {
        let Some(tree) = store.xml(SETTINGS_PATH) else {
            return Vec::new();
        };
        Self::removable_settings(tree)
            .into_iter()
            .filter_map(|node| {
                let local = tree.local_name(node)?;
                let finding =
                    CruftFinding::new(CruftKind::CompatSettings, SETTINGS_PATH, local, 1, compat_reason(local));
                Some(match tree.attr(node, W_NS, "name") {
                    Some(name) => finding.with_detail(name),
                    None => finding,
                })
            })
            .collect()
    }
}
