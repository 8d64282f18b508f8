//! Word-internal bookmarks (`_GoBack`, `_Toc...`, `_Hlk...`)

use std::collections::BTreeMap;

use crate::tables::{bookmark_reason, internal_bookmark_prefix};
use crate::types::{PartStore, XmlTree, W_NS};

use super::{CruftFinding, CruftKind, CruftScanner};

#[derive(Debug, Default)]
pub struct BookmarkScanner;

impl BookmarkScanner {
    pub fn new() -> Self {
        Self
    }

    /// Internal bookmarks of a part: id to name
    pub fn internal_bookmarks(tree: &XmlTree) -> BTreeMap<String, String> {
        tree.elements_named(W_NS, "bookmarkStart")
            .filter_map(|node| {
                let name = tree.attr(node, W_NS, "name")?;
                let id = tree.attr(node, W_NS, "id")?;
                internal_bookmark_prefix(name).map(|_| (id.to_string(), name.to_string()))
            })
            .collect()
    }
}

impl CruftScanner for BookmarkScanner {
    fn kind(&self) -> CruftKind {
        CruftKind::InternalBookmarks
    }

    fn scan(&self, store: &PartStore) -> Vec<CruftFinding> {
        let mut findings = Vec::new();
        for path in store.content_part_paths() {
            let Some(tree) = store.xml(&path) else {
                continue;
            };
            for (id, name) in Self::internal_bookmarks(tree) {
                findings.push(
                    CruftFinding::new(
                        CruftKind::InternalBookmarks,
                        &path,
                        "bookmarkStart",
                        1,
                        bookmark_reason(&name),
                    )
                    .with_detail(name)
                    .with_id(id),
                );
            }
        }
        findings
    }
}
