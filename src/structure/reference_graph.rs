//! Definition tables for every resource category in the container

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::types::{
    owner_of_rels, FontDeclaration, MediaAsset, NumberingDefinition, PartStore,
    RelationshipRecord, StyleRecord, StyleType, TargetMode, WebDiv, XmlTree, FONT_TABLE_PATH,
    MEDIA_DIR, NUMBERING_PATH, PKG_REL_NS, STYLES_PATH, WEB_SETTINGS_PATH, W_NS,
};

/// Everything the container declares, keyed by stable identifier
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph {
    /// Keyed by `"<rels path>:<id>"`
    pub relationships: BTreeMap<String, RelationshipRecord>,
    /// Keyed by style id
    pub styles: BTreeMap<String, StyleRecord>,
    /// Keyed by part path
    pub media: BTreeMap<String, MediaAsset>,
    pub fonts: BTreeMap<String, FontDeclaration>,
    pub numbering: BTreeMap<String, NumberingDefinition>,
    pub web_divs: BTreeMap<String, WebDiv>,
}

impl ReferenceGraph {
    #[instrument(skip(store))]
    pub fn build(store: &PartStore) -> Self {
        let mut graph = Self::default();
        graph.collect_relationships(store);
        graph.collect_styles(store);
        graph.collect_media(store);
        graph.collect_fonts(store);
        graph.collect_numbering(store);
        graph.collect_web_divs(store);
        debug!(
            "Reference graph: {} relationships, {} styles, {} media, {} fonts, {} numbering, {} web divs",
            graph.relationships.len(),
            graph.styles.len(),
            graph.media.len(),
            graph.fonts.len(),
            graph.numbering.len(),
            graph.web_divs.len()
        );
        graph
    }

    fn collect_relationships(&mut self, store: &PartStore) {
        for (path, tree) in store.xml_parts() {
            if !path.ends_with(".rels") {
                continue;
            }
            for rel in tree.elements_named(PKG_REL_NS, "Relationship") {
                let Some(id) = tree.attr_plain(rel, "Id") else {
                    continue;
                };
                let record = RelationshipRecord {
                    id: id.to_string(),
                    target: tree.attr_plain(rel, "Target").unwrap_or_default().to_string(),
                    rel_type: tree.attr_plain(rel, "Type").unwrap_or_default().to_string(),
                    target_mode: TargetMode::parse(tree.attr_plain(rel, "TargetMode")),
                    rels_part: path.to_string(),
                };
                self.relationships.insert(record.key(), record);
            }
        }
    }

    fn collect_styles(&mut self, store: &PartStore) {
        let Some(tree) = store.xml(STYLES_PATH) else {
            debug!("No parsable styles part");
            return;
        };
        for style in tree.child_elements(tree.root()) {
            if !tree.is_element(style, W_NS, "style") {
                continue;
            }
            let Some(style_id) = tree.attr(style, W_NS, "styleId") else {
                continue;
            };
            let child_val = |local: &str| {
                tree.find_child(style, W_NS, local)
                    .and_then(|child| tree.attr(child, W_NS, "val"))
                    .map(str::to_string)
            };
            let record = StyleRecord {
                style_id: style_id.to_string(),
                name: child_val("name"),
                style_type: StyleType::parse(tree.attr(style, W_NS, "type")),
                based_on: child_val("basedOn"),
                next: child_val("next"),
                linked: child_val("link"),
                is_default: is_on(tree.attr(style, W_NS, "default")),
            };
            self.styles.insert(record.style_id.clone(), record);
        }
    }

    fn collect_media(&mut self, store: &PartStore) {
        for (path, size) in store.binaries_under(MEDIA_DIR) {
            self.media.insert(
                path.to_string(),
                MediaAsset {
                    path: path.to_string(),
                    size: size as u64,
                },
            );
        }
    }

    fn collect_fonts(&mut self, store: &PartStore) {
        for name in declared_values(store.xml(FONT_TABLE_PATH), "font", "name") {
            self.fonts
                .insert(name.clone(), FontDeclaration { name });
        }
    }

    fn collect_numbering(&mut self, store: &PartStore) {
        for num_id in declared_values(store.xml(NUMBERING_PATH), "num", "numId") {
            self.numbering
                .insert(num_id.clone(), NumberingDefinition { num_id });
        }
    }

    fn collect_web_divs(&mut self, store: &PartStore) {
        for div_id in declared_values(store.xml(WEB_SETTINGS_PATH), "div", "id") {
            self.web_divs.insert(div_id.clone(), WebDiv { div_id });
        }
    }

    /// Relationships declared by one relationships part
    pub fn relationships_in<'a>(
        &'a self,
        rels_part: &'a str,
    ) -> impl Iterator<Item = &'a RelationshipRecord> + 'a {
        self.relationships
            .values()
            .filter(move |rel| rel.rels_part == rels_part)
    }

    /// Relationships parts whose owner is an XML part in the store
    pub fn owned_rels_parts(&self) -> Vec<(String, String)> {
        let mut parts: Vec<(String, String)> = self
            .relationships
            .values()
            .filter_map(|rel| owner_of_rels(&rel.rels_part).map(|owner| (owner, rel.rels_part.clone())))
            .collect();
        parts.dedup();
        parts
    }
}

/// `w:val`-style on/off flag
pub(crate) fn is_on(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true") | Some("on"))
}

fn declared_values(tree: Option<&XmlTree>, element: &str, attribute: &str) -> Vec<String> {
    let Some(tree) = tree else {
        return Vec::new();
    };
    tree.elements_named(W_NS, element)
        .filter_map(|node| tree.attr(node, W_NS, attribute))
        .map(str::to_string)
        .collect()
}
