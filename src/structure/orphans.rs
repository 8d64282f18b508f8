//! Orphan set calculation: declared minus used, with exemptions

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::structure::reachability::UsedResources;
use crate::structure::reference_graph::ReferenceGraph;
use crate::tables::{is_builtin_style, is_essential_relationship};
use crate::types::{
    owner_of_rels, FontDeclaration, MediaAsset, NumberingDefinition, PartStore,
    RelationshipRecord, StyleRecord, TargetMode, WebDiv, PACKAGE_RELS_PATH,
};

/// A declared resource nothing reaches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Orphan<T> {
    #[serde(flatten)]
    pub record: T,
    pub reason: String,
}

impl<T> Orphan<T> {
    fn new(record: T, reason: impl Into<String>) -> Self {
        Self {
            record,
            reason: reason.into(),
        }
    }
}

/// Orphans per category. Fonts, numbering and web divs are report-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanSets {
    pub relationships: Vec<Orphan<RelationshipRecord>>,
    pub styles: Vec<Orphan<StyleRecord>>,
    pub media: Vec<Orphan<MediaAsset>>,
    pub fonts: Vec<Orphan<FontDeclaration>>,
    pub numbering: Vec<Orphan<NumberingDefinition>>,
    pub web_divs: Vec<Orphan<WebDiv>>,
}

impl OrphanSets {
    pub fn total(&self) -> usize {
        self.relationships.len()
            + self.styles.len()
            + self.media.len()
            + self.fonts.len()
            + self.numbering.len()
            + self.web_divs.len()
    }
}

#[derive(Debug, Default)]
pub struct OrphanCalculator;

impl OrphanCalculator {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip_all)]
    pub fn calculate(
        &self,
        store: &PartStore,
        graph: &ReferenceGraph,
        used: &UsedResources,
    ) -> OrphanSets {
        let sets = OrphanSets {
            relationships: self.orphan_relationships(store, graph, used),
            styles: self.orphan_styles(graph, used),
            media: self.orphan_media(graph),
            fonts: graph
                .fonts
                .values()
                .filter(|font| !used.fonts.contains(&font.name))
                .map(|font| Orphan::new(font.clone(), "Font declared but never used in content"))
                .collect(),
            numbering: graph
                .numbering
                .values()
                .filter(|num| !used.numbering.contains(&num.num_id))
                .map(|num| Orphan::new(num.clone(), "Numbering definition never applied"))
                .collect(),
            web_divs: graph
                .web_divs
                .values()
                .filter(|div| !used.web_divs.contains(&div.div_id))
                .map(|div| Orphan::new(div.clone(), "Web div left over from pasted HTML"))
                .collect(),
        };
        debug!("Found {} orphans", sets.total());
        sets
    }

    fn orphan_relationships(
        &self,
        store: &PartStore,
        graph: &ReferenceGraph,
        used: &UsedResources,
    ) -> Vec<Orphan<RelationshipRecord>> {
        graph
            .relationships
            .iter()
            .filter(|(key, rel)| {
                if rel.rels_part == PACKAGE_RELS_PATH || is_essential_relationship(&rel.rel_type) {
                    return false;
                }
                // An owner we cannot read might reference anything
                let owner_readable = owner_of_rels(&rel.rels_part)
                    .map_or(false, |owner| store.xml(&owner).is_some());
                owner_readable && !used.relationships.contains(*key)
            })
            .map(|(_, rel)| {
                let reason = format!("Unreferenced {} relationship", rel.type_name());
                Orphan::new(rel.clone(), reason)
            })
            .collect()
    }

    fn orphan_styles(&self, graph: &ReferenceGraph, used: &UsedResources) -> Vec<Orphan<StyleRecord>> {
        graph
            .styles
            .values()
            .filter(|style| {
                !style.is_default
                    && !is_builtin_style(&style.style_id)
                    && !used.styles.contains(&style.style_id)
            })
            .map(|style| {
                let reason = match &style.name {
                    Some(name) => format!("Style '{}' is never applied", name),
                    None => "Style is never applied".to_string(),
                };
                Orphan::new(style.clone(), reason)
            })
            .collect()
    }

    fn orphan_media(&self, graph: &ReferenceGraph) -> Vec<Orphan<MediaAsset>> {
        let target_names: Vec<&str> = graph
            .relationships
            .values()
            .filter(|rel| rel.target_mode == TargetMode::Internal)
            .map(|rel| rel.target.rsplit('/').next().unwrap_or(&rel.target))
            .filter(|name| !name.is_empty())
            .collect();

        graph
            .media
            .values()
            .filter(|asset| !target_names.iter().any(|name| asset.file_name().ends_with(name)))
            .map(|asset| Orphan::new(asset.clone(), "Media file not targeted by any relationship"))
            .collect()
    }
}
