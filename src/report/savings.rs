//! Byte-savings estimate
//!
//! Fixed per-item sizes approximate the markup each finding accounts for;
//! orphaned media contributes its exact size.

use serde::{Deserialize, Serialize};

use crate::scanner::{CruftFindings, CruftKind};
use crate::structure::OrphanSets;

pub const RELATIONSHIP_BYTES: u64 = 200;
pub const STYLE_BYTES: u64 = 500;
pub const WEB_DIV_BYTES: u64 = 200;
pub const REVISION_ATTRIBUTE_BYTES: u64 = 25;
pub const EMPTY_ELEMENT_BYTES: u64 = 20;
pub const FONT_MAPPING_BYTES: u64 = 60;
pub const COMPAT_SETTING_BYTES: u64 = 50;
pub const BOOKMARK_BYTES: u64 = 80;
pub const PROOF_MARKER_BYTES: u64 = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsEstimate {
    pub media: u64,
    pub relationships: u64,
    pub styles: u64,
    pub web_divs: u64,
    pub revision_markers: u64,
    pub empty_elements: u64,
    pub font_scripts: u64,
    pub compat_settings: u64,
    pub internal_bookmarks: u64,
    pub proof_state: u64,
}

impl SavingsEstimate {
    pub fn estimate(orphans: &OrphanSets, cruft: &CruftFindings) -> Self {
        let per = |count: usize, bytes: u64| count as u64 * bytes;
        Self {
            media: orphans.media.iter().map(|m| m.record.size).sum(),
            relationships: per(orphans.relationships.len(), RELATIONSHIP_BYTES),
            styles: per(orphans.styles.len(), STYLE_BYTES),
            web_divs: per(orphans.web_divs.len(), WEB_DIV_BYTES),
            revision_markers: per(
                cruft.occurrences(CruftKind::RevisionMarkers),
                REVISION_ATTRIBUTE_BYTES,
            ),
            empty_elements: per(cruft.occurrences(CruftKind::EmptyElements), EMPTY_ELEMENT_BYTES),
            font_scripts: per(cruft.occurrences(CruftKind::FontScripts), FONT_MAPPING_BYTES),
            compat_settings: per(
                cruft.occurrences(CruftKind::CompatSettings),
                COMPAT_SETTING_BYTES,
            ),
            internal_bookmarks: per(
                cruft.occurrences(CruftKind::InternalBookmarks),
                BOOKMARK_BYTES,
            ),
            proof_state: per(cruft.occurrences(CruftKind::ProofState), PROOF_MARKER_BYTES),
        }
    }

    pub fn total(&self) -> u64 {
        self.media
            + self.relationships
            + self.styles
            + self.web_divs
            + self.revision_markers
            + self.empty_elements
            + self.font_scripts
            + self.compat_settings
            + self.internal_bookmarks
            + self.proof_state
    }
}
