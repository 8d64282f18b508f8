//! Orphan report: everything one analysis pass found
//!
//! The report is immutable once built and is moved into the remover, so a
//! given analysis can drive at most one clean.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scanner::{CruftFindings, CruftKind};
use crate::structure::OrphanSets;

pub mod builder;
pub mod formatter;
pub mod savings;

pub use builder::ReportBuilder;
pub use formatter::ReportFormatter;
pub use savings::SavingsEstimate;

/// Defined / used / orphaned counts for one resource category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub defined: usize,
    pub used: usize,
    pub orphaned: usize,
}

/// Report summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStatistics {
    pub relationships: CategoryStats,
    pub styles: CategoryStats,
    pub media: CategoryStats,
    pub fonts: CategoryStats,
    pub numbering: CategoryStats,
    pub web_divs: CategoryStats,
    pub revision_attributes: usize,
    pub empty_elements: usize,
    pub estimated_savings: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanReport {
    pub orphans: OrphanSets,
    pub cruft: CruftFindings,
    pub savings: SavingsEstimate,
    pub statistics: ReportStatistics,
}

impl OrphanReport {
    /// True when there is nothing to remove or report
    pub fn is_clean(&self) -> bool {
        self.orphans.total() == 0
            && [
                CruftKind::RevisionMarkers,
                CruftKind::EmptyElements,
                CruftKind::FontScripts,
                CruftKind::CompatSettings,
                CruftKind::InternalBookmarks,
                CruftKind::ProofState,
            ]
            .iter()
            .all(|kind| self.cruft.get(*kind).is_empty())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
