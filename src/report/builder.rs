//! Report builder: runs every analysis over a part store

use tracing::{info, instrument};

use crate::scanner::{self, CruftKind};
use crate::structure::{OrphanCalculator, ReachabilityAnalyzer, ReferenceGraph};
use crate::types::PartStore;

use super::{CategoryStats, OrphanReport, ReportStatistics, SavingsEstimate};

#[derive(Debug, Default)]
pub struct ReportBuilder {
    reachability: ReachabilityAnalyzer,
    orphans: OrphanCalculator,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self, store))]
    pub fn build(&self, store: &PartStore) -> OrphanReport {
        // Phase 1: definitions and reachability
        let graph = ReferenceGraph::build(store);
        let used = self.reachability.analyze(store, &graph);
        let orphans = self.orphans.calculate(store, &graph, &used);

        // Phase 2: cruft scans
        let cruft = scanner::scan_all(store);

        // Phase 3: savings and statistics
        let savings = SavingsEstimate::estimate(&orphans, &cruft);
        let stats = |defined: usize, used: usize, orphaned: usize| CategoryStats {
            defined,
            used,
            orphaned,
        };
        let statistics = ReportStatistics {
            relationships: stats(
                graph.relationships.len(),
                used.relationships.len(),
                orphans.relationships.len(),
            ),
            styles: stats(
                graph.styles.len(),
                graph
                    .styles
                    .keys()
                    .filter(|id| used.styles.contains(*id))
                    .count(),
                orphans.styles.len(),
            ),
            media: stats(
                graph.media.len(),
                graph.media.len() - orphans.media.len(),
                orphans.media.len(),
            ),
            fonts: stats(
                graph.fonts.len(),
                graph.fonts.keys().filter(|f| used.fonts.contains(*f)).count(),
                orphans.fonts.len(),
            ),
            numbering: stats(
                graph.numbering.len(),
                graph
                    .numbering
                    .keys()
                    .filter(|n| used.numbering.contains(*n))
                    .count(),
                orphans.numbering.len(),
            ),
            web_divs: stats(
                graph.web_divs.len(),
                graph
                    .web_divs
                    .keys()
                    .filter(|d| used.web_divs.contains(*d))
                    .count(),
                orphans.web_divs.len(),
            ),
            revision_attributes: cruft.occurrences(CruftKind::RevisionMarkers),
            empty_elements: cruft.occurrences(CruftKind::EmptyElements),
            estimated_savings: savings.total(),
        };

        info!(
            "Analysis found {} orphans, estimated savings {} bytes",
            orphans.total(),
            savings.total()
        );

        OrphanReport {
            orphans,
            cruft,
            savings,
            statistics,
        }
    }
}
