//! Human-readable rendering of an orphan report

use std::fmt::Write as _;

use crate::error::Result;

use super::{CategoryStats, OrphanReport};

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    PlainText,
    Json,
    Markdown,
}

/// Formats an orphan report
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(report: &OrphanReport, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::PlainText => Ok(Self::to_text(report)),
            ReportFormat::Json => report.to_json(),
            ReportFormat::Markdown => Ok(Self::to_markdown(report)),
        }
    }

    fn category_rows(report: &OrphanReport) -> [(&'static str, CategoryStats); 6] {
        let stats = &report.statistics;
        [
            ("Relationships", stats.relationships),
            ("Styles", stats.styles),
            ("Media", stats.media),
            ("Fonts", stats.fonts),
            ("Numbering", stats.numbering),
            ("Web divs", stats.web_divs),
        ]
    }

    fn orphan_lines(report: &OrphanReport) -> Vec<String> {
        let orphans = &report.orphans;
        let mut lines = Vec::new();
        lines.extend(
            orphans
                .relationships
                .iter()
                .map(|o| format!("relationship {} -> {}: {}", o.record.key(), o.record.target, o.reason)),
        );
        lines.extend(
            orphans
                .styles
                .iter()
                .map(|o| format!("style {}: {}", o.record.style_id, o.reason)),
        );
        lines.extend(
            orphans
                .media
                .iter()
                .map(|o| format!("media {} ({} bytes): {}", o.record.path, o.record.size, o.reason)),
        );
        lines.extend(
            orphans
                .fonts
                .iter()
                .map(|o| format!("font {}: {} (report only)", o.record.name, o.reason)),
        );
        lines.extend(
            orphans
                .numbering
                .iter()
                .map(|o| format!("numbering {}: {} (report only)", o.record.num_id, o.reason)),
        );
        lines.extend(
            orphans
                .web_divs
                .iter()
                .map(|o| format!("web div {}: {} (report only)", o.record.div_id, o.reason)),
        );
        lines
    }

    fn to_text(report: &OrphanReport) -> String {
        let mut output = String::new();
        output.push_str("Document Cleanup Report\n");
        output.push_str("=======================\n\n");

        output.push_str("Resources (defined / used / orphaned):\n");
        for (label, stats) in Self::category_rows(report) {
            let _ = writeln!(
                output,
                "- {:<14} {:>5} / {:>5} / {:>5}",
                label, stats.defined, stats.used, stats.orphaned
            );
        }

        output.push_str("\nCruft:\n");
        let cruft = &report.cruft;
        for (label, findings) in [
            ("Revision markers", &cruft.revision_markers),
            ("Empty elements", &cruft.empty_elements),
            ("Font scripts", &cruft.font_scripts),
            ("Compat settings", &cruft.compat_settings),
            ("Internal bookmarks", &cruft.internal_bookmarks),
            ("Proof state", &cruft.proof_state),
        ] {
            let total: usize = findings.iter().map(|f| f.count).sum();
            let _ = writeln!(output, "- {:<18} {:>6}", label, total);
        }

        let orphan_lines = Self::orphan_lines(report);
        if !orphan_lines.is_empty() {
            output.push_str("\nOrphans:\n");
            for line in orphan_lines {
                let _ = writeln!(output, "- {}", line);
            }
        }

        let _ = writeln!(
            output,
            "\nEstimated savings: {} bytes",
            report.savings.total()
        );
        output
    }

    fn to_markdown(report: &OrphanReport) -> String {
        let mut md = String::new();
        md.push_str("# Document Cleanup Report\n\n");
        md.push_str("| Category | Defined | Used | Orphaned |\n|---|---|---|---|\n");
        for (label, stats) in Self::category_rows(report) {
            let _ = writeln!(
                md,
                "| {} | {} | {} | {} |",
                label, stats.defined, stats.used, stats.orphaned
            );
        }
        for line in Self::orphan_lines(report) {
            let _ = writeln!(md, "- {}", line);
        }
        let _ = writeln!(md, "\n**Estimated savings:** {} bytes", report.savings.total());
        md
    }
}
