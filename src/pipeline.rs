//! Cleanup pipeline: content surgery, orphan analysis, safe removal
//!
//! Surgery runs first so resources it leaves unreferenced are picked up by
//! the analysis that follows. Each stage can be switched off.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    analyzer::DetectionEngine,
    cleaner::{CleanResult, ContentSurgeon, ProcessingResult, SafeRemover},
    config::{CleanOptions, DetectionConfig},
    error::Result,
    report::{OrphanReport, ReportBuilder},
    types::PartStore,
    utils::Workspace,
    verification::StructuralValidator,
};

/// Builds the orphan report for a store. Never fails and never mutates.
pub fn analyze(store: &PartStore) -> OrphanReport {
    ReportBuilder::new().build(store)
}

/// Applies a report's removals for the enabled categories
pub fn clean(store: &mut PartStore, report: OrphanReport, options: CleanOptions) -> CleanResult {
    SafeRemover::new().clean(store, report, options)
}

/// Classifies content and removes what the engine flags
pub fn process(store: &mut PartStore, engine: &DetectionEngine, dry_run: bool) -> ProcessingResult {
    ContentSurgeon::new().process(store, engine, dry_run)
}

/// Which stages run and how
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub detection: DetectionConfig,
    pub options: CleanOptions,
    pub dry_run: bool,
    /// Run content surgery
    pub content: bool,
    /// Run orphan and cruft removal
    pub deep: bool,
}

/// Results of every stage that ran
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub processing: Option<ProcessingResult>,
    pub report: Option<OrphanReport>,
    pub clean: Option<CleanResult>,
    /// Whether the container on disk was updated
    pub committed: bool,
}

impl PipelineOutcome {
    pub fn success(&self) -> bool {
        self.processing.as_ref().map_or(true, ProcessingResult::success)
            && self.clean.as_ref().map_or(true, |c| c.success)
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    engine: DetectionEngine,
}

impl Pipeline {
    /// Compiles the detection engine; bad patterns fail here, before any stage
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let engine = DetectionEngine::from_config(&config.detection)?;
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the enabled stages over an in-memory store
    #[instrument(skip(self, store))]
    pub fn run(&self, store: &mut PartStore) -> PipelineOutcome {
        let mut outcome = PipelineOutcome::default();

        if self.config.content {
            info!("Stage 1: content surgery");
            outcome.processing = Some(process(store, &self.engine, self.config.dry_run));
        }

        if self.config.deep {
            info!("Stage 2: orphan analysis");
            let report = analyze(store);
            info!("Stage 3: safe removal");
            outcome.clean = Some(if self.config.dry_run {
                CleanResult::projected(&report, self.config.options)
            } else {
                clean(store, report.clone(), self.config.options)
            });
            outcome.report = Some(report);
        }
        outcome
    }

    /// Runs over an extracted container directory through a scoped working
    /// copy. The directory is only rewritten when every stage succeeded and
    /// the written copy still validates.
    #[instrument(skip(self))]
    pub fn run_dir(&self, input: &Path) -> Result<PipelineOutcome> {
        let mut workspace = Workspace::stage(input)?;
        let mut store = PartStore::load_dir(workspace.working_dir())?;
        workspace.snapshot()?;

        let mut outcome = self.run(&mut store);
        if self.config.dry_run {
            return Ok(outcome);
        }
        if !outcome.success() {
            warn!("Pipeline reported failures; leaving {} untouched", input.display());
            workspace.restore()?;
            return Ok(outcome);
        }

        store.write_dir(workspace.working_dir())?;
        let written = PartStore::load_dir(workspace.working_dir())?;
        let validation = StructuralValidator::new().validate(&written);
        if !validation.passed {
            warn!("Written copy failed validation; restoring snapshot");
            workspace.restore()?;
            if let Some(clean) = outcome.clean.as_mut() {
                clean
                    .errors
                    .extend(validation.failures().filter_map(|c| c.details.clone()));
                clean.success = false;
            }
            return Ok(outcome);
        }

        workspace.commit(input)?;
        outcome.committed = true;
        info!("Updated {}", input.display());
        Ok(outcome)
    }
}
