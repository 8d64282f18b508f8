//! docsweep: cleanup for extracted WordprocessingML containers
//!
//! Finds resources nothing references (relationships, styles, media and
//! more), authoring cruft left behind by the editor, and content such as
//! specifier notes or copyright boilerplate that should not ship. Removes
//! them and checks the container still opens.

// Configuration and core pipeline
pub mod config;
pub mod error;
pub mod pipeline;
pub mod tables;
pub mod types;

// Analysis
pub mod analyzer;
pub mod report;
pub mod scanner;
pub mod structure;

// Removal and verification
pub mod cleaner;
pub mod verification;

// Shared utilities
pub mod utils;

pub use analyzer::{ContentKind, ContentNode, Detection, DetectionEngine};
pub use cleaner::{CleanResult, ContentSurgeon, ProcessingResult, SafeRemover};
pub use config::{CleanCategory, CleanOptions, DetectionConfig};
pub use error::{Error, Result};
pub use pipeline::{analyze, clean, process, Pipeline, PipelineConfig, PipelineOutcome};
pub use report::{OrphanReport, ReportBuilder, ReportFormatter};
pub use types::{PartStore, XmlTree};
pub use verification::StructuralValidator;
