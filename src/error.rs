//! Error types and handling for the docsweep library
//!
//! Analysis never fails on malformed input; these errors surface only at the
//! fallible edges: parsing a part, loading configuration, touching the
//! filesystem, or a removal category that cannot proceed.

use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for docsweep operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for docsweep operations
#[derive(Error, Debug)]
#[non_exhaustive]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("XML error: {0}")]
    XmlError(#[from] XmlError),

    #[error("Part error: {0}")]
    PartError(#[from] PartError),

    #[error("Cleaner error: {0}")]
    CleanerError(#[from] CleanerError),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Directory walk error: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

// -------------------- Sub-Error Categories --------------------

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("Part is not valid UTF-8")]
    Encoding,

    #[error("Missing root element")]
    MissingRoot,

    #[error("Unclosed element <{0}>")]
    Unclosed(String),

    #[error("Content after root element")]
    TrailingContent,
}

impl From<quick_xml::Error> for XmlError {
    fn from(err: quick_xml::Error) -> Self {
        XmlError::Malformed(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        XmlError::Malformed(err.to_string())
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PartError {
    #[error("Part not found: {0}")]
    NotFound(String),

    #[error("Part {path} could not be parsed: {reason}")]
    Unparsable { path: String, reason: String },

    #[error("Part {0} is binary, expected XML")]
    NotXml(String),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CleanerError {
    #[error("Failed to parse {0}")]
    ParseFailure(String),

    #[error("Failed to update {path}: {reason}")]
    UpdateFailure { path: String, reason: String },
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("Missing {0}")]
    MissingPart(String),

    #[error("Invalid {path}: {reason}")]
    InvalidPart { path: String, reason: String },
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Invalid pattern {pattern:?} in section {section}: {reason}")]
    InvalidPattern {
        section: String,
        pattern: String,
        reason: String,
    },

    #[error("Config parsing error: {0}")]
    Parse(String),

    #[error("Unknown clean category: {0}")]
    UnknownCategory(String),
}

impl From<PartError> for CleanerError {
    fn from(err: PartError) -> Self {
        match err {
            PartError::Unparsable { path, .. } => CleanerError::ParseFailure(path),
            PartError::NotFound(path) => CleanerError::UpdateFailure {
                path,
                reason: "part not found".into(),
            },
            PartError::NotXml(path) => CleanerError::UpdateFailure {
                path,
                reason: "binary part".into(),
            },
        }
    }
}
