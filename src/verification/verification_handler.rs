use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{PartError, ValidationError};
use crate::types::{PartStore, CONTENT_TYPES_PATH, DOCUMENT_PATH, PACKAGE_RELS_PATH};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCheck {
    pub name: String,
    pub passed: bool,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub passed: bool,
    pub checks: Vec<VerificationCheck>,
}

impl VerificationResult {
    pub fn failures(&self) -> impl Iterator<Item = &VerificationCheck> {
        self.checks.iter().filter(|check| !check.passed)
    }
}

/// Smoke test that a container can still be opened: the content types
/// manifest parses, the package relationships exist, the main document parses
#[derive(Debug, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, store))]
    pub fn validate(&self, store: &PartStore) -> VerificationResult {
        let checks = vec![
            Self::check("content types", Self::parses(store, CONTENT_TYPES_PATH)),
            Self::check("package relationships", Self::exists(store, PACKAGE_RELS_PATH)),
            Self::check("main document", Self::parses(store, DOCUMENT_PATH)),
        ];
        let passed = checks.iter().all(|check| check.passed);
        if passed {
            debug!("Structural validation passed");
        } else {
            warn!("Structural validation failed");
        }
        VerificationResult { passed, checks }
    }

    /// Validation as a result, with the first failure as the error
    pub fn ensure_valid(&self, store: &PartStore) -> Result<(), ValidationError> {
        let result = self.validate(store);
        let outcome = match result.failures().next() {
            None => Ok(()),
            Some(check) => Err(ValidationError::InvalidPart {
                path: check.name.clone(),
                reason: check.details.clone().unwrap_or_default(),
            }),
        };
        outcome
    }

    fn check(name: &str, outcome: Result<(), ValidationError>) -> VerificationCheck {
        VerificationCheck {
            name: name.to_string(),
            passed: outcome.is_ok(),
            details: outcome.err().map(|e| e.to_string()),
        }
    }

    fn exists(store: &PartStore, path: &str) -> Result<(), ValidationError> {
        if store.contains(path) {
            Ok(())
        } else {
            Err(ValidationError::MissingPart(path.to_string()))
        }
    }

    fn parses(store: &PartStore, path: &str) -> Result<(), ValidationError> {
        store.try_xml(path).map(|_| ()).map_err(|e| match e {
            PartError::NotFound(path) => ValidationError::MissingPart(path),
            PartError::Unparsable { path, reason } => ValidationError::InvalidPart { path, reason },
            PartError::NotXml(path) => ValidationError::InvalidPart {
                path,
                reason: "not an XML part".to_string(),
            },
        })
    }
}
