//! Post-clean verification

mod verification_handler;

pub use self::verification_handler::{StructuralValidator, VerificationCheck, VerificationResult};
