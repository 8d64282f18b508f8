//! Shared helpers: logging setup and the scoped working copy

pub mod logging;
pub mod workspace;

pub use self::{logging::init_logging, workspace::Workspace};
