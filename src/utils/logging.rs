//! Tracing subscriber setup for the command-line tool

use tracing_subscriber::{EnvFilter, FmtSubscriber};

type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Installs a compact fmt subscriber filtered to this crate at `level`.
/// `quiet` keeps errors only. `RUST_LOG` takes precedence when set.
pub fn init_logging(level: &str, quiet: bool) -> Result<(), InitError> {
    let level = if quiet { "error" } else { level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("docsweep={}", level)));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
}
