//! Tracing setup.
//!
//! The TUI owns the terminal, so diagnostics go to a file instead of stderr.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const LOG_DIR: &str = "sioprobe";
const LOG_FILE: &str = "sioprobe.log";

/// `<cache dir>/sioprobe/sioprobe.log`, or the temp dir when there is no cache dir.
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(LOG_DIR)
        .join(LOG_FILE)
}

/// `RUST_LOG` wins; otherwise `level`.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber, appending to `path`.
///
/// Calling it again is a no-op.
pub fn init_file_subscriber(path: &Path, level: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact();

    let _ = subscriber.try_init();
    Ok(())
}
