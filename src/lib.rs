//! # media-tidy
//!
//! Finds duplicate photos and reorganizes media folders without ever
//! losing a file.
//!
//! ## Core Philosophy
//! - **Never overwrite** - every rename and move checks its destination first
//! - **Never auto-delete** - "deleting" moves files into a `.delete` folder
//! - **Keep going** - one unreadable image never aborts a scan
//!
//! ## Architecture
//! - `core` - Scanning, hashing, grouping, renumbering and moving
//! - `events` - Progress reporting over channels
//! - `error` - Error types naming the path at fault

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{MediaTidyError, Result};

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Log file name prefix inside the log folder
const LOG_FILE_PREFIX: &str = "media-tidy.log";

/// Initialize tracing for the application.
///
/// Logs go to stderr; with `log_dir` they also go to a daily-rotated file
/// there. `RUST_LOG` overrides the level picked by `verbose`. Keep the
/// returned guard alive until exit so buffered file output is flushed.
/// Calling this twice leaves the first subscriber in place. A log folder
/// that cannot be created is reported as a warning and logging continues
/// on stderr only.
pub fn init_tracing(verbose: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let default_level = if verbose { "media_tidy=debug" } else { "media_tidy=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let mut appender_error = None;
    let (file_layer, guard) = match log_dir.map(|dir| (dir, file_appender(dir))) {
        Some((_, Ok(appender))) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        Some((dir, Err(e))) => {
            appender_error = Some((dir, e));
            (None, None)
        }
        None => (None, None),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    if let Some((dir, error)) = appender_error {
        tracing::warn!(dir = %dir.display(), error = %error, "file logging disabled");
    }
    if installed.is_err() {
        return None;
    }
    guard
}

fn file_appender(dir: &Path) -> std::result::Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn unusable_log_dir_falls_back_to_stderr() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        // A path below a regular file can never be created
        let guard = init_tracing(false, Some(&blocker.join("logs")));

        assert!(guard.is_none());
        assert!(!blocker.join("logs").exists());
    }
}
