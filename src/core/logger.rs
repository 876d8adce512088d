//! Tracing setup for the support bot.
//!
//! One human-readable stream, teed to stdout and the run log so relay and
//! ticket-store activity can be traced after the fact. The log directory is
//! created on demand; the file gets no ANSI codes.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Local wall-clock time with milliseconds, `YYYY-MM-DD HH:MM:SS.mmm`.
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{} ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Initializes the global tracing subscriber.
///
/// Lines look like `YYYY-MM-DD HH:MM:SS.mmm LEVEL target: message key=value ...`.
/// Missing parent directories of `log_file_path` are created; the file is
/// appended to across restarts. Level comes from `RUST_LOG` (default `info`).
/// Load `.env` before calling so the filter picks up the configured level.
pub fn init_tracing(log_file_path: &str) -> anyhow::Result<()> {
    let path = Path::new(log_file_path);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(LocalTimer)
        .with_target(true)
        .with_ansi(false)
        .with_writer(io::stdout.and(Arc::new(file)))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}
