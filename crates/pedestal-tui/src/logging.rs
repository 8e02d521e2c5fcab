//! Log output.
//!
//! The terminal belongs to the UI, so logs go to a file. Writes are handed to
//! a background thread through `tracing-appender`, keeping the event loop
//! free of file I/O.

use std::{fs::File, io, path::Path};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Non-blocking writer that truncates and appends to `path`.
///
/// Buffered lines are flushed when the returned guard drops.
pub fn file_writer(path: &Path) -> io::Result<(NonBlocking, WorkerGuard)> {
    let file = File::create(path)?;
    Ok(tracing_appender::non_blocking(file))
}

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG`, falling back to `level`. Keep the guard
/// alive for as long as logs should be written.
pub fn init(path: &Path, level: &str) -> io::Result<WorkerGuard> {
    let (writer, guard) = file_writer(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
        .with(filter)
        .init();
    Ok(guard)
}
