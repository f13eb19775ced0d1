//! Logging setup.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Setup logging with the given level.
///
/// Logs go to stderr so command output on stdout stays clean. When `file` is
/// set, a JSON copy is written to a daily-rolling file; keep the returned
/// guard alive until exit so buffered lines get flushed.
pub fn setup_logging(level: &str, json: bool, file: Option<&str>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match file {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let prefix = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "pricecache.log".into());

            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, prefix));
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }

    guard
}
