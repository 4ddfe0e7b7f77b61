//! Console and file logging.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

const LEVELS: [&str; 4] = ["warn", "info", "debug", "trace"];

/// Combined `error.log` for warnings and errors of every command.
const ERROR_LOG: &str = "error.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Map `base + verbose` onto a level name.
pub fn level(base: u8, verbose: u8) -> &'static str {
    let index = usize::from(base.saturating_add(verbose)).min(LEVELS.len() - 1);
    LEVELS[index]
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber.
///
/// Events go to stderr and to `log_dir/file_name`, with warnings and errors
/// copied to `log_dir/error.log`. If the directory cannot be created only the
/// console sink is installed. Keep the returned guards alive until exit.
pub fn init(level: &str, json: bool, log_dir: &Path, file_name: &str) -> Vec<WorkerGuard> {
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guards = Vec::new();

    let console: BoxedLayer = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter(level))
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(filter(level))
            .boxed()
    };
    layers.push(console);

    let dir_error = std::fs::create_dir_all(log_dir).err();
    if dir_error.is_none() {
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, file_name));
        guards.push(guard);
        layers.push(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter(level))
                .boxed(),
        );

        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, ERROR_LOG));
        guards.push(guard);
        layers.push(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(LevelFilter::WARN)
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).init();

    if let Some(e) = dir_error {
        tracing::warn!(
            dir = %log_dir.display(),
            error = %e,
            "Could not create log directory, logging to console only"
        );
    }

    guards
}
