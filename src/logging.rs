//! Tracing subscriber setup: stderr always, plus a daily-rotated file when
//! `logging.log_dir` is set.

use crate::config::LoggingConfig;
use crate::error::{Result, RollcallError};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// File name prefix for rotated log files.
const LOG_FILE_PREFIX: &str = "rollcall.log";

/// Install the global subscriber. `RUST_LOG` takes precedence over
/// `logging.level`.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&config.level)?,
    };

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| RollcallError::Config(format!("logging already initialised: {e}")))?;
    Ok(guard)
}

/// Parse a configured level or directive list such as `info,rollcall=debug`.
pub fn level_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level)
        .map_err(|e| RollcallError::Config(format!("invalid logging.level {level:?}: {e}")))
}
