use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::domain::model::{LogRotation, LoggingConfig};

#[derive(Debug, Error)]
pub enum BootError {
    #[error("fatal: {0}")]
    Fatal(String),
}

/// Installs the global subscriber: stdout always, plus a rolling file when
/// `logging.file_directory` is set. Keep the returned guard alive for the
/// whole process or buffered file lines are lost on exit.
pub fn init_logging(cfg: &LoggingConfig) -> Result<Option<WorkerGuard>, BootError> {
    // Base level from config, still overridable via RUST_LOG.
    let level = &cfg.level;
    let default = format!("{level},relaybot={level},hyper=warn,reqwest=warn");
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_filter(stdout_filter);

    let Some(dir) = &cfg.file_directory else {
        tracing_subscriber::registry().with(stdout_layer).init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .map_err(|e| BootError::Fatal(format!("log dir {}: {e}", dir.display())))?;
    let rotation = match cfg.file_rotation {
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    };
    let appender = RollingFileAppender::new(rotation, dir, &cfg.file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_filter = EnvFilter::try_new(&cfg.file_level)
        .map_err(|e| BootError::Fatal(format!("invalid logging.file_level: {e}")))?;
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();
    Ok(Some(guard))
}
