use std::path::Path;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::infrastructure::config::{Config, LogFormat};

const DEFAULT_FILTER: &str = "pdf_audiobook=debug,tower_http=debug";
const LOG_FILE_PREFIX: &str = "server.log";

/// Install the global subscriber: console output in the configured format plus
/// a daily rolling file under `log_dir`. The guard flushes the file on drop.
pub fn init_logging(config: &Config) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let (file_writer, guard) = file_writer(&config.log_dir)?;
    build_subscriber(config.log_format, file_writer).try_init()?;
    Ok(guard)
}

fn file_writer(log_dir: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(file_appender))
}

fn build_subscriber(
    format: LogFormat,
    file_writer: NonBlocking,
) -> Box<dyn Subscriber + Send + Sync> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    // The file layer sits directly on the filtered registry so its type does
    // not depend on which console layer follows.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer);

    match format {
        LogFormat::Json => Box::new(
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(tracing_subscriber::fmt::layer().json()),
        ),
        LogFormat::Pretty => Box::new(
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(tracing_subscriber::fmt::layer().pretty()),
        ),
    }
}
