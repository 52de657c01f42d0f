//! Tracing subscriber setup

use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// File name used inside the configured log directory
pub const LOG_FILE_NAME: &str = "release-radar.log";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    Plain,
    /// One JSON object per event
    Json,
}

/// Builds the filter: `RUST_LOG` wins, otherwise the configured level applies
/// to everything and to this crate.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},release_radar={}", default_level, default_level))
    })
}

/// Creates a non-blocking writer appending to `<dir>/release-radar.log`
pub fn file_writer(dir: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    Ok(tracing_appender::non_blocking(appender))
}

fn format_layer<S, W>(format: LogFormat, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .json()
            .boxed(),
        LogFormat::Plain => tracing_subscriber::fmt::layer().with_writer(writer).boxed(),
    }
}

/// Installs the global subscriber.
///
/// Logs go to stderr, and additionally to a file when a directory is
/// configured. The returned guard must be held until shutdown so buffered file
/// output is flushed.
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            let (writer, guard) = file_writer(dir)?;
            (Some(format_layer(config.format, writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(format_layer(config.format, std::io::stderr))
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
