//! Logging and tracing setup
//!
//! Logs go to stderr (or a file) so stdout only carries rendered views.

use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;
use crate::error::{DashboardError, Result};

/// Initialize logging from configuration; `RUST_LOG` overrides the configured level
pub fn initialize_logging(config: &LoggingConfig) -> Result<()> {
    initialize_logging_with_config(&config.level, &config.format, config.file.as_deref())
}

/// Initialize logging with explicit settings
pub fn initialize_logging_with_config(
    level: &str,
    format: &str,
    file: Option<&std::path::Path>,
) -> Result<()> {
    // Set up environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = match file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path.file_name().ok_or_else(|| {
                DashboardError::Config(format!("Log file path has no file name: {:?}", path))
            })?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            format_layer(format, appender, false)
        }
        None => format_layer(format, std::io::stderr, true),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| DashboardError::Config(format!("Failed to initialize logging: {}", e)))
}

fn format_layer<S, W>(format: &str, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        "json" => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        "pretty" => fmt::layer()
            .pretty()
            .with_writer(writer)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(ansi)
            .boxed(),
        _ => fmt::layer()
            .compact()
            .with_writer(writer)
            .with_target(false)
            .with_ansi(ansi)
            .boxed(),
    }
}
