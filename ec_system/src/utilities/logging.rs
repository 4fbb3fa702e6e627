use std::path::Path;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shared_resources::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "ec_system.log";

/// Installs the global subscriber. `RUST_LOG` takes precedence over the
/// configured filter. With a log directory configured everything goes to a
/// daily rolling file, keeping the terminal free for the console, and the
/// returned guard must be held until exit. Otherwise logs go to stderr.
pub fn init_logger(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))?;

    let (file_layer, guard) = match config.directory.as_deref() {
        Some(directory) => {
            let (writer, guard) = file_writer(directory)?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };
    let console_layer = file_layer.is_none().then(|| {
        fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_names(true)
            .with_writer(std::io::stderr)
    });

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    match &config.directory {
        Some(directory) => tracing::info!(directory = %directory.display(), "logging initialized"),
        None => tracing::info!("logging initialized (console only)"),
    }
    Ok(guard)
}

fn file_writer(directory: &Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(directory)?;
    let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}
