use crate::config::LoggingConfig;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Where log lines go.
pub(crate) enum LogTarget<'a> {
    /// Append to a file; used while the terminal belongs to the game.
    File(&'a Path),
    Stderr,
}

pub(crate) fn init(config: &LoggingConfig, target: LogTarget<'_>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    match target {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = default_layer().with_writer(Arc::new(file)).with_ansi(false);
            Registry::default().with(env_filter).with(layer).try_init()?;
        }
        LogTarget::Stderr => {
            let layer = default_layer().with_writer(std::io::stderr);
            Registry::default().with(env_filter).with(layer).try_init()?;
        }
    }
    Ok(())
}

fn default_layer<S>() -> tracing_subscriber::fmt::Layer<S>
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer().with_level(true).with_line_number(true).with_span_events(FmtSpan::CLOSE)
}
