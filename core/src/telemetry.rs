use anyhow::Context;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::{LogConfig, LogFormat};
use crate::errors::Result;
use crate::logger::TracingLogger;

/// Installs the global subscriber and returns the logger to hand to the
/// handler. Call once per process, before serving requests.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LogConfig) -> Result<TracingLogger> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| config.env_filter());

    subscriber(config, filter, std::io::stdout)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(TracingLogger::new())
}

/// Builds the subscriber without installing it.
pub fn subscriber<W>(
    config: &LogConfig,
    filter: EnvFilter,
    writer: W,
) -> impl Subscriber + Send + Sync + use<W>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    // unix seconds
    let timer = ChronoUtc::new("%s".to_string());

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_timer(timer)
            .with_file(true)
            .with_line_number(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_timer(timer)
            .with_file(true)
            .with_line_number(true)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry().with(fmt_layer).with(filter)
}
