use anyhow::Result;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Pretty,
    Bunyan,
}

impl LogFormat {
    pub fn from_arg(value: &str) -> Self {
        match value {
            "bunyan" => Self::Bunyan,
            _ => Self::Pretty,
        }
    }
}

/// Installs the global subscriber. Logs go to stderr so stdout only carries
/// results. `log` records from the rewriter library are forwarded.
pub fn init(format: LogFormat) -> Result<()> {
    tracing_log::LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Pretty => {
            let subscriber = Registry::default()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr));
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Bunyan => {
            let subscriber = Registry::default()
                .with(filter)
                .with(JsonStorageLayer)
                .with(BunyanFormattingLayer::new(
                    env!("CARGO_PKG_NAME").to_string(),
                    std::io::stderr,
                ));
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}
