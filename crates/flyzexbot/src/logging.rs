//! Logger initialization (console + optional file).
//!
//! Handlers log through the `log` macros; `tracing-log` bridges them into
//! the tracing subscriber so one init covers both ecosystems.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use flyzex_core::config::LoggingSettings;

/// Initialize the global logger from settings.
///
/// `RUST_LOG` wins over the configured level when set, so a debugging run
/// never needs a config edit.
pub fn init_logger(settings: &LoggingSettings) -> Result<()> {
    tracing_log::LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let registry = Registry::default().with(filter).with(fmt::layer());

    match &settings.file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let with_file = registry.with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)));
            tracing::subscriber::set_global_default(with_file)?;
        }
        None => tracing::subscriber::set_global_default(registry)?,
    }

    Ok(())
}
