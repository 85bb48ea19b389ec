//! Subscriber setup. Logs go to stderr so `run` output stays clean JSON.

use anyhow::{Context, Result};
use parallels_config::{LogFormat, LoggerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG`, when set, takes precedence
/// over the configured level.
pub fn init(config: &LoggerConfig) -> Result<()> {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

  let registry = tracing_subscriber::registry().with(filter);

  match config.format {
    LogFormat::Json => registry
      .with(
        fmt::layer()
          .json()
          .with_current_span(true)
          .with_target(true)
          .with_writer(std::io::stderr),
      )
      .try_init(),
    LogFormat::Text => registry
      .with(
        fmt::layer()
          .with_target(false)
          .with_writer(std::io::stderr),
      )
      .try_init(),
  }
  .context("failed to initialize logging")?;

  tracing::debug!(level = %config.level, format = %config.format, "logging initialized");

  Ok(())
}
