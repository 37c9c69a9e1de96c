//! Logging and tracing bootstrap.

use anyhow::{anyhow, Context};
use bookstore_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr so rendered pages on stdout stay clean. `RUST_LOG`
/// overrides the configured filter.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => directive_filter(&settings.filter)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed
        .map_err(|err| anyhow!(err))
        .context("failed to install tracing subscriber")?;

    tracing::debug!(
        target: "bookstore-telemetry",
        format = ?settings.log_format,
        filter = %settings.filter,
        "telemetry initialized"
    );
    Ok(())
}

fn directive_filter(directive: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(directive)
        .with_context(|| format!("invalid telemetry filter '{directive}'"))
}
