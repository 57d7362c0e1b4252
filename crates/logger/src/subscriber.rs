//! Global `tracing` subscriber setup

use shared::{Error, LogFormat, LogSettings, Result};
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, falling back to the configured level
pub fn env_filter(settings: &LogSettings) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.level)
            .map_err(|e| Error::Config(format!("invalid log level '{}': {}", settings.level, e))),
    }
}

/// Install the process-wide subscriber.
///
/// Fails if the level directive is invalid or a subscriber is already
/// installed.
pub fn init(settings: &LogSettings) -> Result<()> {
    let filter = env_filter(settings)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match settings.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| Error::Config(format!("failed to install log subscriber: {}", e)))
}
