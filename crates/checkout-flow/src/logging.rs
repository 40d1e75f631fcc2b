//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;
use crate::error::{FlowError, FlowResult};

/// Builds the log filter: `RUST_LOG` if set, otherwise the configured level.
pub fn env_filter(settings: &LoggingSettings) -> FlowResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.level)
            .map_err(|e| FlowError::Logging(format!("bad level '{}': {}", settings.level, e))),
    }
}

/// Installs the global fmt subscriber.
///
/// Safe to call more than once: if a global subscriber is already in place
/// it is kept and this returns `Ok`.
pub fn init_tracing(settings: &LoggingSettings) -> FlowResult<()> {
    if tracing::dispatcher::has_been_set() {
        tracing::debug!("Tracing already initialized, keeping existing subscriber");
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(settings)?)
        .with_target(true)
        .try_init()
        .or_else(|e| {
            // Lost a race with another initializer.
            if tracing::dispatcher::has_been_set() {
                Ok(())
            } else {
                Err(FlowError::Logging(e.to_string()))
            }
        })
}
