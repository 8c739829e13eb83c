//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use pitbridge_core::config::ObservabilityConfig;
use pitbridge_core::errors::{PitBridgeError, PitBridgeResult};

/// Install a global fmt subscriber. `RUST_LOG` takes precedence over the
/// configured level. Fails if a global subscriber is already set.
pub fn init_tracing(config: &ObservabilityConfig) -> PitBridgeResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| PitBridgeError::ConfigError(format!("invalid log level: {e}")))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| PitBridgeError::ConfigError(format!("tracing already initialised: {e}")))
}
