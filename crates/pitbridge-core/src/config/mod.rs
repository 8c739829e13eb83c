pub mod execution_config;
pub mod hook_config;
pub mod join_config;
pub mod observability_config;
pub mod validation_config;
pub mod versioning_config;

use serde::{Deserialize, Serialize};

use crate::errors::{PitBridgeError, PitBridgeResult};

pub use execution_config::ExecutionConfig;
pub use hook_config::HookConfig;
pub use join_config::JoinConfig;
pub use observability_config::ObservabilityConfig;
pub use validation_config::ValidationConfig;
pub use versioning_config::VersioningConfig;

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PitBridgeConfig {
    pub versioning: VersioningConfig,
    pub hooks: HookConfig,
    pub join: JoinConfig,
    pub execution: ExecutionConfig,
    pub validation: ValidationConfig,
    pub observability: ObservabilityConfig,
}

impl PitBridgeConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Parse and validate in one step.
    pub fn load(toml_str: &str) -> PitBridgeResult<Self> {
        let config =
            Self::from_toml(toml_str).map_err(|e| PitBridgeError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks that serde cannot express.
    pub fn validate(&self) -> PitBridgeResult<()> {
        self.hooks.validate()
    }
}
