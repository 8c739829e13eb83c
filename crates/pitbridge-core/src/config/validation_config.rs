//! Stage-boundary grain validation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Check single-current and unique PIT hook grains after each stage.
    pub enforce_grain: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enforce_grain: true,
        }
    }
}
