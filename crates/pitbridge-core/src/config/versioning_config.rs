//! Versioning stage configuration.

use serde::{Deserialize, Serialize};

use crate::models::MalformedKeyPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    pub malformed_key_policy: MalformedKeyPolicy,
}
