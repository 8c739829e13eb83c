//! Temporal join configuration.

use serde::{Deserialize, Serialize};

use crate::models::{JoinPolicy, OrphanPolicy};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    /// Applied to join steps that do not declare a policy.
    pub default_policy: JoinPolicy,
    /// Applied to rows dropped by inner joins.
    pub orphan_policy: OrphanPolicy,
}
