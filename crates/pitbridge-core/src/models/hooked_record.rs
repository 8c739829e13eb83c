use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Hook, PitHook, VersionedRecord};

/// A versioned record tagged with its identity hooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookedRecord {
    pub record: VersionedRecord,
    pub hook: Hook,
    pub pit_hook: PitHook,
    /// Foreign hooks keyed by hook definition name. `None` when the source
    /// field was null.
    pub foreign_hooks: BTreeMap<String, Option<Hook>>,
}

impl HookedRecord {
    /// The foreign hook stored under `name`, flattening unknown and null.
    pub fn foreign_hook(&self, name: &str) -> Option<&Hook> {
        self.foreign_hooks.get(name).and_then(Option::as_ref)
    }
}
