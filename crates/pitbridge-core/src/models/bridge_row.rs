use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Hook, PitHook, ValidityInterval};

/// A foreign PIT hook resolved by one join step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignPit {
    /// Join step name, which is also the related concept's column role.
    pub step: String,
    /// `None` when an outer join found no overlapping version.
    pub pit_hook: Option<PitHook>,
}

/// A primary version resolved against its related entities over one
/// tightened validity interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeRow {
    pub peripheral: String,
    pub bridge_pit_hook: PitHook,
    pub primary_pit_hook: PitHook,
    pub primary_hook: Hook,
    /// In declared step order.
    pub foreign_pit_hooks: Vec<ForeignPit>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub is_current: bool,
    pub loaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BridgeRow {
    pub fn interval(&self) -> ValidityInterval {
        ValidityInterval {
            valid_from: self.valid_from,
            valid_to: self.valid_to,
        }
    }

    pub fn foreign_pit(&self, step: &str) -> Option<&PitHook> {
        self.foreign_pit_hooks
            .iter()
            .find(|f| f.step == step)
            .and_then(|f| f.pit_hook.as_ref())
    }
}
