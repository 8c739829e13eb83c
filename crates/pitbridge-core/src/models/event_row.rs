use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Hook, PitHook};

/// One calendar-anchored event of a bridge row.
///
/// Every declared event type appears in `flags`; the ones whose date
/// attribute equals `event_date` are `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow {
    pub peripheral: String,
    pub bridge_pit_hook: PitHook,
    pub epoch_hook: Hook,
    pub event_date: NaiveDate,
    pub flags: BTreeMap<String, bool>,
    pub event_pit_hook: PitHook,
}

impl EventRow {
    /// Event types that fired on this row's date.
    pub fn event_types(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, on)| **on)
            .map(|(t, _)| t.as_str())
    }
}
