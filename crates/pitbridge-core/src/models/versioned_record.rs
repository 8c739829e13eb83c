use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidityInterval, Value};

/// One historical version of a business key.
///
/// For a fixed key, versions sorted by `version` tile the timeline:
/// `v[i].valid_to == v[i + 1].valid_from`, the first starts at the lower
/// sentinel and exactly one (the last) is current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedRecord {
    pub business_key: String,
    /// 1-based version number within the key's history.
    pub version: u32,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub is_current: bool,
    /// Captured-at of the raw record this version came from.
    pub loaded_at: DateTime<Utc>,
    /// Captured-at of the superseding record, or `loaded_at` while current.
    pub updated_at: DateTime<Utc>,
    pub payload: BTreeMap<String, Value>,
}

impl VersionedRecord {
    pub fn interval(&self) -> ValidityInterval {
        ValidityInterval {
            valid_from: self.valid_from,
            valid_to: self.valid_to,
        }
    }

    /// Payload field by name; missing fields read as `Null`.
    pub fn field(&self, name: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.payload.get(name).unwrap_or(&NULL)
    }
}
