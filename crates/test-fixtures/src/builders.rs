//! Record builders. Panics are fine here: fixtures are test-only.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use pitbridge_core::models::{
    max_sentinel, min_sentinel, HookedRecord, RawRecord, Value, VersionedRecord,
};
use pitbridge_hooks::{HookBuilder, HookMapping};

/// Midnight UTC on the given day.
pub fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn raw(key: &str, captured_at: DateTime<Utc>) -> RawRecord {
    RawRecord::new(key, captured_at)
}

pub fn fields(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

/// A single version with an explicit interval.
pub fn versioned(
    key: &str,
    version: u32,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
    payload: &[(&str, Value)],
) -> VersionedRecord {
    let is_current = valid_to == max_sentinel();
    let loaded_at = if valid_from == min_sentinel() {
        ts(2000, 1, 1)
    } else {
        valid_from
    };
    VersionedRecord {
        business_key: key.to_string(),
        version,
        valid_from,
        valid_to,
        is_current,
        loaded_at,
        updated_at: if is_current { loaded_at } else { valid_to },
        payload: fields(payload),
    }
}

/// Builds a contiguous history for one key from its change points.
#[derive(Debug, Default)]
pub struct HistoryBuilder {
    key: String,
    versions: Vec<(DateTime<Utc>, BTreeMap<String, Value>)>,
}

impl HistoryBuilder {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            versions: Vec::new(),
        }
    }

    /// Add a version captured at `captured_at`. Calls must be chronological.
    pub fn version_at(mut self, captured_at: DateTime<Utc>, payload: &[(&str, Value)]) -> Self {
        self.versions.push((captured_at, fields(payload)));
        self
    }

    pub fn build(self) -> Vec<VersionedRecord> {
        let n = self.versions.len();
        (0..n)
            .map(|i| {
                let (captured_at, payload) = &self.versions[i];
                let next = self.versions.get(i + 1).map(|(c, _)| *c);
                VersionedRecord {
                    business_key: self.key.clone(),
                    version: (i + 1) as u32,
                    valid_from: if i == 0 { min_sentinel() } else { *captured_at },
                    valid_to: next.unwrap_or_else(max_sentinel),
                    is_current: next.is_none(),
                    loaded_at: *captured_at,
                    updated_at: next.unwrap_or(*captured_at),
                    payload: payload.clone(),
                }
            })
            .collect()
    }
}

/// Tag records with the default hook builder.
pub fn tag(mapping: &HookMapping, records: Vec<VersionedRecord>) -> Vec<HookedRecord> {
    mapping.tag_all(&HookBuilder::default(), records).unwrap()
}
