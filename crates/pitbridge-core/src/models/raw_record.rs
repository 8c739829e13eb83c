use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Value;

/// One immutable, append-only change record as read from the raw store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Business key. `None` or blank keys are rejected by versioning.
    pub business_key: Option<String>,
    /// Payload fields carried verbatim into every derived version.
    #[serde(default)]
    pub payload: BTreeMap<String, Value>,
    /// Load timestamp assigned by the upstream store.
    pub captured_at: DateTime<Utc>,
    /// Ingestion sequence number, the tie-breaker for equal `captured_at`.
    #[serde(default)]
    pub sequence: Option<u64>,
}

impl RawRecord {
    pub fn new(business_key: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self {
            business_key: Some(business_key.into()),
            payload: BTreeMap::new(),
            captured_at,
            sequence: None,
        }
    }

    /// A record without a business key.
    pub fn keyless(captured_at: DateTime<Utc>) -> Self {
        Self {
            business_key: None,
            payload: BTreeMap::new(),
            captured_at,
            sequence: None,
        }
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(name.into(), value.into());
        self
    }

    /// The business key if it is present and not blank.
    pub fn valid_key(&self) -> Option<&str> {
        self.business_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }
}
