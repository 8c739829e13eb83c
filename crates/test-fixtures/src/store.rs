//! In-memory implementation of the upstream raw store.

use std::collections::BTreeMap;

use pitbridge_core::errors::{PitBridgeError, PitBridgeResult};
use pitbridge_core::models::RawRecord;
use pitbridge_core::traits::IRawStore;

/// Append-only raw store backed by a map of entity name → records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRawStore {
    entities: BTreeMap<String, Vec<RawRecord>>,
}

impl InMemoryRawStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: &str, records: Vec<RawRecord>) -> Self {
        self.entities
            .entry(entity.to_string())
            .or_default()
            .extend(records);
        self
    }

    pub fn append(&mut self, entity: &str, record: RawRecord) {
        self.entities
            .entry(entity.to_string())
            .or_default()
            .push(record);
    }
}

impl IRawStore for InMemoryRawStore {
    fn read(&self, entity: &str) -> PitBridgeResult<Vec<RawRecord>> {
        self.entities
            .get(entity)
            .cloned()
            .ok_or_else(|| PitBridgeError::StoreError(format!("unknown entity {entity}")))
    }

    fn entities(&self) -> Vec<String> {
        self.entities.keys().cloned().collect()
    }
}
