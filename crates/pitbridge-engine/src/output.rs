//! Results of a run.

use std::collections::BTreeMap;

use pitbridge_core::errors::PitBridgeResult;
use pitbridge_core::models::{BridgeRow, EventRow, HookedRecord, RawRecord, VersionedRecord};
use pitbridge_temporal::join::JoinStats;
use pitbridge_union::{Relation, UnifiedBridge};

/// Everything derived for one entity.
#[derive(Debug, Clone)]
pub struct EntityOutput {
    /// Versioned and tagged records, ordered by (business_key, version).
    pub tagged: Vec<HookedRecord>,
    /// Raw records set aside under the quarantine policy.
    pub quarantined: Vec<RawRecord>,
    pub bridge: Vec<BridgeRow>,
    pub events: Vec<EventRow>,
    /// The entity's bridge rendered as a relation.
    pub relation: Relation,
    pub stats: JoinStats,
}

impl EntityOutput {
    pub fn versioned(&self) -> impl Iterator<Item = &VersionedRecord> {
        self.tagged.iter().map(|t| &t.record)
    }
}

/// Output of [`crate::BridgeEngine::run`]. Entities are ordered by name.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub entities: BTreeMap<String, EntityOutput>,
    pub unified: UnifiedBridge,
}

impl RunOutput {
    pub fn entity(&self, name: &str) -> Option<&EntityOutput> {
        self.entities.get(name)
    }

    pub fn bridge(&self, name: &str) -> &[BridgeRow] {
        self.entities
            .get(name)
            .map(|e| e.bridge.as_slice())
            .unwrap_or(&[])
    }

    pub fn events(&self, name: &str) -> &[EventRow] {
        self.entities
            .get(name)
            .map(|e| e.events.as_slice())
            .unwrap_or(&[])
    }

    /// blake3 over the canonical JSON of the unified bridge, hex-encoded.
    /// Identical inputs give identical fingerprints.
    pub fn fingerprint(&self) -> PitBridgeResult<String> {
        let bytes = serde_json::to_vec(&self.unified)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}
