//! Versioning stage: raw change records → contiguous per-key histories.
//!
//! For one business key ordered by (captured_at, sequence):
//! - version n is 1-based
//! - `valid_from(1) = MIN_SENTINEL`, `valid_from(n) = captured_at(n)`
//! - `valid_to(n) = captured_at(n + 1)`, or `MAX_SENTINEL` for the last
//! - only the last version is current

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use pitbridge_core::config::{ExecutionConfig, VersioningConfig};
use pitbridge_core::errors::{PitBridgeError, PitBridgeResult, VersioningError};
use pitbridge_core::models::{
    max_sentinel, min_sentinel, MalformedKeyPolicy, RawRecord, VersionedRecord,
};

use crate::partition::{first_error, map_partitions};

/// Result of versioning one relation.
#[derive(Debug, Clone, PartialEq)]
pub struct VersioningOutcome {
    pub relation: String,
    /// Ordered by (business_key, version).
    pub records: Vec<VersionedRecord>,
    /// Records rejected for a malformed key under the quarantine policy.
    pub quarantined: Vec<RawRecord>,
}

impl VersioningOutcome {
    /// Number of distinct business keys.
    pub fn key_count(&self) -> usize {
        self.records.iter().filter(|r| r.version == 1).count()
    }
}

/// Version every key of `relation`.
pub fn version_relation(
    relation: &str,
    raw: Vec<RawRecord>,
    config: &VersioningConfig,
    execution: &ExecutionConfig,
) -> PitBridgeResult<VersioningOutcome> {
    let (partitions, quarantined) = partition_by_key(relation, raw, config)?;
    let key_count = partitions.len();

    let results = map_partitions(
        partitions.into_iter().collect::<Vec<_>>(),
        execution,
        |(key, records)| version_key(relation, key, records),
    );
    let records: Vec<VersionedRecord> = first_error(results)?.into_iter().flatten().collect();

    info!(
        relation,
        keys = key_count,
        versions = records.len(),
        quarantined = quarantined.len(),
        "versioned relation"
    );

    Ok(VersioningOutcome {
        relation: relation.to_string(),
        records,
        quarantined,
    })
}

type Partitions = BTreeMap<String, Vec<RawRecord>>;

fn partition_by_key(
    relation: &str,
    raw: Vec<RawRecord>,
    config: &VersioningConfig,
) -> PitBridgeResult<(Partitions, Vec<RawRecord>)> {
    let lower = min_sentinel();
    let upper = max_sentinel();
    let mut partitions: Partitions = BTreeMap::new();
    let mut quarantined = Vec::new();

    for record in raw {
        if record.captured_at <= lower || record.captured_at >= upper {
            return Err(PitBridgeError::InvalidTemporalBounds(format!(
                "{relation}: captured_at {} lies outside the sentinel range",
                record.captured_at.to_rfc3339()
            )));
        }

        let key = match record.valid_key() {
            Some(key) => key.to_string(),
            None => match config.malformed_key_policy {
                MalformedKeyPolicy::Abort => {
                    return Err(VersioningError::MalformedKey {
                        relation: relation.to_string(),
                        record: Box::new(record),
                    }
                    .into());
                }
                MalformedKeyPolicy::Quarantine => {
                    warn!(
                        relation,
                        captured_at = %record.captured_at.to_rfc3339(),
                        sequence = ?record.sequence,
                        "quarantined record with malformed business key"
                    );
                    quarantined.push(record);
                    continue;
                }
            },
        };
        partitions.entry(key).or_default().push(record);
    }

    Ok((partitions, quarantined))
}

/// Build the history of a single key.
fn version_key(
    relation: &str,
    key: String,
    mut records: Vec<RawRecord>,
) -> PitBridgeResult<Vec<VersionedRecord>> {
    // `None` sorts before any sequence; ties without a sequence are rejected below.
    records.sort_by(|a, b| {
        a.captured_at
            .cmp(&b.captured_at)
            .then_with(|| a.sequence.cmp(&b.sequence))
    });

    for pair in records.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.captured_at == b.captured_at {
            let ordered = matches!((a.sequence, b.sequence), (Some(x), Some(y)) if x != y);
            if !ordered {
                return Err(VersioningError::NonMonotonicTimestamp {
                    relation: relation.to_string(),
                    business_key: key,
                    captured_at: a.captured_at,
                }
                .into());
            }
        }
    }

    let upper = max_sentinel();
    let last = records.len().saturating_sub(1);
    let mut versions = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let next_captured = records.get(i + 1).map(|r| r.captured_at);
        let valid_from = if i == 0 {
            min_sentinel()
        } else {
            record.captured_at
        };
        let valid_to = next_captured.unwrap_or(upper);

        versions.push(VersionedRecord {
            business_key: key.clone(),
            version: (i + 1) as u32,
            valid_from,
            valid_to,
            is_current: i == last,
            loaded_at: record.captured_at,
            updated_at: next_captured.unwrap_or(record.captured_at),
            payload: record.payload.clone(),
        });
    }

    debug!(relation, key = %key, versions = versions.len(), "versioned key");
    Ok(versions)
}
