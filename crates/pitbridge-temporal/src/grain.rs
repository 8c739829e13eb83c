//! Stage-boundary grain validation.
//!
//! Downstream relations declare an expected uniqueness grain (usually a PIT
//! hook column). These checks run after each stage so a broken invariant is
//! reported at the stage that produced it.

use std::collections::HashSet;

use pitbridge_core::errors::{PitBridgeError, PitBridgeResult};
use pitbridge_core::models::{max_sentinel, min_sentinel, VersionedRecord};

/// Expected uniqueness grain of one relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrainSpec {
    pub relation: String,
    pub column: String,
}

impl GrainSpec {
    pub fn new(relation: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            column: column.into(),
        }
    }

    /// Every token in the grain column must be distinct.
    pub fn check_unique<'a>(&self, tokens: impl IntoIterator<Item = &'a str>) -> PitBridgeResult<()> {
        let mut seen = HashSet::new();
        for token in tokens {
            if !seen.insert(token) {
                return Err(self.violation(format!("duplicate {} value {token}", self.column)));
            }
        }
        Ok(())
    }

    fn violation(&self, reason: String) -> PitBridgeError {
        PitBridgeError::GrainViolation {
            relation: self.relation.clone(),
            reason,
        }
    }
}

/// Validate the history invariants of a versioned relation ordered by
/// (business_key, version): versions start at 1 and are consecutive, the
/// first starts at the lower sentinel, intervals are contiguous, and exactly
/// one version per key is current, namely the one ending at the upper sentinel.
pub fn check_versioned_history(relation: &str, records: &[VersionedRecord]) -> PitBridgeResult<()> {
    let lower = min_sentinel();
    let upper = max_sentinel();
    let violation = |reason: String| PitBridgeError::GrainViolation {
        relation: relation.to_string(),
        reason,
    };

    let mut start = 0;
    while start < records.len() {
        let key = &records[start].business_key;
        let end = records[start..]
            .iter()
            .position(|r| &r.business_key != key)
            .map_or(records.len(), |offset| start + offset);
        let history = &records[start..end];

        if history[0].valid_from != lower {
            return Err(violation(format!(
                "key {key}: first version does not start at the lower sentinel"
            )));
        }
        for (i, record) in history.iter().enumerate() {
            if record.version as usize != i + 1 {
                return Err(violation(format!(
                    "key {key}: expected version {}, found {}",
                    i + 1,
                    record.version
                )));
            }
            if record.is_current != (record.valid_to == upper) {
                return Err(violation(format!(
                    "key {key}: version {} current flag disagrees with valid_to",
                    record.version
                )));
            }
        }
        for pair in history.windows(2) {
            if pair[0].valid_to != pair[1].valid_from {
                return Err(violation(format!(
                    "key {key}: gap or overlap between versions {} and {}",
                    pair[0].version, pair[1].version
                )));
            }
        }
        let current = history.iter().filter(|r| r.is_current).count();
        if current != 1 {
            return Err(violation(format!(
                "key {key}: expected exactly one current version, found {current}"
            )));
        }

        start = end;
    }
    Ok(())
}
