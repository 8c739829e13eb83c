//! Half-open validity intervals and the sentinel bounds of open history.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{PitBridgeError, PitBridgeResult};

/// Lower sentinel: `valid_from` of every first version.
pub fn min_sentinel() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Upper sentinel: `valid_to` of every current version.
pub fn max_sentinel() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// A validity interval `[valid_from, valid_to)`.
///
/// Zero-length intervals (`valid_from == valid_to`) are permitted: they arise
/// when two raw records share a captured-at timestamp and are ordered by
/// ingestion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValidityInterval {
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
}

impl ValidityInterval {
    /// Create an interval, rejecting `valid_from > valid_to`.
    pub fn new(valid_from: DateTime<Utc>, valid_to: DateTime<Utc>) -> PitBridgeResult<Self> {
        if valid_from > valid_to {
            return Err(PitBridgeError::InvalidTemporalBounds(format!(
                "valid_from ({}) must be <= valid_to ({})",
                valid_from.to_rfc3339(),
                valid_to.to_rfc3339()
            )));
        }
        Ok(Self {
            valid_from,
            valid_to,
        })
    }

    /// `[MIN_SENTINEL, MAX_SENTINEL)`.
    pub fn unbounded() -> Self {
        Self {
            valid_from: min_sentinel(),
            valid_to: max_sentinel(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.valid_from >= self.valid_to
    }

    /// `valid_from <= instant < valid_to`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.valid_from <= instant && instant < self.valid_to
    }

    /// Whether the two intervals share at least one instant.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.valid_from.max(other.valid_from) < self.valid_to.min(other.valid_to)
    }

    /// Strict intersection. `None` when the intervals share no instant.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let valid_from = self.valid_from.max(other.valid_from);
        let valid_to = self.valid_to.min(other.valid_to);
        (valid_from < valid_to).then_some(Self {
            valid_from,
            valid_to,
        })
    }

    /// Whether `self` lies entirely within `other`.
    pub fn is_within(&self, other: &Self) -> bool {
        other.valid_from <= self.valid_from && self.valid_to <= other.valid_to
    }

    pub fn duration(&self) -> TimeDelta {
        self.valid_to - self.valid_from
    }

    /// Whether this interval runs to the upper sentinel.
    pub fn is_open_ended(&self) -> bool {
        self.valid_to == max_sentinel()
    }
}
