use chrono::{DateTime, Utc};

use crate::models::RawRecord;

/// Versioning stage errors.
#[derive(Debug, thiserror::Error)]
pub enum VersioningError {
    /// Null or empty business key. The offending record travels with the error.
    #[error("malformed business key in {relation}: record captured at {}", .record.captured_at.to_rfc3339())]
    MalformedKey {
        relation: String,
        record: Box<RawRecord>,
    },

    /// Two records share a key and a captured-at timestamp with no usable
    /// ingestion sequence to order them.
    #[error("non-monotonic timestamp in {relation}: key {business_key} has duplicate captured_at {} without a distinct ingestion sequence", .captured_at.to_rfc3339())]
    NonMonotonicTimestamp {
        relation: String,
        business_key: String,
        captured_at: DateTime<Utc>,
    },
}
