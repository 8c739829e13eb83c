//! Declarative policies selected through configuration or per join step.

use serde::{Deserialize, Serialize};

/// What to do with a primary row whose foreign reference matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPolicy {
    /// Drop the row.
    Inner,
    /// Keep the row with a null foreign PIT hook and its interval unchanged.
    #[default]
    Outer,
}

/// How an inner join reports the rows it drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Log a warning, count the orphan, and drop the row.
    #[default]
    WarnDrop,
    /// Fail the stage with an orphan reference error.
    Strict,
}

/// How the versioning stage treats a null or empty business key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedKeyPolicy {
    /// Abort the relation and surface the offending record.
    #[default]
    Abort,
    /// Route the record to the quarantine list and continue.
    Quarantine,
}
