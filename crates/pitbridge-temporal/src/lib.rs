//! # pitbridge-temporal
//!
//! The temporal core: builds versioned histories from raw change records,
//! resolves foreign hooks against related histories with interval
//! tightening and fan-out, unpivots date attributes into calendar-anchored
//! events, and validates grain at stage boundaries.

pub mod events;
pub mod grain;
pub mod join;
pub mod partition;
pub mod versioning;

pub use events::EventDefinition;
pub use join::{
    CatalogEntry, HookCatalog, HookSource, JoinPlan, JoinStep, RelatedIndex, TemporalJoinEngine,
};
pub use versioning::{version_relation, VersioningOutcome};
