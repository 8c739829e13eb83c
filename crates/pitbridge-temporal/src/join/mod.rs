//! Temporal join engine: resolves foreign hooks against related histories.
//!
//! - `plan`: join steps and their dependency order
//! - `index`: per-hook sorted version lists of a related entity
//! - `resolver`: interval tightening, fan-out and unmatched policies

pub mod index;
pub mod plan;
pub mod resolver;

pub use index::RelatedIndex;
pub use plan::{CatalogEntry, HookCatalog, HookSource, JoinPlan, JoinStep};
pub use resolver::{tighten, JoinStats, Resolution, ResolvedRow, TemporalJoinEngine};
