//! # pitbridge-union
//!
//! Renders per-peripheral bridge and event rows into typed relations, unions
//! them by column name into the unified bridge, and exposes the temporal
//! read modes over the result.

pub mod read_mode;
pub mod relation;
pub mod render;
pub mod union;

pub use read_mode::{ReadMode, UnifiedBridge};
pub use relation::{Column, Relation, Schema};
pub use render::{to_relation, BridgeLayout};
pub use union::union_by_name;
