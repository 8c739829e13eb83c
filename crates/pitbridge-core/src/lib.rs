//! # pitbridge-core
//!
//! Foundation crate for the pitbridge engine: the data model shared by every
//! stage (raw records, versioned records, hooks, bridge and event rows), the
//! error hierarchy, subsystem configuration, and the upstream store trait.

pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

pub use config::PitBridgeConfig;
pub use errors::{PitBridgeError, PitBridgeResult};
