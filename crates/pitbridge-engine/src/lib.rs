//! # pitbridge-engine
//!
//! Orchestrates a full run over an upstream raw store: version, tag,
//! resolve, unpivot, render and union every declared entity, with grain
//! validation at each stage boundary.

pub mod engine;
pub mod model;
pub mod observability;
pub mod output;

pub use engine::BridgeEngine;
pub use model::{EntityDefinition, ModelDefinition};
pub use output::{EntityOutput, RunOutput};
