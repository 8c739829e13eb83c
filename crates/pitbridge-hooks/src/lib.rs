//! # pitbridge-hooks
//!
//! Every identity token in pitbridge is built here. Hooks, PIT hooks, epoch
//! hooks and bridge PIT hooks are pure functions of their inputs, so the
//! injectivity guarantee can be checked in one place.
//!
//! - `builder`: token construction and escaping
//! - `naming`: column names for hook, PIT hook and record metadata columns
//! - `tagging`: explicit mapping from a versioned record to its hooks
//! - `registry`: collision detection harness for property tests

pub mod builder;
pub mod naming;
pub mod registry;
pub mod tagging;

pub use builder::HookBuilder;
pub use registry::HookRegistry;
pub use tagging::{HookDefinition, HookMapping};
