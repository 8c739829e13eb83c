//! Shared test support: timestamp shorthands, raw and versioned record
//! builders, hook tagging helpers, and an in-memory raw store.

pub mod builders;
pub mod store;

pub use builders::*;
pub use store::InMemoryRawStore;
