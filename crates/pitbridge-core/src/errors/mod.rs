mod event_error;
mod hook_error;
mod join_error;
mod pitbridge_error;
mod union_error;
mod versioning_error;

pub use event_error::EventError;
pub use hook_error::HookError;
pub use join_error::JoinError;
pub use pitbridge_error::{PitBridgeError, PitBridgeResult};
pub use union_error::UnionError;
pub use versioning_error::VersioningError;
