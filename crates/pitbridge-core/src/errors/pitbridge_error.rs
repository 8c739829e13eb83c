use super::{EventError, HookError, JoinError, UnionError, VersioningError};

/// Top-level error type for the pitbridge engine.
/// All stage errors convert into this via `From` impls.
#[derive(Debug, thiserror::Error)]
pub enum PitBridgeError {
    #[error("versioning error: {0}")]
    VersioningError(#[from] VersioningError),

    #[error("hook error: {0}")]
    HookError(#[from] HookError),

    #[error("join error: {0}")]
    JoinError(#[from] JoinError),

    #[error("event error: {0}")]
    EventError(#[from] EventError),

    #[error("union error: {0}")]
    UnionError(#[from] UnionError),

    #[error("grain violation in {relation}: {reason}")]
    GrainViolation { relation: String, reason: String },

    #[error("invalid temporal bounds: {0}")]
    InvalidTemporalBounds(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("raw store error: {0}")]
    StoreError(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Convenience type alias.
pub type PitBridgeResult<T> = Result<T, PitBridgeError>;
