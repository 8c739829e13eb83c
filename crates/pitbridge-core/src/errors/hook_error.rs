/// Hook construction errors.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("invalid hook concept {concept:?}: expected a non-empty lowercase identifier")]
    InvalidConcept { concept: String },

    #[error("hook name {name} is reserved: its column collides with a fixed bridge column")]
    ReservedName { name: String },

    #[error("empty qualifier for concept {concept}")]
    EmptyQualifier { concept: String },

    #[error("composite hook requires at least one component")]
    EmptyComposite,

    #[error("malformed epoch hook: {token}")]
    MalformedEpochHook { token: String },

    #[error("hook collision on {token}: {first} and {second}")]
    HookCollision {
        token: String,
        first: String,
        second: String,
    },
}
