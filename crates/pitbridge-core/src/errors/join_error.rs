/// Temporal join engine errors.
#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    #[error("orphan reference in {peripheral}.{step}: {primary_pit_hook} has no overlapping version for {}", .foreign_hook.as_deref().unwrap_or("<null>"))]
    OrphanReference {
        peripheral: String,
        step: String,
        primary_pit_hook: String,
        foreign_hook: Option<String>,
    },

    #[error("invalid join plan for {peripheral}: {reason}")]
    InvalidJoinPlan { peripheral: String, reason: String },

    #[error("unknown related relation {relation} referenced by {peripheral}")]
    UnknownRelation { peripheral: String, relation: String },

    #[error("unknown hook column {column} referenced by {peripheral}.{step}")]
    UnknownHookColumn {
        peripheral: String,
        step: String,
        column: String,
    },

    #[error("{peripheral}.{step}: hook concept {hook_concept} does not match {related} concept {related_concept}")]
    ConceptMismatch {
        peripheral: String,
        step: String,
        hook_concept: String,
        related: String,
        related_concept: String,
    },
}
