/// Event unpivot errors.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("attribute {field} of {peripheral} is not a date: found {found}")]
    NonDateAttribute {
        peripheral: String,
        field: String,
        found: String,
    },

    #[error("event type {event_type:?} of {peripheral} is not an identifier")]
    InvalidEventType {
        peripheral: String,
        event_type: String,
    },

    #[error("event type {event_type} declared twice for {peripheral}")]
    DuplicateEventType {
        peripheral: String,
        event_type: String,
    },
}
