//! Column names of the bridge relations.

pub const PERIPHERAL: &str = "peripheral";
pub const BRIDGE_PIT_HOOK: &str = "_pit_hook__bridge";
pub const EPOCH_HOOK: &str = "_hook__epoch__date";

pub const VALID_FROM: &str = "_record__valid_from";
pub const VALID_TO: &str = "_record__valid_to";
pub const IS_CURRENT: &str = "_record__is_current";
pub const LOADED_AT: &str = "_record__loaded_at";
pub const UPDATED_AT: &str = "_record__updated_at";

/// `_hook__{name}`
pub fn hook_column(name: &str) -> String {
    format!("_hook__{name}")
}

/// `_pit_hook__{name}`
pub fn pit_hook_column(name: &str) -> String {
    format!("_pit_hook__{name}")
}

/// `event__{event_type}`
pub fn event_column(event_type: &str) -> String {
    format!("event__{event_type}")
}

/// Columns every bridge row carries regardless of its join steps.
pub const FIXED_COLUMNS: [&str; 8] = [
    PERIPHERAL,
    BRIDGE_PIT_HOOK,
    EPOCH_HOOK,
    VALID_FROM,
    VALID_TO,
    IS_CURRENT,
    LOADED_AT,
    UPDATED_AT,
];

/// True when a hook or step called `name` would render onto a fixed column.
pub fn is_reserved(name: &str) -> bool {
    let hook = hook_column(name);
    let pit_hook = pit_hook_column(name);
    FIXED_COLUMNS
        .iter()
        .any(|fixed| *fixed == hook || *fixed == pit_hook)
}
