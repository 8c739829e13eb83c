//! Event unpivot: date attributes of a bridge row's source version become
//! calendar-anchored event rows.
//!
//! Null attributes produce nothing. Attributes sharing a date collapse into
//! one row with several flags set, which keeps
//! `concat(bridge PIT hook, epoch hook)` unique per row.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pitbridge_core::config::ExecutionConfig;
use pitbridge_core::errors::{EventError, PitBridgeResult};
use pitbridge_core::models::{BridgeRow, EventRow, Value, VersionedRecord};
use pitbridge_hooks::builder::is_valid_concept;
use pitbridge_hooks::HookBuilder;

use crate::join::ResolvedRow;
use crate::partition::{first_error, map_partitions};

/// A date-valued attribute exposed as an event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    /// Label; the flag lands in `event__{event_type}`.
    pub event_type: String,
    /// Payload field holding the date.
    pub field: String,
}

impl EventDefinition {
    pub fn new(event_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            field: field.into(),
        }
    }
}

/// Event types must be unique identifiers.
pub fn validate_definitions(peripheral: &str, definitions: &[EventDefinition]) -> Result<(), EventError> {
    let mut seen = BTreeSet::new();
    for definition in definitions {
        if !is_valid_concept(&definition.event_type) {
            return Err(EventError::InvalidEventType {
                peripheral: peripheral.to_string(),
                event_type: definition.event_type.clone(),
            });
        }
        if !seen.insert(definition.event_type.as_str()) {
            return Err(EventError::DuplicateEventType {
                peripheral: peripheral.to_string(),
                event_type: definition.event_type.clone(),
            });
        }
    }
    Ok(())
}

/// Unpivot one bridge row against the payload of its source version.
pub fn unpivot(
    builder: &HookBuilder,
    bridge: &BridgeRow,
    source: &VersionedRecord,
    definitions: &[EventDefinition],
) -> PitBridgeResult<Vec<EventRow>> {
    let mut by_date: BTreeMap<NaiveDate, BTreeSet<&str>> = BTreeMap::new();
    for definition in definitions {
        if let Some(date) = event_date(&bridge.peripheral, definition, source.field(&definition.field))? {
            by_date
                .entry(date)
                .or_default()
                .insert(definition.event_type.as_str());
        }
    }

    let rows = by_date
        .into_iter()
        .map(|(date, fired)| {
            let epoch_hook = builder.epoch_hook(date);
            let event_pit_hook = builder.event_pit_hook(&bridge.bridge_pit_hook, &epoch_hook);
            let flags = definitions
                .iter()
                .map(|d| (d.event_type.clone(), fired.contains(d.event_type.as_str())))
                .collect();
            EventRow {
                peripheral: bridge.peripheral.clone(),
                bridge_pit_hook: bridge.bridge_pit_hook.clone(),
                epoch_hook,
                event_date: date,
                flags,
                event_pit_hook,
            }
        })
        .collect();
    Ok(rows)
}

/// Unpivot every resolved row of a peripheral, preserving row order.
pub fn unpivot_all(
    builder: &HookBuilder,
    peripheral: &str,
    rows: &[ResolvedRow<'_>],
    definitions: &[EventDefinition],
    execution: &ExecutionConfig,
) -> PitBridgeResult<Vec<EventRow>> {
    validate_definitions(peripheral, definitions)?;
    if definitions.is_empty() {
        return Ok(Vec::new());
    }

    let results = map_partitions(rows.iter().collect(), execution, |resolved| {
        unpivot(builder, &resolved.row, &resolved.source.record, definitions)
    });
    let events: Vec<EventRow> = first_error(results)?.into_iter().flatten().collect();

    debug!(peripheral, bridge_rows = rows.len(), events = events.len(), "unpivoted events");
    Ok(events)
}

/// Date of one attribute: `Date` as is, `Timestamp` as its UTC date, `Text`
/// parsed as `YYYY-MM-DD`. `Null` means no event.
fn event_date(
    peripheral: &str,
    definition: &EventDefinition,
    value: &Value,
) -> Result<Option<NaiveDate>, EventError> {
    let non_date = |found: String| EventError::NonDateAttribute {
        peripheral: peripheral.to_string(),
        field: definition.field.clone(),
        found,
    };
    match value {
        Value::Null => Ok(None),
        Value::Date(d) => Ok(Some(*d)),
        Value::Timestamp(ts) => Ok(Some(ts.date_naive())),
        Value::Text(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| non_date(format!("text {s:?}"))),
        other => Err(non_date(
            other
                .column_type()
                .map_or_else(|| "null".to_string(), |t| t.to_string()),
        )),
    }
}
