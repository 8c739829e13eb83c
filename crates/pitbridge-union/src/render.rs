//! Rendering of one peripheral's bridge and event rows as a relation.
//!
//! Bridge rows are left-joined with their event rows: a bridge row without
//! events yields one row with null epoch and event columns, a bridge row
//! with events yields one row per event keyed by the event PIT hook.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use pitbridge_core::errors::UnionError;
use pitbridge_core::models::{BridgeRow, ColumnType, EventRow, Value};
use pitbridge_hooks::naming;

use crate::relation::{Column, Relation, Schema};

/// Column layout of one peripheral's bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeLayout {
    pub peripheral: String,
    /// Concept of the primary hook.
    pub concept: String,
    /// Join step names, in declaration order.
    pub steps: Vec<String>,
    /// Event types, in declaration order.
    pub event_types: Vec<String>,
}

impl BridgeLayout {
    pub fn new(peripheral: impl Into<String>, concept: impl Into<String>) -> Self {
        Self {
            peripheral: peripheral.into(),
            concept: concept.into(),
            steps: Vec::new(),
            event_types: Vec::new(),
        }
    }

    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps.extend(steps.into_iter().map(Into::into));
        self
    }

    pub fn with_event_types<I, S>(mut self, event_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_types.extend(event_types.into_iter().map(Into::into));
        self
    }

    /// Column layout of the rendered relation. Every cell `render_row`
    /// pushes has its own column, so a name produced twice is an error.
    pub fn schema(&self) -> Result<Schema, UnionError> {
        let mut columns = vec![
            Column::new(naming::PERIPHERAL, ColumnType::Text),
            Column::new(naming::BRIDGE_PIT_HOOK, ColumnType::Text),
            Column::new(naming::hook_column(&self.concept), ColumnType::Text),
            Column::new(naming::pit_hook_column(&self.concept), ColumnType::Text),
        ];
        columns.extend(
            self.steps
                .iter()
                .map(|step| Column::new(naming::pit_hook_column(step), ColumnType::Text)),
        );
        columns.push(Column::new(naming::EPOCH_HOOK, ColumnType::Text));
        columns.extend(
            self.event_types
                .iter()
                .map(|t| Column::new(naming::event_column(t), ColumnType::Bool)),
        );
        columns.extend([
            Column::new(naming::VALID_FROM, ColumnType::Timestamp),
            Column::new(naming::VALID_TO, ColumnType::Timestamp),
            Column::new(naming::IS_CURRENT, ColumnType::Bool),
            Column::new(naming::LOADED_AT, ColumnType::Timestamp),
            Column::new(naming::UPDATED_AT, ColumnType::Timestamp),
        ]);

        let mut schema = Schema::new();
        for column in columns {
            schema
                .try_push(column)
                .map_err(|dup| UnionError::DuplicateColumn {
                    relation: self.peripheral.clone(),
                    column: dup.name,
                })?;
        }
        Ok(schema)
    }
}

/// Render `bridges` left-joined with `events` under `layout`.
pub fn to_relation(
    layout: &BridgeLayout,
    bridges: &[BridgeRow],
    events: &[EventRow],
) -> Result<Relation, UnionError> {
    let mut by_bridge: BTreeMap<&str, Vec<&EventRow>> = BTreeMap::new();
    for event in events {
        by_bridge
            .entry(event.bridge_pit_hook.as_str())
            .or_default()
            .push(event);
    }

    let mut relation = Relation::new(layout.peripheral.as_str(), layout.schema()?);
    for bridge in bridges {
        match by_bridge.get(bridge.bridge_pit_hook.as_str()) {
            Some(rows) => {
                for event in rows {
                    relation.push_row(render_row(layout, bridge, Some(event)))?;
                }
            }
            None => relation.push_row(render_row(layout, bridge, None))?,
        }
    }

    debug!(
        peripheral = %layout.peripheral,
        bridge_rows = bridges.len(),
        event_rows = events.len(),
        rows = relation.len(),
        "rendered bridge relation"
    );
    Ok(relation)
}

fn render_row(layout: &BridgeLayout, bridge: &BridgeRow, event: Option<&EventRow>) -> Vec<Value> {
    let key = event.map_or(&bridge.bridge_pit_hook, |e| &e.event_pit_hook);

    let mut row = Vec::with_capacity(9 + layout.steps.len() + layout.event_types.len());
    row.push(Value::from(layout.peripheral.as_str()));
    row.push(Value::from(key.as_str()));
    row.push(Value::from(bridge.primary_hook.as_str()));
    row.push(Value::from(bridge.primary_pit_hook.as_str()));
    for step in &layout.steps {
        row.push(Value::from(bridge.foreign_pit(step).map(|p| p.as_str())));
    }
    row.push(Value::from(event.map(|e| e.epoch_hook.as_str())));
    for event_type in &layout.event_types {
        row.push(Value::from(event.map(|e| e.flags.get(event_type).copied().unwrap_or(false))));
    }
    row.push(Value::from(bridge.valid_from));
    row.push(Value::from(bridge.valid_to));
    row.push(Value::from(bridge.is_current));
    row.push(Value::from(bridge.loaded_at));
    row.push(Value::from(bridge.updated_at));
    row
}
