//! Temporal read modes over the unified bridge. All are pure filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pitbridge_core::errors::{PitBridgeResult, UnionError};
use pitbridge_core::models::{Hook, Value};
use pitbridge_hooks::{naming, HookBuilder};

use crate::relation::Relation;
use crate::union::require_temporal_columns;

/// How to slice the unified bridge in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "at", rename_all = "snake_case")]
pub enum ReadMode {
    /// Rows valid at an instant: `valid_from <= t < valid_to`.
    AsOf(DateTime<Utc>),
    /// Current rows only.
    AsIs,
    /// Rows valid at the date of their own event. Rows without an epoch
    /// hook are excluded.
    AsOfEvent,
}

/// The union of every peripheral's bridge relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedBridge {
    relation: Relation,
}

impl UnifiedBridge {
    pub fn new(relation: Relation) -> Result<Self, UnionError> {
        require_temporal_columns(&relation)?;
        Ok(Self { relation })
    }

    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    pub fn into_relation(self) -> Relation {
        self.relation
    }

    pub fn len(&self) -> usize {
        self.relation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relation.is_empty()
    }

    pub fn read(&self, mode: ReadMode, builder: &HookBuilder) -> PitBridgeResult<Relation> {
        match mode {
            ReadMode::AsOf(at) => Ok(self.as_of(at)),
            ReadMode::AsIs => Ok(self.as_is()),
            ReadMode::AsOfEvent => self.as_of_event(builder),
        }
    }

    pub fn as_of(&self, at: DateTime<Utc>) -> Relation {
        let (from, to) = self.bounds();
        self.relation
            .filter(|row| valid_at(&row[from], &row[to], at))
    }

    pub fn as_is(&self) -> Relation {
        let current = self.position(naming::IS_CURRENT);
        self.relation
            .filter(|row| row[current].as_bool().unwrap_or(false))
    }

    /// Each event row checked against its own epoch date at start of day UTC.
    pub fn as_of_event(&self, builder: &HookBuilder) -> PitBridgeResult<Relation> {
        let (from, to) = self.bounds();
        let Some(epoch) = self.relation.schema().position(naming::EPOCH_HOOK) else {
            return Ok(self.relation.filter(|_| false));
        };

        // Parse up front so a malformed epoch hook is an error, not a silent drop.
        let mut keep = Vec::with_capacity(self.relation.len());
        for row in self.relation.rows() {
            let at = match row[epoch].as_text() {
                Some(token) => Some(epoch_instant(builder, token)?),
                None => None,
            };
            keep.push(at.is_some_and(|at| valid_at(&row[from], &row[to], at)));
        }

        let mut flags = keep.into_iter();
        Ok(self.relation.filter(|_| flags.next().unwrap_or(false)))
    }

    fn bounds(&self) -> (usize, usize) {
        (self.position(naming::VALID_FROM), self.position(naming::VALID_TO))
    }

    /// Temporal columns are checked at construction.
    fn position(&self, column: &str) -> usize {
        self.relation.schema().position(column).unwrap_or_default()
    }
}

fn valid_at(from: &Value, to: &Value, at: DateTime<Utc>) -> bool {
    match (from.as_timestamp(), to.as_timestamp()) {
        (Some(from), Some(to)) => from <= at && at < to,
        _ => false,
    }
}

fn epoch_instant(builder: &HookBuilder, token: &str) -> PitBridgeResult<DateTime<Utc>> {
    let date = builder.epoch_date(&Hook::from_token(token))?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}
