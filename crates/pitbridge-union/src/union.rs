//! Union by column name.

use tracing::info;

use pitbridge_core::errors::UnionError;
use pitbridge_core::models::Value;
use pitbridge_hooks::naming;

use crate::relation::{Relation, Schema};

/// Columns every input to a union must carry.
pub const TEMPORAL_COLUMNS: [&str; 3] = [naming::VALID_FROM, naming::VALID_TO, naming::IS_CURRENT];

/// Union `relations` into one relation called `name`.
///
/// The output schema is the union of input columns in first-seen order.
/// Columns an input lacks are null-filled. A column appearing with two
/// different types aborts the union with no partial output.
pub fn union_by_name(name: &str, relations: &[Relation]) -> Result<Relation, UnionError> {
    if relations.is_empty() {
        return Err(UnionError::EmptyUnion);
    }

    let mut schema = Schema::new();
    for relation in relations {
        require_temporal_columns(relation)?;
        for column in relation.schema().columns() {
            schema
                .merge(column.clone())
                .map_err(|expected| UnionError::SchemaConflict {
                    column: column.name.clone(),
                    relation: relation.name().to_string(),
                    expected,
                    found: column.column_type,
                })?;
        }
    }

    let mut unified = Relation::new(name, schema.clone());
    for relation in relations {
        // Target column → source position.
        let mapping: Vec<Option<usize>> = schema
            .names()
            .map(|column| relation.schema().position(column))
            .collect();
        for row in relation.rows() {
            let out = mapping
                .iter()
                .map(|source| source.map_or(Value::Null, |p| row[p].clone()))
                .collect();
            unified.push_unchecked(out);
        }
    }

    info!(
        relation = name,
        inputs = relations.len(),
        columns = unified.schema().len(),
        rows = unified.len(),
        "unioned relations"
    );
    Ok(unified)
}

pub(crate) fn require_temporal_columns(relation: &Relation) -> Result<(), UnionError> {
    for column in TEMPORAL_COLUMNS {
        if relation.schema().position(column).is_none() {
            return Err(UnionError::MissingTemporalColumn {
                relation: relation.name().to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}
