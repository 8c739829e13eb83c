use crate::models::ColumnType;

/// Bridge union errors. Any of these aborts the union with no partial output.
#[derive(Debug, thiserror::Error)]
pub enum UnionError {
    #[error("schema conflict on column {column} in {relation}: expected {expected}, found {found}")]
    SchemaConflict {
        column: String,
        relation: String,
        expected: ColumnType,
        found: ColumnType,
    },

    #[error("relation {relation} is missing temporal column {column}")]
    MissingTemporalColumn { relation: String, column: String },

    #[error("row arity mismatch in {relation}: schema has {expected} columns, row has {found}")]
    RowArity {
        relation: String,
        expected: usize,
        found: usize,
    },

    #[error("duplicate column {column} in {relation}")]
    DuplicateColumn { relation: String, column: String },

    #[error("union requires at least one input relation")]
    EmptyUnion,
}
