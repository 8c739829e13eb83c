//! Named, typed, column-ordered tables.

use serde::{Deserialize, Serialize};

use pitbridge_core::errors::UnionError;
use pitbridge_core::models::{ColumnType, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered column list. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, or confirm the type of an existing one. Returns the
    /// type already registered under `name` when it differs.
    pub fn merge(&mut self, column: Column) -> Result<(), ColumnType> {
        match self.column(&column.name) {
            Some(existing) if existing.column_type != column.column_type => Err(existing.column_type),
            Some(_) => Ok(()),
            None => {
                self.columns.push(column);
                Ok(())
            }
        }
    }

    /// Append a column unless the name is already present.
    pub fn with(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        let column = Column::new(name, column_type);
        if self.position(&column.name).is_none() {
            self.columns.push(column);
        }
        self
    }

    /// Append `column`, handing it back when the name is already taken.
    pub fn try_push(&mut self, column: Column) -> Result<(), Column> {
        if self.position(&column.name).is_some() {
            return Err(column);
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A relation: schema plus rows, each row aligned with the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    name: String,
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

impl Relation {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
        }
    }

    /// Append a row, checking arity and that every non-null cell fits its
    /// column type.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), UnionError> {
        if row.len() != self.schema.len() {
            return Err(UnionError::RowArity {
                relation: self.name.clone(),
                expected: self.schema.len(),
                found: row.len(),
            });
        }
        for (value, column) in row.iter().zip(self.schema.columns()) {
            match value.column_type() {
                Some(found) if found != column.column_type => {
                    return Err(UnionError::SchemaConflict {
                        column: column.name.clone(),
                        relation: self.name.clone(),
                        expected: column.column_type,
                        found,
                    });
                }
                _ => {}
            }
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (`row`, `column`); `None` when either is absent.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let position = self.schema.position(column)?;
        self.rows.get(row).map(|r| &r[position])
    }

    /// Every cell of `column`, in row order. Empty when the column is absent.
    pub fn column_values<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a Value> + 'a {
        let position = self.schema.position(column);
        self.rows
            .iter()
            .filter_map(move |r| position.map(|p| &r[p]))
    }

    /// Rows for which `keep` holds, under the same schema.
    pub fn filter(&self, mut keep: impl FnMut(&[Value]) -> bool) -> Relation {
        Relation {
            name: self.name.clone(),
            schema: self.schema.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    pub(crate) fn push_unchecked(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }
}
