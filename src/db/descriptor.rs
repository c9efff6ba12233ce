//! Typed row descriptors
//!
//! A statement's result shape is only known from its SQL text, so the
//! descriptor is derived once from the prepared statement and every row of
//! that statement is normalized against it.

use rusqlite::Statement;

/// Declared kind of a result column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Numeric,
    Text,
    /// Character large object
    Clob,
    /// Binary large object
    Blob,
    Date,
    /// No declared type (expressions, aggregates)
    Dynamic,
}

impl ColumnKind {
    /// Map a declared SQL type to a column kind
    ///
    /// Follows SQLite's affinity rules, checked in the same order, with
    /// `CLOB` and date types split out of the text and numeric groups.
    pub fn from_decl_type(decl: Option<&str>) -> Self {
        let decl = match decl {
            Some(d) if !d.trim().is_empty() => d.to_ascii_uppercase(),
            _ => return ColumnKind::Dynamic,
        };

        if decl.contains("INT") {
            ColumnKind::Integer
        } else if decl.contains("CLOB") {
            ColumnKind::Clob
        } else if decl.contains("CHAR") || decl.contains("TEXT") {
            ColumnKind::Text
        } else if decl.contains("BLOB") {
            ColumnKind::Blob
        } else if decl.contains("DATE") || decl.contains("TIME") {
            ColumnKind::Date
        } else {
            ColumnKind::Numeric
        }
    }

    /// Whether values of this kind are large objects that must be read out
    pub fn is_large_object(&self) -> bool {
        matches!(self, ColumnKind::Clob | ColumnKind::Blob)
    }
}

/// A named column in a row descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
}

/// Ordered column kinds of a statement's projection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowDescriptor {
    columns: Vec<ColumnDescriptor>,
}

impl RowDescriptor {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    /// Derive the descriptor from a prepared statement
    pub fn from_statement(stmt: &Statement<'_>) -> Self {
        let columns = stmt
            .columns()
            .iter()
            .map(|c| ColumnDescriptor {
                name: c.name().to_string(),
                kind: ColumnKind::from_decl_type(c.decl_type()),
            })
            .collect();
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Kind of column `index`, `Dynamic` when out of range
    pub fn kind(&self, index: usize) -> ColumnKind {
        self.columns
            .get(index)
            .map(|c| c.kind)
            .unwrap_or(ColumnKind::Dynamic)
    }

    /// Name of column `index`, empty when out of range
    pub fn name(&self, index: usize) -> &str {
        self.columns.get(index).map_or("", |c| c.name.as_str())
    }
}
