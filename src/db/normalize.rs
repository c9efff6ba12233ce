//! Result normalizer
//!
//! Turns driver rows into `PlainRow`s. Text and blob payloads come out of the
//! driver as `ValueRef`s borrowing the statement's buffers; they are copied
//! here so nothing handed back to callers outlives the connection.
//!
//! Single-row and multi-row fetches both go through `normalize_row`.

use rusqlite::types::ValueRef;
use rusqlite::Row;
use thiserror::Error;

use super::descriptor::{ColumnKind, RowDescriptor};
use super::value::{ColumnValue, PlainRow};
use crate::timestamp;

/// Normalization failure, with the detail kept for the diagnostic log
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("column {column}: payload is not valid UTF-8")]
    InvalidText { column: String, kind: ColumnKind },

    #[error("column {column}: {source}")]
    Driver {
        column: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl NormalizeError {
    /// Whether the failing column holds a large object
    pub fn is_large_object(&self) -> bool {
        match self {
            NormalizeError::InvalidText { kind, .. } => kind.is_large_object(),
            NormalizeError::Driver { .. } => false,
        }
    }
}

/// Normalize one driver row against its statement's descriptor
///
/// Either every column is materialized or an error is returned; a partially
/// normalized row is never produced.
pub fn normalize_row(row: &Row<'_>, descriptor: &RowDescriptor) -> Result<PlainRow, NormalizeError> {
    let mut values = Vec::with_capacity(descriptor.len());
    for index in 0..descriptor.len() {
        let column = descriptor.name(index);
        let raw = row.get_ref(index).map_err(|source| NormalizeError::Driver {
            column: column.to_string(),
            source,
        })?;
        values.push(normalize_value(column, descriptor.kind(index), raw)?);
    }
    Ok(PlainRow::new(values))
}

/// Materialize a single value
pub fn normalize_value(
    column: &str,
    kind: ColumnKind,
    raw: ValueRef<'_>,
) -> Result<ColumnValue, NormalizeError> {
    let value = match raw {
        ValueRef::Null => ColumnValue::Null,
        ValueRef::Integer(i) => ColumnValue::Integer(i),
        ValueRef::Real(f) => ColumnValue::Numeric(f),
        ValueRef::Text(bytes) => match kind {
            ColumnKind::Blob => ColumnValue::Binary(bytes.to_vec()),
            ColumnKind::Date => {
                let text = decode_text(column, kind, bytes)?;
                match timestamp::parse_storage(&text) {
                    Some(date) => ColumnValue::Date(date),
                    None => ColumnValue::Text(text),
                }
            }
            _ => ColumnValue::Text(decode_text(column, kind, bytes)?),
        },
        ValueRef::Blob(bytes) => match kind {
            ColumnKind::Clob => ColumnValue::Text(decode_text(column, kind, bytes)?),
            _ => ColumnValue::Binary(bytes.to_vec()),
        },
    };
    Ok(value)
}

fn decode_text(column: &str, kind: ColumnKind, bytes: &[u8]) -> Result<String, NormalizeError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| NormalizeError::InvalidText {
            column: column.to_string(),
            kind,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::descriptor::ColumnDescriptor;

    fn descriptor(kinds: &[ColumnKind]) -> RowDescriptor {
        RowDescriptor::new(
            kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| ColumnDescriptor {
                    name: format!("C{}", i),
                    kind: *kind,
                })
                .collect(),
        )
    }

    fn normalize_values<'a>(
        values: Vec<ValueRef<'a>>,
        descriptor: &RowDescriptor,
    ) -> Result<PlainRow, NormalizeError> {
        let values = values
            .into_iter()
            .enumerate()
            .map(|(index, raw)| normalize_value(descriptor.name(index), descriptor.kind(index), raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PlainRow::new(values))
    }

    #[test]
    fn test_scalars_pass_through() {
        let desc = descriptor(&[ColumnKind::Integer, ColumnKind::Text, ColumnKind::Numeric, ColumnKind::Text]);
        let row = normalize_values(
            vec![
                ValueRef::Integer(5),
                ValueRef::Text(b"Algebra"),
                ValueRef::Real(4.5),
                ValueRef::Null,
            ],
            &desc,
        )
        .unwrap();

        assert_eq!(
            row.values(),
            &[
                ColumnValue::Integer(5),
                ColumnValue::Text("Algebra".to_string()),
                ColumnValue::Numeric(4.5),
                ColumnValue::Null,
            ]
        );
    }

    #[test]
    fn test_blob_materialized_exactly() {
        let png = b"\x89PNG\r\n\x1a\n\x00\x00";
        let desc = descriptor(&[ColumnKind::Blob]);
        let row = normalize_values(vec![ValueRef::Blob(png)], &desc).unwrap();
        assert_eq!(row.get(0).unwrap().as_bytes(), Some(&png[..]));
    }

    #[test]
    fn test_clob_stored_as_blob_decodes_to_text() {
        let desc = descriptor(&[ColumnKind::Clob]);
        let row = normalize_values(vec![ValueRef::Blob("¿Cuál es 2+2?".as_bytes())], &desc).unwrap();
        assert_eq!(row.get(0).unwrap().as_text(), Some("¿Cuál es 2+2?"));
    }

    #[test]
    fn test_invalid_clob_fails_whole_row() {
        let desc = descriptor(&[ColumnKind::Integer, ColumnKind::Clob]);
        let err = normalize_values(vec![ValueRef::Integer(1), ValueRef::Blob(&[0xff, 0xfe])], &desc)
            .unwrap_err();
        assert!(err.is_large_object());
        assert!(err.to_string().starts_with("column C1:"));
    }

    #[test]
    fn test_invalid_plain_text_is_not_large_object() {
        let desc = descriptor(&[ColumnKind::Text]);
        let err = normalize_values(vec![ValueRef::Text(&[0xc3, 0x28])], &desc).unwrap_err();
        assert!(!err.is_large_object());
    }

    #[test]
    fn test_date_column_parsed() {
        let desc = descriptor(&[ColumnKind::Date, ColumnKind::Date]);
        let row = normalize_values(
            vec![ValueRef::Text(b"2024-05-01 00:00:00"), ValueRef::Text(b"pending")],
            &desc,
        )
        .unwrap();

        match row.get(0).unwrap() {
            ColumnValue::Date(d) => assert_eq!(timestamp::format_storage(d), "2024-05-01 00:00:00"),
            other => panic!("expected date, got {:?}", other),
        }
        assert_eq!(row.get(1).unwrap().as_text(), Some("pending"));
    }

    #[test]
    fn test_dynamic_column_uses_storage_class() {
        let desc = descriptor(&[ColumnKind::Dynamic, ColumnKind::Dynamic]);
        let row = normalize_values(vec![ValueRef::Blob(b"ab"), ValueRef::Text(b"ab")], &desc).unwrap();
        assert_eq!(row.get(0), Some(&ColumnValue::Binary(b"ab".to_vec())));
        assert_eq!(row.get(1), Some(&ColumnValue::Text("ab".to_string())));
    }
}
