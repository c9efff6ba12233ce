//! Query execution and result normalization
//!
//! # Flow
//!
//! 1. A handler builds a SQL template and a `Params` mapping
//! 2. `QueryExecutor` opens a connection, binds by name and executes
//! 3. Each driver row is normalized against the statement's `RowDescriptor`
//! 4. Plain rows, `None`, or an affected-row count go back to the handler
//!
//! Failures come back as `QueryError` and never carry driver text.

mod connector;
mod descriptor;
mod errors;
mod executor;
mod normalize;
mod schema;
mod value;

pub use connector::{Connector, DatabaseConfig, SqliteConnector};
pub use descriptor::{ColumnDescriptor, ColumnKind, RowDescriptor};
pub use errors::{QueryError, QueryErrorCode, QueryResult};
pub use executor::{FetchMode, QueryExecutor, QueryOutcome};
pub use normalize::{normalize_row, normalize_value, NormalizeError};
pub use schema::{apply_schema, SCHEMA_SQL, TABLES};
pub use value::{ColumnValue, ParamValue, Params, PlainRow};
