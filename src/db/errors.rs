//! Query error types
//!
//! Error codes:
//! - SEL_DB_UNAVAILABLE (ERROR)
//! - SEL_STATEMENT_FAILED (ERROR)
//! - SEL_BINDING_INVALID (ERROR)
//! - SEL_LOB_READ_FAILED (ERROR)
//!
//! A `QueryError` never carries the driver's own message. The driver detail is
//! written to the diagnostic log at the point of failure and the caller only
//! sees the code and a fixed message.

use std::fmt;

use rusqlite::ErrorCode;
use thiserror::Error;

use crate::observability::Severity;

/// Query error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// The database could not be reached or opened
    Unavailable,
    /// Malformed SQL, constraint violation, type mismatch
    StatementFailed,
    /// Parameter mapping does not match the statement's placeholders
    BindingInvalid,
    /// A large object could not be materialized
    LobReadFailed,
}

impl QueryErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::Unavailable => "SEL_DB_UNAVAILABLE",
            QueryErrorCode::StatementFailed => "SEL_STATEMENT_FAILED",
            QueryErrorCode::BindingInvalid => "SEL_BINDING_INVALID",
            QueryErrorCode::LobReadFailed => "SEL_LOB_READ_FAILED",
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether this failure is a connectivity problem rather than a statement problem
    pub fn is_connectivity(&self) -> bool {
        matches!(self, QueryErrorCode::Unavailable)
    }

    fn public_message(&self) -> &'static str {
        match self {
            QueryErrorCode::Unavailable => "database unavailable",
            QueryErrorCode::StatementFailed => "statement execution failed",
            QueryErrorCode::BindingInvalid => "statement parameters do not match placeholders",
            QueryErrorCode::LobReadFailed => "large object could not be read",
        }
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Uniform failure returned by the query executor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct QueryError {
    code: QueryErrorCode,
    message: &'static str,
}

impl QueryError {
    /// Create an error with the fixed message for `code`
    pub fn new(code: QueryErrorCode) -> Self {
        Self {
            code,
            message: code.public_message(),
        }
    }

    pub fn unavailable() -> Self {
        Self::new(QueryErrorCode::Unavailable)
    }

    pub fn statement_failed() -> Self {
        Self::new(QueryErrorCode::StatementFailed)
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    /// Returns the caller-safe message
    pub fn message(&self) -> &'static str {
        self.message
    }
}

/// Classify a driver error
///
/// Open, busy, locked and not-a-database failures mean the store cannot be
/// reached. Everything else is attributed to the statement.
pub fn classify(err: &rusqlite::Error) -> QueryErrorCode {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => match e.code {
            ErrorCode::CannotOpen
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::NotADatabase
            | ErrorCode::PermissionDenied
            | ErrorCode::SystemIoFailure => QueryErrorCode::Unavailable,
            _ => QueryErrorCode::StatementFailed,
        },
        rusqlite::Error::InvalidParameterName(_) | rusqlite::Error::InvalidParameterCount(_, _) => {
            QueryErrorCode::BindingInvalid
        }
        rusqlite::Error::Utf8Error(_) | rusqlite::Error::FromSqlConversionFailure(_, _, _) => {
            QueryErrorCode::LobReadFailed
        }
        _ => QueryErrorCode::StatementFailed,
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(QueryError::unavailable().code().code(), "SEL_DB_UNAVAILABLE");
        assert_eq!(QueryError::statement_failed().code().code(), "SEL_STATEMENT_FAILED");
        assert_eq!(QueryError::new(QueryErrorCode::BindingInvalid).code().code(), "SEL_BINDING_INVALID");
        assert_eq!(QueryError::new(QueryErrorCode::LobReadFailed).code().code(), "SEL_LOB_READ_FAILED");
    }

    #[test]
    fn test_display_has_no_driver_detail() {
        let err = QueryError::statement_failed();
        assert_eq!(err.to_string(), "SEL_STATEMENT_FAILED: statement execution failed");
    }

    #[test]
    fn test_classify_connectivity() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
            Some("unable to open database file".to_string()),
        );
        assert_eq!(classify(&err), QueryErrorCode::Unavailable);
        assert!(classify(&err).is_connectivity());
    }

    #[test]
    fn test_classify_constraint() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            None,
        );
        assert_eq!(classify(&err), QueryErrorCode::StatementFailed);
    }

    #[test]
    fn test_classify_parameter_name() {
        let err = rusqlite::Error::InvalidParameterName(":MISSING".to_string());
        assert_eq!(classify(&err), QueryErrorCode::BindingInvalid);
    }
}
