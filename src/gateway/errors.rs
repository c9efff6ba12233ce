//! # Gateway Errors
//!
//! Maps request validation failures and query failures onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::db::QueryError;

/// Result type for gateway handlers
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway errors
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Required query parameter absent or empty
    #[error("Missing required parameter: {0}")]
    MissingParam(String),

    /// Parameter present but unusable
    #[error("Invalid parameter {field}: {reason}")]
    InvalidParam { field: String, reason: String },

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Query executor failure, writes included
    #[error("{}", .0.message())]
    Database(#[from] QueryError),
}

impl GatewayError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        GatewayError::InvalidParam {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingParam(_) => StatusCode::BAD_REQUEST,
            GatewayError::InvalidParam { .. } => StatusCode::BAD_REQUEST,
            GatewayError::Database(err) if err.code().is_connectivity() => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<GatewayError> for ErrorResponse {
    fn from(err: GatewayError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GatewayError::MissingParam("id_institucion".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::invalid("fecha_actual", "bad format").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::from(QueryError::unavailable()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            GatewayError::from(QueryError::statement_failed()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_error_body_is_sanitized() {
        let body = ErrorResponse::from(GatewayError::from(QueryError::statement_failed()));
        assert_eq!(body.code, 500);
        assert_eq!(body.error, "statement execution failed");
    }
}
