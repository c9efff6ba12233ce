//! Conversions from request data to statement parameters

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use super::errors::{GatewayError, GatewayResult};
use crate::db::ParamValue;
use crate::timestamp;

/// Identifier taken from a path segment or query string
///
/// Digits bind as integers, anything else as text.
pub fn id_param(raw: &str) -> ParamValue {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(id) => ParamValue::Integer(id),
        Err(_) => ParamValue::Text(trimmed.to_string()),
    }
}

/// Required query-string value
pub fn required<'a>(field: &str, value: &'a Option<String>) -> GatewayResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(GatewayError::MissingParam(field.to_string())),
    }
}

/// Required `DD-MM-YYYY hh:mm:ss AM/PM` timestamp
pub fn timestamp_param(field: &str, value: &Option<String>) -> GatewayResult<ParamValue> {
    let raw = required(field, value)?;
    timestamp::parse_boundary(raw)
        .map(ParamValue::Date)
        .ok_or_else(|| GatewayError::invalid(field, "expected DD-MM-YYYY hh:mm:ss AM/PM"))
}

/// JSON scalar from a request body
///
/// Booleans bind as 0/1. Arrays and objects are refused.
pub fn scalar_param(field: &str, value: &Value) -> GatewayResult<ParamValue> {
    match value {
        Value::Null => Ok(ParamValue::Null),
        Value::Bool(b) => Ok(ParamValue::Integer(i64::from(*b))),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(ParamValue::Integer(i)),
            None => n
                .as_f64()
                .map(ParamValue::Numeric)
                .ok_or_else(|| GatewayError::invalid(field, "number out of range")),
        },
        Value::String(s) => Ok(ParamValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(GatewayError::invalid(field, "expected a scalar")),
    }
}

/// Base64 payload from a request body, `null` allowed
pub fn binary_param(field: &str, value: &Value) -> GatewayResult<ParamValue> {
    match value {
        Value::Null => Ok(ParamValue::Null),
        Value::String(s) => STANDARD
            .decode(s.trim())
            .map(ParamValue::Binary)
            .map_err(|_| GatewayError::invalid(field, "expected base64")),
        _ => Err(GatewayError::invalid(field, "expected a base64 string")),
    }
}
