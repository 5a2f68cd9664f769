pub mod auth;
pub mod cart;
pub mod catalog;
pub mod users;

use axum::http::StatusCode;
use serde_json::Value;

use crate::error::AppError;

// Fallback for unknown routes, so every response body stays JSON
pub async fn not_found() -> AppError {
    AppError::NotFound("route not found".to_string())
}

// Known route, unsupported method
pub async fn method_not_allowed() -> AppError {
    AppError::Rejected {
        status: StatusCode::METHOD_NOT_ALLOWED,
        message: "method not allowed".to_string(),
    }
}

/// Keep a body field only when the client sent a JSON string
pub(crate) fn string_field(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Render a scalar body field as text; null, arrays and objects count as absent
pub(crate) fn scalar_field(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
