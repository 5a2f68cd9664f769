// Error handling for tienda

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::fmt;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    /// `tag` is the machine-readable `status` field clients switch on
    Conflict { tag: &'static str, message: String },
    /// Request refused before reaching a handler (bad extractor input, wrong method, oversized body)
    Rejected { status: StatusCode, message: String },
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Rejected { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict { tag, message } => write!(f, "Conflict ({}): {}", tag, message),
            AppError::Rejected { status, message } => write!(f, "Rejected ({}): {}", status, message),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// JSON body shared by every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub status: &'a str,
    pub message: &'a str,
}

// Implement IntoResponse so Axum can convert errors to HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (tag, message) = match &self {
            AppError::Conflict { tag, message } => (*tag, message.as_str()),
            // Internal details go to the log, never to the client
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                ("error", "internal server error")
            }
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Rejected { message: msg, .. } => ("error", msg.as_str()),
        };

        (status, Json(ErrorBody { status: tag, message })).into_response()
    }
}

// Extractor rejections keep their own status (400, 413, 415, 422) but get a JSON body

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: format!("invalid JSON body: {}", rejection.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: format!("invalid query string: {}", rejection.body_text()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: format!("invalid path: {}", rejection.body_text()),
        }
    }
}

// Extension trait for plumbing results that should surface as a 500
pub trait InternalResultExt<T> {
    /// Convert any displayable error to AppError::Internal, prefixed with `context`
    fn internal(self, context: &str) -> Result<T, AppError>;
}

impl<T, E: std::fmt::Display> InternalResultExt<T> for Result<T, E> {
    fn internal(self, context: &str) -> Result<T, AppError> {
        self.map_err(|e| AppError::Internal(format!("{}: {}", context, e)))
    }
}
