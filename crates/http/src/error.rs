//! Error handling for the bookshelf HTTP layer

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

/// Standard envelope for server-side failures
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Vec<serde_json::Value>,
    pub trace_id: String,
    pub timestamp: String,
}

impl ErrorBody {
    fn internal(message: String) -> (Uuid, Self) {
        let error_id = Uuid::new_v4();
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();

        // Keep internal details out of release builds
        let message = if cfg!(debug_assertions) {
            message
        } else {
            "An internal server error occurred".to_string()
        };

        let body = Self {
            code: "internal_error".to_string(),
            message,
            details: Vec::new(),
            trace_id: error_id.to_string(),
            timestamp,
        };
        (error_id, body)
    }
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    /// Caller-supplied data broke a field rule. The details are returned
    /// to the caller verbatim as the response body.
    #[error("validation error: {details}")]
    Validation { details: serde_json::Value },

    /// The referenced resource has no live record.
    #[error("not found: {message}")]
    NotFound { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(details: impl Into<serde_json::Value>) -> Self {
        Self::Validation {
            details: details.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation { details } => {
                tracing::debug!(details = %details, "request rejected by validation");
                (StatusCode::BAD_REQUEST, Json(details)).into_response()
            }
            AppError::NotFound { message } => {
                tracing::debug!(%message, "resource not found");
                StatusCode::NOT_FOUND.into_response()
            }
            AppError::Internal(e) => {
                let (error_id, body) = ErrorBody::internal(format!("{e:#}"));

                tracing::error!(
                    error_id = %error_id,
                    error = %format!("{e:#}"),
                    status_code = %StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    "Request error"
                );

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorEnvelope { error: body }),
                )
                    .into_response()
            }
        }
    }
}

/// Convert a handler panic into the standard 500 envelope.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    let (error_id, body) = ErrorBody::internal(format!("handler panicked: {detail}"));
    tracing::error!(error_id = %error_id, %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorEnvelope { error: body }),
    )
        .into_response()
}
