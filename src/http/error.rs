//! Error boundary: uniform translation of failures into response envelopes.
//!
//! # Responsibilities
//! - Forward structured client-facing errors verbatim
//! - Sanitize everything else into an opaque 500 envelope
//! - Correlate sanitized responses with server logs via a tracking reference
//!
//! # Design Decisions
//! - Internal detail (messages, paths, sources) never reaches the body;
//!   the random tracking reference is the only shared datum
//! - Envelope shape is always `{code, message}` with string codes

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::crypto;

/// Reserved code carried by the sanitized internal-error envelope.
pub const INTERNAL_ERROR_CODE: &str = "500";

/// Bytes of entropy behind a tracking reference (hex doubles the length).
const TRACKING_REF_BYTES: usize = 8;

/// Failure taxonomy for guards and handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Structured, client-facing error. Forwarded verbatim.
    #[error("{message}")]
    Client {
        status: StatusCode,
        code: String,
        message: String,
    },

    /// Malformed input; reported as a 400 with the supplied message.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No route matched, or a resource does not exist.
    #[error("not found")]
    NotFound,

    /// Anything unexpected. Detail is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn client(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Client {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }
}

/// Build the standard `{code, message}` envelope.
pub fn envelope(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        axum::Json(json!({
            "code": code,
            "message": message,
        })),
    )
        .into_response()
}

/// The fixed envelope for unmatched requests.
pub fn not_found() -> Response {
    envelope(StatusCode::NOT_FOUND, "404", "Not found.")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Client {
                status,
                code,
                message,
            } => envelope(status, &code, &message),
            ApiError::Validation(message) => {
                envelope(StatusCode::BAD_REQUEST, "400", &message)
            }
            ApiError::NotFound => not_found(),
            ApiError::Internal(detail) => {
                // Entropy failure degrades the reference, not the sanitization.
                let tracking_ref = crypto::random_hex(TRACKING_REF_BYTES)
                    .unwrap_or_else(|_| "unavailable".to_string());
                tracing::error!(
                    tracking_ref = %tracking_ref,
                    detail = %detail,
                    "internal error sanitized at the boundary"
                );
                envelope(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_CODE,
                    &format!("Internal error occurred. Tracking number: {tracking_ref}"),
                )
            }
        }
    }
}

impl From<crate::crypto::EntropyError> for ApiError {
    fn from(e: crate::crypto::EntropyError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<crate::id::SnowflakeError> for ApiError {
    fn from(e: crate::id::SnowflakeError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<crate::principal::StoreError> for ApiError {
    fn from(e: crate::principal::StoreError) -> Self {
        Self::Internal(e.to_string())
    }
}
