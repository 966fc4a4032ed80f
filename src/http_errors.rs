// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Mapping of update errors to HTTP responses.
//!
//! Every error kind gets its own status code and reason, so HTTP clients can
//! tell a bad request from a rejected key or an unreachable server without
//! parsing messages.
//!
//! # Usage
//!
//! ```rust
//! use axum::http::StatusCode;
//! use ddnsgate::dns_errors::{DdnsError, TransportError};
//! use ddnsgate::http_errors::map_error_to_status;
//!
//! let err = DdnsError::from(TransportError::Timeout {
//!     server: "10.0.0.2:53".into(),
//!     timeout_ms: 5000,
//! });
//! assert_eq!(map_error_to_status(&err), StatusCode::GATEWAY_TIMEOUT);
//! ```

use crate::dns_errors::{DdnsError, TransportError, ValidationError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Map an update error to its HTTP status code.
///
/// # HTTP Code Mapping
///
/// | Error | HTTP Code |
/// |-------|-----------|
/// | `InvalidName`, `InvalidValue`, `InvalidTtl` | 400 |
/// | `UnsupportedType` | 422 |
/// | `AuthenticationFailure` | 500 |
/// | signing key errors | 500 |
/// | `ServerRejected` | 502 |
/// | `TransportUnavailable` | 503 |
/// | `Timeout` | 504 |
#[must_use]
pub fn map_error_to_status(error: &DdnsError) -> StatusCode {
    match error {
        DdnsError::Validation(ValidationError::UnsupportedType { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DdnsError::Validation(_) => StatusCode::BAD_REQUEST,
        DdnsError::Transport(TransportError::AuthenticationFailure { .. }) | DdnsError::Key(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        DdnsError::Transport(TransportError::ServerRejected { .. }) => StatusCode::BAD_GATEWAY,
        DdnsError::Transport(TransportError::TransportUnavailable { .. }) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        DdnsError::Transport(TransportError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
    }
}

/// JSON body of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
    /// Stable reason code from [`crate::status_reasons`]
    pub reason: &'static str,
    /// Whether the same request may succeed if retried
    pub retryable: bool,
}

impl From<&DdnsError> for ErrorBody {
    fn from(error: &DdnsError) -> Self {
        Self {
            error: error.to_string(),
            reason: error.reason(),
            retryable: error.is_retryable(),
        }
    }
}

/// Error returned by the HTTP handlers.
#[derive(Debug)]
pub struct ApiError(pub DdnsError);

impl From<DdnsError> for ApiError {
    fn from(error: DdnsError) -> Self {
        Self(error)
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        Self(error.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = map_error_to_status(&self.0);
        (status, Json(ErrorBody::from(&self.0))).into_response()
    }
}
