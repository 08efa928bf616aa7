//! Portal error types with HTTP status code mapping.
//!
//! [`PortalError`] is the central error type for the portal. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use std::collections::BTreeMap;
use std::fmt;

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::identity::IdentityError;
use crate::objects::ObjectError;
use crate::store::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "validation failed: email: enter a valid email address",
///     "details": { "email": "enter a valid email address" }
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`PortalError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Per-field messages for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

/// Per-field validation messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Creates an empty set of field errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding a single field error.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records an error for `field`. The first message per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Returns the message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns `true` if no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Turns an accumulated set into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Consumes the set, returning the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status               |
/// |-----------|-----------------|---------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request           |
/// | 2000–2999 | Not Found       | 404 Not Found             |
/// | 3000–3999 | Server / Store  | 500 Internal Server Error |
/// | 4000–4999 | Auth / Session  | 401 / 403 / 503           |
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// Client-side field checks failed; nothing was written.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Malformed request that is not tied to a single form field.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A record or route does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Catalog store or object store operation failed.
    #[error("store error: {0}")]
    Store(String),

    /// Sign-in or session failure.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Authenticated caller lacks admin access.
    #[error("You do not have admin access")]
    Forbidden,

    /// The caller's session is still being resolved.
    #[error("session is still loading; retry shortly")]
    SessionPending,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PortalError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::NotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::Store(_) => 3001,
            Self::Auth(_) => 4001,
            Self::Forbidden => 4003,
            Self::SessionPending => 4010,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::SessionPending => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Shorthand for a single-field validation failure.
    #[must_use]
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }
}

impl From<FieldErrors> for PortalError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<StoreError> for PortalError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { table, id } => Self::NotFound(format!("{table} {id}")),
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<ObjectError> for PortalError {
    fn from(err: ObjectError) -> Self {
        match err {
            ObjectError::NotFound { bucket, path } => Self::NotFound(format!("{bucket}/{path}")),
            ObjectError::InvalidPath(_) => Self::InvalidRequest(err.to_string()),
            ObjectError::AlreadyExists { .. } | ObjectError::Io(_) => Self::Store(err.to_string()),
        }
    }
}

impl From<IdentityError> for PortalError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::AlreadyRegistered(_)
            | IdentityError::WeakPassword
            | IdentityError::InvalidEmail(_) => {
                Self::InvalidRequest(err.to_string())
            }
            IdentityError::Backend(_) => Self::Store(err.to_string()),
            other => Self::Auth(other.to_string()),
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() && !matches!(self, Self::SessionPending) {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let code = self.error_code();
        let message = self.to_string();
        let pending = matches!(self, Self::SessionPending);
        let details = match self {
            Self::Validation(errors) => Some(errors.into_inner()),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        if pending {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
        }
        response
    }
}
